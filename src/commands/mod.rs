pub mod courses;
pub mod init;
pub mod preview;
pub mod sync;

use std::path::Path;

use anyhow::Result;
use coursesync_core::feed::{FeedSource, FileFeed, HttpFeed};
use coursesync_core::sync::load_plan;
use coursesync_core::{Plan, SyncConfig};
use indicatif::ProgressBar;

/// Read and plan the feed from `feed_file` when given, else from `feed_url`.
pub async fn plan_from(
    config: &SyncConfig,
    feed_file: Option<&Path>,
    spinner: &ProgressBar,
) -> Result<Plan> {
    match feed_file {
        Some(path) => plan_with(config, &FileFeed::new(path), spinner).await,
        None => plan_with(config, &HttpFeed::from_config(config)?, spinner).await,
    }
}

async fn plan_with<S: FeedSource>(
    config: &SyncConfig,
    source: &S,
    spinner: &ProgressBar,
) -> Result<Plan> {
    spinner.set_message(format!("Reading {}", source.describe()));
    let plan = load_plan(config, source).await?;
    Ok(plan)
}
