use std::path::Path;

use anyhow::{Result, bail};
use coursesync_core::SyncConfig;
use owo_colors::OwoColorize;

pub fn run(path: Option<&Path>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => SyncConfig::config_path()?,
    };

    if path.exists() && !force {
        bail!(
            "Config file already exists at {}\n\n\
            Use --force to overwrite it.",
            path.display()
        );
    }

    SyncConfig::create_default_config(&path)?;

    println!("{} {}", "Created".green(), path.display());
    println!("Set feed_url, notion_token and database_id, then run:\n  coursesync preview");

    Ok(())
}
