use std::path::Path;

use anyhow::{Context, Result};
use coursesync_core::SyncConfig;

use crate::render::Render;
use crate::utils::tui;

pub async fn run(config: &SyncConfig, feed_file: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let spinner = tui::create_spinner("Reading feed".to_string());
    let result = super::plan_from(config, feed_file, &spinner).await;
    spinner.finish_and_clear();
    let plan = result?;

    println!("{}", plan.render());

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&plan)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write plan to {}", path.display()))?;
        println!("\nPlan written to {}", path.display());
    }

    Ok(())
}
