use std::sync::Arc;

use anyhow::Result;
use coursesync_core::SyncConfig;
use coursesync_core::feed::HttpFeed;
use coursesync_core::notion::NotionClient;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    config: Arc<SyncConfig>,
}

impl AppState {
    /// Fails when the feed URL or Notion credentials are missing, so a
    /// misconfigured server never starts.
    pub fn new(config: SyncConfig) -> Result<Self> {
        HttpFeed::from_config(&config)?;
        NotionClient::from_config(&config)?;
        Ok(AppState {
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }
}
