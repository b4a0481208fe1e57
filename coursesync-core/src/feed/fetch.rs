//! Feed sources: the remote ICS URL, or a local file for offline runs.

use std::future::Future;
use std::path::PathBuf;

use tracing::debug;
use url::Url;

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};

/// Somewhere a calendar document can be read from.
pub trait FeedSource {
    /// Read the whole document. Any failure here is fatal for the run.
    fn fetch(&self) -> impl Future<Output = SyncResult<String>> + Send;

    /// Human-readable origin, safe to print (no secrets).
    fn describe(&self) -> String;
}

/// Feed published over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpFeed {
    url: Url,
    http: reqwest::Client,
}

impl HttpFeed {
    pub fn new(url: Url, http: reqwest::Client) -> Self {
        HttpFeed { url, http }
    }

    pub fn from_config(config: &SyncConfig) -> SyncResult<Self> {
        let url = config
            .feed_url
            .clone()
            .ok_or_else(|| SyncError::Config("feed_url is not configured".into()))?;
        Ok(HttpFeed::new(url, config.http_client()?))
    }

    /// reqwest puts the full URL in its messages; keep only the host.
    fn fetch_error(&self, e: reqwest::Error) -> SyncError {
        SyncError::FeedFetch(format!("{}: {}", self.describe(), e.without_url()))
    }
}

impl FeedSource for HttpFeed {
    async fn fetch(&self) -> SyncResult<String> {
        // Feed URLs embed a private token, so only the host is logged
        debug!(host = self.url.host_str().unwrap_or_default(), "fetching calendar feed");

        let response = self
            .http
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| self.fetch_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::FeedFetch(format!(
                "{} responded with {}",
                self.describe(),
                status
            )));
        }

        response.text().await.map_err(|e| self.fetch_error(e))
    }

    fn describe(&self) -> String {
        format!("{}://{}", self.url.scheme(), self.url.host_str().unwrap_or("feed"))
    }
}

/// Feed read from a local .ics file.
#[derive(Debug, Clone)]
pub struct FileFeed {
    path: PathBuf,
}

impl FileFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileFeed { path: path.into() }
    }
}

impl FeedSource for FileFeed {
    async fn fetch(&self) -> SyncResult<String> {
        tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            SyncError::FeedFetch(format!("Could not read {}: {e}", self.path.display()))
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
