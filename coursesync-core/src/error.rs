//! Error types for coursesync.

use thiserror::Error;

/// Errors that can occur while syncing assignments.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to fetch calendar feed: {0}")]
    FeedFetch(String),

    #[error("Calendar feed parse error: {0}")]
    FeedParse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Notion API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for coursesync operations.
pub type SyncResult<T> = Result<T, SyncError>;
