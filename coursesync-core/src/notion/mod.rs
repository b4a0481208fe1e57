//! The task database: a Notion database reached over its REST API.

mod client;
mod wire;

use std::future::Future;

use chrono::NaiveDate;

use crate::error::SyncResult;
use crate::record::TaskRecord;

pub use client::{NOTION_VERSION, NotionClient};

/// Operations the sync engine needs from a task database.
pub trait TaskDatabase {
    /// Whether a task with this title and due date already exists.
    fn find_existing(
        &self,
        title: &str,
        due_date: NaiveDate,
    ) -> impl Future<Output = SyncResult<bool>> + Send;

    /// Create a task and return the new page's id.
    fn create_task(&self, record: &TaskRecord) -> impl Future<Output = SyncResult<String>> + Send;
}
