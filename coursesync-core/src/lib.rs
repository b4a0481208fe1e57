//! Core of coursesync: turns a course calendar feed into Notion tasks.
//!
//! This crate is shared by the `coursesync` CLI and `coursesync-server`:
//! - `feed` fetches and parses the ICS document
//! - `course`, `title`, `due_date` and `record` turn events into task records
//! - `notion` talks to the tasks database
//! - `sync` ties these together into a run that returns a [`SyncSummary`]

pub mod config;
pub mod course;
pub mod due_date;
pub mod error;
pub mod event;
pub mod feed;
pub mod notion;
pub mod record;
pub mod sync;
pub mod title;

pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use sync::{DuplicatePolicy, Plan, SyncSummary, Syncer};
