//! Events as read from the calendar feed.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single VEVENT from the feed. Discarded once converted to a task record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub uid: Option<String>,
    /// Underscore-delimited course context code, e.g. `math_231_120258_248828`
    pub raw_identifier: Option<String>,
    pub title: String,
    pub due_at: EventTime,
    /// Link back to the assignment page, when the feed provides one
    pub url: Option<String>,
}

/// Event start time, preserving how the feed expressed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventTime {
    /// All-day (VALUE=DATE)
    Date(NaiveDate),
    /// UTC timestamp (trailing `Z`)
    Utc(DateTime<Utc>),
    /// Local time with no zone attached
    Floating(NaiveDateTime),
    /// Local time in a named zone (TZID parameter)
    Zoned { datetime: NaiveDateTime, tzid: String },
}
