//! Calendar feed retrieval and parsing.

mod fetch;
mod parse;

pub use fetch::{FeedSource, FileFeed, HttpFeed};
pub use parse::{Feed, RejectedEvent, parse_feed};
