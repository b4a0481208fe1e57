//! ICS feed parsing using the icalendar crate's parser.

use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Component, read_calendar, unfold},
};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::error::{SyncError, SyncResult};
use crate::event::{CalendarEvent, EventTime};

/// Context code in brackets at the end of a SUMMARY: `Homework 3 [cs_124_000_111]`
static SUMMARY_CONTEXT_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([A-Za-z]+_\d+(?:_\d+)*)\]\s*$").expect("summary context code pattern")
});

/// Context code anywhere in LOCATION: `math_231_120258_248828`
static LOCATION_CONTEXT_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Za-z]+_\d+(?:_\d+)*)\b").expect("location context code pattern")
});

static HTTPS_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https://[^\s<>"]+"#).expect("url pattern"));

/// A parsed calendar document.
#[derive(Debug, Clone, Default)]
pub struct Feed {
    /// Zone declared by the feed (`X-WR-TIMEZONE`)
    pub time_zone: Option<String>,
    pub events: Vec<CalendarEvent>,
    /// Events that could not be read; they are skipped, not fatal
    pub rejected: Vec<RejectedEvent>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RejectedEvent {
    pub uid: Option<String>,
    pub reason: String,
}

/// Parse an ICS document into events.
///
/// A document that is not a calendar at all is an error. A VEVENT that lacks
/// a SUMMARY or a usable DTSTART is logged and recorded in
/// [`Feed::rejected`].
pub fn parse_feed(content: &str) -> SyncResult<Feed> {
    if !content.contains("BEGIN:VCALENDAR") {
        return Err(SyncError::FeedParse(
            "Document is not an iCalendar feed (no BEGIN:VCALENDAR)".into(),
        ));
    }

    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).map_err(|e| SyncError::FeedParse(e.to_string()))?;

    let time_zone = calendar
        .properties
        .iter()
        .find(|p| p.name == "X-WR-TIMEZONE")
        .map(|p| p.val.to_string());

    let mut feed = Feed {
        time_zone,
        ..Feed::default()
    };

    for vevent in calendar.components.iter().filter(|c| c.name == "VEVENT") {
        match parse_event(vevent) {
            Ok(event) => feed.events.push(event),
            Err(reason) => {
                let uid = vevent.find_prop("UID").map(|p| p.val.to_string());
                warn!(uid = uid.as_deref().unwrap_or("-"), %reason, "skipping feed event");
                feed.rejected.push(RejectedEvent { uid, reason });
            }
        }
    }

    Ok(feed)
}

fn parse_event(vevent: &Component) -> Result<CalendarEvent, String> {
    let uid = vevent.find_prop("UID").map(|p| p.val.to_string());

    let title = vevent
        .find_prop("SUMMARY")
        .map(|p| unescape_text(p.val.as_ref()))
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| "missing SUMMARY".to_string())?;

    let dtstart = vevent
        .find_prop("DTSTART")
        .ok_or_else(|| "missing DTSTART".to_string())?;
    let due_at = DatePerhapsTime::try_from(dtstart)
        .ok()
        .map(to_event_time)
        .ok_or_else(|| format!("unreadable DTSTART '{}'", dtstart.val.as_ref()))?;

    let raw_identifier = SUMMARY_CONTEXT_CODE
        .captures(&title)
        .map(|caps| caps[1].to_string())
        .or_else(|| {
            let location = unescape_text(vevent.find_prop("LOCATION")?.val.as_ref());
            LOCATION_CONTEXT_CODE
                .captures(&location)
                .map(|caps| caps[1].to_string())
        });

    let url = vevent
        .find_prop("URL")
        .map(|p| p.val.to_string())
        .filter(|u| u.starts_with("https://") || u.starts_with("http://"))
        .or_else(|| {
            let description = unescape_text(vevent.find_prop("DESCRIPTION")?.val.as_ref());
            HTTPS_URL.find(&description).map(|m| m.as_str().to_string())
        });

    Ok(CalendarEvent {
        uid,
        raw_identifier,
        title,
        due_at,
        url,
    })
}

/// Convert icalendar's DatePerhapsTime to our EventTime, preserving timezone info
fn to_event_time(dpt: DatePerhapsTime) -> EventTime {
    match dpt {
        DatePerhapsTime::Date(d) => EventTime::Date(d),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            CalendarDateTime::Utc(dt) => EventTime::Utc(dt),
            CalendarDateTime::Floating(naive) => EventTime::Floating(naive),
            CalendarDateTime::WithTimezone { date_time, tzid } => EventTime::Zoned {
                datetime: date_time,
                tzid,
            },
        },
    }
}

/// Undo RFC 5545 TEXT escaping (`\,` `\;` `\n` `\\`).
fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}
