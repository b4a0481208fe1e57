//! Conversion of feed timestamps into all-day due dates.

use chrono::{NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::event::EventTime;

/// Converts event times to the calendar day they fall on in one time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateConverter {
    zone: Tz,
}

impl DateConverter {
    pub fn new(zone: Tz) -> Self {
        DateConverter { zone }
    }

    /// Pick the target zone: the configured one, else the feed's
    /// `X-WR-TIMEZONE`, else UTC.
    pub fn resolve(configured: Option<Tz>, feed_zone: Option<&str>) -> Self {
        let zone = configured
            .or_else(|| feed_zone.and_then(|name| name.trim().parse::<Tz>().ok()))
            .unwrap_or(Tz::UTC);
        DateConverter { zone }
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// The calendar day `time` falls on in the target zone. Time of day is
    /// truncated.
    pub fn to_due_date(&self, time: &EventTime) -> NaiveDate {
        match time {
            EventTime::Date(date) => *date,
            EventTime::Utc(dt) => dt.with_timezone(&self.zone).date_naive(),
            EventTime::Floating(naive) => naive.date(),
            EventTime::Zoned { datetime, tzid } => match tzid.parse::<Tz>() {
                Ok(source) => source
                    .from_local_datetime(datetime)
                    .earliest()
                    .map(|dt| dt.with_timezone(&self.zone).date_naive())
                    .unwrap_or_else(|| datetime.date()),
                // Unknown zone names (e.g. Windows names) are read as floating
                Err(_) => datetime.date(),
            },
        }
    }

    /// Today's date in the target zone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.zone).date_naive()
    }
}

impl Default for DateConverter {
    fn default() -> Self {
        DateConverter::new(Tz::UTC)
    }
}
