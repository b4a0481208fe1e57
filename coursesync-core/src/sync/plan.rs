//! Planning: which feed events become tasks and which are skipped.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

use crate::config::SyncConfig;
use crate::course::CourseCode;
use crate::due_date::DateConverter;
use crate::feed::Feed;
use crate::record::{BuildOutcome, RecordBuilder, TaskRecord};

/// Why an event produced no task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Course listed in `ignored_courses`
    Ignored,
    /// Due before today, with `skip_past` enabled
    PastDue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedItem {
    pub title: String,
    pub course: Option<CourseCode>,
    pub due_date: NaiveDate,
    pub reason: SkipReason,
}

/// Everything a sync run would do, worked out before touching the database.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub tasks: Vec<TaskRecord>,
    pub skipped: Vec<SkippedItem>,
    /// IANA name of the zone due dates were computed in
    pub time_zone: String,
    pub generated_at: DateTime<Utc>,
}

impl Plan {
    /// Assignments the run accounts for: tasks plus ignored events.
    /// Past-due events are not counted.
    pub fn total_assignments(&self) -> usize {
        self.tasks.len() + self.ignored_count()
    }

    pub fn ignored_count(&self) -> usize {
        self.skipped
            .iter()
            .filter(|item| item.reason == SkipReason::Ignored)
            .count()
    }

    /// Tasks whose course has no project configured.
    pub fn unmapped(&self) -> impl Iterator<Item = &TaskRecord> {
        self.tasks.iter().filter(|task| task.project.is_none())
    }
}

/// Turn parsed feed events into a plan, relative to `today` in the target
/// zone.
pub fn build_plan(feed: &Feed, config: &SyncConfig, today: NaiveDate) -> Plan {
    let dates = DateConverter::resolve(config.time_zone, feed.time_zone.as_deref());
    let builder = RecordBuilder::new(&config.courses, dates);

    let mut tasks = Vec::new();
    let mut skipped = Vec::new();

    for event in &feed.events {
        let outcome = builder.build(event);

        let due_date = dates.to_due_date(&event.due_at);
        if config.skip_past && due_date < today {
            let (title, course) = match outcome {
                BuildOutcome::Record(record) => (record.title, record.course),
                BuildOutcome::Ignored { title, course } => (title, Some(course)),
            };
            debug!(%title, %due_date, "past due, skipping");
            skipped.push(SkippedItem {
                title,
                course,
                due_date,
                reason: SkipReason::PastDue,
            });
            continue;
        }

        match outcome {
            BuildOutcome::Record(record) => tasks.push(record),
            BuildOutcome::Ignored { title, course } => {
                debug!(%title, %course, "course is ignored, skipping");
                skipped.push(SkippedItem {
                    title,
                    course: Some(course),
                    due_date,
                    reason: SkipReason::Ignored,
                });
            }
        }
    }

    Plan {
        tasks,
        skipped,
        time_zone: dates.zone().name().to_string(),
        generated_at: Utc::now(),
    }
}

/// [`build_plan`] relative to the current date in the target zone.
pub fn plan_for_today(feed: &Feed, config: &SyncConfig) -> Plan {
    let today = DateConverter::resolve(config.time_zone, feed.time_zone.as_deref()).today();
    build_plan(feed, config, today)
}
