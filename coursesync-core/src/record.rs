//! Task records built from feed events.

use chrono::NaiveDate;
use serde::Serialize;

use crate::course::{CourseCode, CourseMapping, ProjectRef};
use crate::due_date::DateConverter;
use crate::event::CalendarEvent;
use crate::title::normalize_title;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaskStatus {
    NotStarted,
}

/// A task ready to be created in the database.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRecord {
    pub title: String,
    /// All-day: a date with no time of day
    pub due_date: NaiveDate,
    pub status: TaskStatus,
    /// `None` when the course has no configured project
    pub project: Option<ProjectRef>,
    pub course: Option<CourseCode>,
    pub source_url: Option<String>,
}

/// What became of one event.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutcome {
    Record(TaskRecord),
    /// The event's course is listed in `ignored_courses`
    Ignored { title: String, course: CourseCode },
}

/// Turns feed events into task records using the course table and a date
/// converter.
pub struct RecordBuilder<'a> {
    courses: &'a CourseMapping,
    dates: DateConverter,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(courses: &'a CourseMapping, dates: DateConverter) -> Self {
        RecordBuilder { courses, dates }
    }

    pub fn build(&self, event: &CalendarEvent) -> BuildOutcome {
        let course = resolve_course(event);
        let title = normalize_title(&event.title, event.raw_identifier.as_deref());

        if let Some(code) = course.as_ref().filter(|code| self.courses.is_ignored(code)) {
            return BuildOutcome::Ignored {
                title,
                course: code.clone(),
            };
        }

        let project = course
            .as_ref()
            .and_then(|code| self.courses.lookup(code).project());

        BuildOutcome::Record(TaskRecord {
            title,
            due_date: self.dates.to_due_date(&event.due_at),
            status: TaskStatus::NotStarted,
            project,
            course,
            source_url: event.url.clone(),
        })
    }
}

/// The identifier wins; a code written into the title is the fallback.
fn resolve_course(event: &CalendarEvent) -> Option<CourseCode> {
    event
        .raw_identifier
        .as_deref()
        .and_then(CourseCode::from_identifier)
        .or_else(|| CourseCode::find_in_title(&event.title))
}
