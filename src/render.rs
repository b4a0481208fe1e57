//! Colored terminal rendering for coursesync-core types.

use std::collections::BTreeMap;

use coursesync_core::record::TaskRecord;
use coursesync_core::sync::{SkipReason, SkippedItem, TaskOutcome};
use coursesync_core::{Plan, SyncSummary};
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

const NO_COURSE: &str = "(no course)";

impl Render for TaskRecord {
    fn render(&self) -> String {
        let course = self
            .course
            .as_ref()
            .map(|c| c.to_string())
            .unwrap_or_else(|| NO_COURSE.to_string());
        let line = format!(
            "{} {} {} {}",
            "+".green(),
            self.title,
            course.cyan(),
            format!("due {}", self.due_date).dimmed()
        );

        if self.project.is_none() {
            format!("{line} {}", "(no project)".yellow())
        } else {
            line
        }
    }
}

impl Render for SkippedItem {
    fn render(&self) -> String {
        let reason = match self.reason {
            SkipReason::Ignored => "ignored course",
            SkipReason::PastDue => "past due",
        };
        let course = self
            .course
            .as_ref()
            .map(|c| c.to_string())
            .unwrap_or_else(|| NO_COURSE.to_string());

        format!(
            "{} {} {} {}",
            "-".dimmed(),
            self.title.dimmed(),
            course.dimmed(),
            format!("({reason})").dimmed()
        )
    }
}

impl Render for Plan {
    fn render(&self) -> String {
        let mut lines = Vec::new();

        if self.tasks.is_empty() {
            lines.push("No assignments to sync".dimmed().to_string());
        } else {
            lines.push(format!("{} (due dates in {})", "Tasks".bold(), self.time_zone));
            for task in &self.tasks {
                lines.push(format!("  {}", task.render()));
            }
        }

        if !self.skipped.is_empty() {
            lines.push(String::new());
            lines.push("Skipped".bold().to_string());
            for item in &self.skipped {
                lines.push(format!("  {}", item.render()));
            }
        }

        let unmapped = self.unmapped().count();
        if unmapped > 0 {
            lines.push(String::new());
            lines.push(
                format!(
                    "{unmapped} {} no project; add the course under [courses] to link {}",
                    if unmapped == 1 { "task has" } else { "tasks have" },
                    if unmapped == 1 { "it" } else { "them" }
                )
                .yellow()
                .to_string(),
            );
        }

        if !self.tasks.is_empty() {
            lines.push(String::new());
            lines.push("By course".bold().to_string());
            for (course, count) in count_by_course(&self.tasks) {
                lines.push(format!("  {course:<12} {count}"));
            }
        }

        lines.join("\n")
    }
}

/// Task counts per course, courseless tasks last.
fn count_by_course(tasks: &[TaskRecord]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<Option<String>, usize> = BTreeMap::new();
    for task in tasks {
        *counts
            .entry(task.course.as_ref().map(|c| c.to_string()))
            .or_default() += 1;
    }

    let mut rows: Vec<(String, usize)> = counts
        .iter()
        .filter_map(|(course, count)| course.clone().map(|c| (c, *count)))
        .collect();
    if let Some(count) = counts.get(&None) {
        rows.push((NO_COURSE.to_string(), *count));
    }
    rows
}

impl Render for TaskOutcome {
    fn render(&self) -> String {
        match self {
            TaskOutcome::Created { title, .. } => format!("{} {}", "+".green(), title.green()),
            TaskOutcome::Exists { title } => {
                format!("{} {} {}", "=".dimmed(), title.dimmed(), "(exists)".dimmed())
            }
            TaskOutcome::Failed { title, error } => {
                format!("{} {} {}", "!".red(), title.red(), error.dimmed())
            }
        }
    }
}

impl Render for SyncSummary {
    fn render(&self) -> String {
        let mut lines = vec![format!(
            "Synced {} assignments: {} created, {} skipped",
            self.total_assignments,
            self.created.green(),
            self.skipped
        )];

        if !self.errors.is_empty() {
            lines.push(format!("{} errors:", self.errors.len()).red().to_string());
            for error in &self.errors {
                lines.push(format!("  {}", error.red()));
            }
        }

        lines.join("\n")
    }
}
