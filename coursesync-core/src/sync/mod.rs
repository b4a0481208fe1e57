//! The sync engine: feed in, tasks out.
//!
//! A run fetches and parses the feed, builds a [`Plan`], then walks the
//! planned tasks in order against a [`TaskDatabase`]. Only a feed failure
//! aborts a run; per-task failures end up in [`SyncSummary::errors`].

mod plan;

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::feed::{FeedSource, parse_feed};
use crate::notion::TaskDatabase;
use crate::record::TaskRecord;

pub use plan::{Plan, SkipReason, SkippedItem, build_plan, plan_for_today};

/// How to avoid creating the same task twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Look for a task with the same title and due date first
    #[default]
    SkipIfExists,
    AlwaysCreate,
}

/// Result of a sync run, as returned by the HTTP endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub success: bool,
    pub total_assignments: usize,
    pub created: usize,
    pub skipped: usize,
    /// One `"<title>: <error>"` line per failed task
    pub errors: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// What happened to one planned task.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Created { title: String, page_id: String },
    Exists { title: String },
    Failed { title: String, error: String },
}

pub struct Syncer<D> {
    database: D,
    policy: DuplicatePolicy,
}

impl<D: TaskDatabase> Syncer<D> {
    pub fn new(database: D, policy: DuplicatePolicy) -> Self {
        Syncer { database, policy }
    }

    pub fn database(&self) -> &D {
        &self.database
    }

    pub async fn sync(&self, plan: &Plan) -> SyncSummary {
        self.sync_with(plan, |_| {}).await
    }

    /// Sync every planned task, reporting each outcome to `on_outcome` as it
    /// happens.
    pub async fn sync_with<F>(&self, plan: &Plan, mut on_outcome: F) -> SyncSummary
    where
        F: FnMut(&TaskOutcome) + Send,
    {
        let mut summary = SyncSummary {
            success: true,
            total_assignments: plan.total_assignments(),
            created: 0,
            skipped: plan.ignored_count(),
            errors: Vec::new(),
            timestamp: Utc::now(),
        };
        let mut seen: HashSet<(String, NaiveDate)> = HashSet::new();

        for task in &plan.tasks {
            let outcome = self.sync_task(task, &mut seen).await;

            match &outcome {
                TaskOutcome::Created { .. } => summary.created += 1,
                TaskOutcome::Exists { .. } => summary.skipped += 1,
                TaskOutcome::Failed { title, error } => {
                    summary.errors.push(format!("{title}: {error}"));
                }
            }
            on_outcome(&outcome);
        }

        info!(
            total = summary.total_assignments,
            created = summary.created,
            skipped = summary.skipped,
            errors = summary.errors.len(),
            "sync finished"
        );

        summary
    }

    async fn sync_task(
        &self,
        task: &TaskRecord,
        seen: &mut HashSet<(String, NaiveDate)>,
    ) -> TaskOutcome {
        let title = task.title.clone();
        let key = (task.title.clone(), task.due_date);

        if self.policy == DuplicatePolicy::SkipIfExists {
            if seen.contains(&key) {
                debug!(%title, due_date = %task.due_date, "already handled in this run");
                return TaskOutcome::Exists { title };
            }

            match self.database.find_existing(&task.title, task.due_date).await {
                Ok(true) => {
                    debug!(%title, due_date = %task.due_date, "task exists, skipping");
                    seen.insert(key);
                    return TaskOutcome::Exists { title };
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(%title, error = %e, "duplicate check failed");
                    return TaskOutcome::Failed {
                        title,
                        error: e.to_string(),
                    };
                }
            }
        }

        match self.database.create_task(task).await {
            Ok(page_id) => {
                debug!(%title, %page_id, "task created");
                seen.insert(key);
                TaskOutcome::Created { title, page_id }
            }
            Err(e) => {
                warn!(%title, error = %e, "task creation failed");
                TaskOutcome::Failed {
                    title,
                    error: e.to_string(),
                }
            }
        }
    }
}

/// Fetch and parse the feed and plan against today's date.
pub async fn load_plan<S: FeedSource>(config: &SyncConfig, source: &S) -> SyncResult<Plan> {
    let content = source.fetch().await?;
    let feed = parse_feed(&content)?;

    info!(
        source = %source.describe(),
        events = feed.events.len(),
        rejected = feed.rejected.len(),
        "feed loaded"
    );

    Ok(plan_for_today(&feed, config))
}

/// A whole run: load the plan, then sync it with the configured policy.
pub async fn run_sync<S, D>(config: &SyncConfig, source: &S, database: D) -> SyncResult<SyncSummary>
where
    S: FeedSource,
    D: TaskDatabase,
{
    let plan = load_plan(config, source).await?;
    Ok(Syncer::new(database, config.duplicate_policy).sync(&plan).await)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::SyncError;
    use crate::record::TaskStatus;

    #[derive(Default)]
    struct MemoryDatabase {
        pages: Mutex<Vec<TaskRecord>>,
        queries: AtomicUsize,
        fail_queries: bool,
    }

    impl TaskDatabase for MemoryDatabase {
        async fn find_existing(&self, title: &str, due_date: NaiveDate) -> SyncResult<bool> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            if self.fail_queries {
                return Err(SyncError::Api {
                    status: 503,
                    message: "unavailable".into(),
                });
            }
            let pages = self.pages.lock().unwrap();
            Ok(pages
                .iter()
                .any(|p| p.title == title && p.due_date == due_date))
        }

        async fn create_task(&self, record: &TaskRecord) -> SyncResult<String> {
            let mut pages = self.pages.lock().unwrap();
            pages.push(record.clone());
            Ok(format!("page-{}", pages.len()))
        }
    }

    fn task(title: &str, day: u32) -> TaskRecord {
        TaskRecord {
            title: title.into(),
            due_date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            status: TaskStatus::NotStarted,
            project: None,
            course: None,
            source_url: None,
        }
    }

    fn plan(tasks: Vec<TaskRecord>) -> Plan {
        Plan {
            tasks,
            skipped: Vec::new(),
            time_zone: "UTC".into(),
            generated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_same_task_twice_in_one_run_is_created_once() {
        let syncer = Syncer::new(MemoryDatabase::default(), DuplicatePolicy::SkipIfExists);
        let plan = plan(vec![task("Quiz 1", 10), task("Quiz 1", 10), task("Quiz 1", 11)]);

        let summary = syncer.sync(&plan).await;

        assert_eq!(summary.created, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(syncer.database().queries.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_always_create_skips_duplicate_check() {
        let syncer = Syncer::new(MemoryDatabase::default(), DuplicatePolicy::AlwaysCreate);
        let plan = plan(vec![task("Quiz 1", 10), task("Quiz 1", 10)]);

        let summary = syncer.sync(&plan).await;

        assert_eq!(summary.created, 2);
        assert_eq!(summary.skipped, 0);
        assert_eq!(syncer.database().queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_duplicate_check_is_recorded_without_creating() {
        let database = MemoryDatabase {
            fail_queries: true,
            ..MemoryDatabase::default()
        };
        let syncer = Syncer::new(database, DuplicatePolicy::SkipIfExists);

        let summary = syncer.sync(&plan(vec![task("Quiz 1", 10)])).await;

        assert!(summary.success);
        assert_eq!(summary.created, 0);
        assert_eq!(
            summary.errors,
            vec!["Quiz 1: Notion API returned 503: unavailable".to_string()]
        );
        assert!(syncer.database().pages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_outcomes_are_reported_in_order() {
        let syncer = Syncer::new(MemoryDatabase::default(), DuplicatePolicy::SkipIfExists);
        let plan = plan(vec![task("Quiz 1", 10), task("Quiz 1", 10)]);

        let mut outcomes = Vec::new();
        syncer
            .sync_with(&plan, |outcome| outcomes.push(outcome.clone()))
            .await;

        assert_eq!(
            outcomes,
            vec![
                TaskOutcome::Created {
                    title: "Quiz 1".into(),
                    page_id: "page-1".into()
                },
                TaskOutcome::Exists {
                    title: "Quiz 1".into()
                },
            ]
        );
    }

    #[test]
    fn test_summary_json_shape() {
        let summary = SyncSummary {
            success: true,
            total_assignments: 3,
            created: 2,
            skipped: 0,
            errors: vec!["Essay: Notion API returned 400: bad".into()],
            timestamp: "2025-03-01T12:00:00Z".parse().unwrap(),
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": true,
                "total_assignments": 3,
                "created": 2,
                "skipped": 0,
                "errors": ["Essay: Notion API returned 400: bad"],
                "timestamp": "2025-03-01T12:00:00Z"
            })
        );
    }

    #[test]
    fn test_duplicate_policy_names() {
        assert_eq!(
            serde_json::to_value(DuplicatePolicy::SkipIfExists).unwrap(),
            "skip-if-exists"
        );
        assert_eq!(DuplicatePolicy::default(), DuplicatePolicy::SkipIfExists);
    }
}
