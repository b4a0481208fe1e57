use std::sync::Mutex;

use chrono::NaiveDate;
use coursesync_core::feed::FeedSource;
use coursesync_core::notion::TaskDatabase;
use coursesync_core::record::{TaskRecord, TaskStatus};
use coursesync_core::sync::{Syncer, load_plan, run_sync};
use coursesync_core::{SyncConfig, SyncError, SyncResult};

const CS124: &str = "25a399d3-5713-8052-ab2b-e817336f99b7";

const CONFIG: &str = r#"
skip_past = false

[courses]
"CS 124" = "https://www.notion.so/Intro-to-CS-25a399d357138052ab2be817336f99b7"
"#;

const SINGLE_EVENT: &str = "BEGIN:VCALENDAR\r
VERSION:2.0\r
PRODID:-//Instructure Inc.//Canvas//EN\r
BEGIN:VEVENT\r
UID:event-assignment-501\r
DTSTART:20250310T235900Z\r
SUMMARY:CS 124 000111: Homework 3\r
LOCATION:cs_124_000_111\r
END:VEVENT\r
END:VCALENDAR\r
";

const THREE_EVENTS: &str = "BEGIN:VCALENDAR\r
VERSION:2.0\r
BEGIN:VEVENT\r
UID:a1\r
DTSTART:20250310T235900Z\r
SUMMARY:Homework 3 [cs_124_000_111]\r
END:VEVENT\r
BEGIN:VEVENT\r
UID:a2\r
DTSTART:20250312T235900Z\r
SUMMARY:Essay Draft [eng_100_120258]\r
END:VEVENT\r
BEGIN:VEVENT\r
UID:a3\r
DTSTART;VALUE=DATE:20250314\r
SUMMARY:Quiz 5 [cs_124_000_111]\r
END:VEVENT\r
END:VCALENDAR\r
";

/// Feed served from a string.
struct InlineFeed(&'static str);

impl FeedSource for InlineFeed {
    async fn fetch(&self) -> SyncResult<String> {
        Ok(self.0.to_string())
    }

    fn describe(&self) -> String {
        "inline".to_string()
    }
}

/// Task database kept in memory. Titles in `reject` fail to create.
#[derive(Default)]
struct MemoryDatabase {
    pages: Mutex<Vec<TaskRecord>>,
    reject: Vec<String>,
}

impl TaskDatabase for &MemoryDatabase {
    async fn find_existing(&self, title: &str, due_date: NaiveDate) -> SyncResult<bool> {
        let pages = self.pages.lock().unwrap();
        Ok(pages
            .iter()
            .any(|page| page.title == title && page.due_date == due_date))
    }

    async fn create_task(&self, record: &TaskRecord) -> SyncResult<String> {
        if self.reject.contains(&record.title) {
            return Err(SyncError::Api {
                status: 400,
                message: "body failed validation".into(),
            });
        }
        let mut pages = self.pages.lock().unwrap();
        pages.push(record.clone());
        Ok(format!("page-{}", pages.len()))
    }
}

#[tokio::test]
async fn single_event_becomes_linked_all_day_task() {
    let config = SyncConfig::from_toml(CONFIG).unwrap();
    let plan = load_plan(&config, &InlineFeed(SINGLE_EVENT)).await.unwrap();

    assert_eq!(
        plan.tasks,
        vec![TaskRecord {
            title: "Homework 3".into(),
            due_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            status: TaskStatus::NotStarted,
            project: Some(CS124.parse().unwrap()),
            course: coursesync_core::course::CourseCode::from_display("CS 124"),
            source_url: None,
        }]
    );
}

#[tokio::test]
async fn second_run_over_unchanged_feed_creates_nothing() {
    let config = SyncConfig::from_toml(CONFIG).unwrap();
    let database = MemoryDatabase::default();
    let feed = InlineFeed(THREE_EVENTS);

    let first = run_sync(&config, &feed, &database).await.unwrap();
    assert_eq!(first.created, 3);
    assert_eq!(first.skipped, 0);

    let second = run_sync(&config, &feed, &database).await.unwrap();
    assert!(second.success);
    assert_eq!(second.total_assignments, 3);
    assert_eq!(second.created, 0);
    assert_eq!(second.skipped, 3);
    assert_eq!(database.pages.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn one_failed_create_does_not_stop_the_run() {
    let config = SyncConfig::from_toml(CONFIG).unwrap();
    let database = MemoryDatabase {
        reject: vec!["Essay Draft".to_string()],
        ..MemoryDatabase::default()
    };

    let plan = load_plan(&config, &InlineFeed(THREE_EVENTS)).await.unwrap();
    let summary = Syncer::new(&database, config.duplicate_policy)
        .sync(&plan)
        .await;

    assert!(summary.success);
    assert_eq!(summary.total_assignments, 3);
    assert_eq!(summary.created, 2);
    assert_eq!(
        summary.errors,
        vec!["Essay Draft: Notion API returned 400: body failed validation".to_string()]
    );

    let titles: Vec<String> = database
        .pages
        .lock()
        .unwrap()
        .iter()
        .map(|page| page.title.clone())
        .collect();
    assert_eq!(titles, vec!["Homework 3", "Quiz 5"]);
}

#[tokio::test]
async fn ignored_courses_count_as_skipped() {
    let config = SyncConfig::from_toml(&format!("ignored_courses = [\"ENG\"]\n{CONFIG}")).unwrap();
    let database = MemoryDatabase::default();

    let summary = run_sync(&config, &InlineFeed(THREE_EVENTS), &database)
        .await
        .unwrap();

    assert_eq!(summary.total_assignments, 3);
    assert_eq!(summary.created, 2);
    assert_eq!(summary.skipped, 1);
}

#[tokio::test]
async fn feed_that_is_not_a_calendar_aborts_the_run() {
    let config = SyncConfig::from_toml(CONFIG).unwrap();
    let database = MemoryDatabase::default();

    let result = run_sync(&config, &InlineFeed("Not Found"), &database).await;

    assert!(matches!(result, Err(SyncError::FeedParse(_))));
    assert!(database.pages.lock().unwrap().is_empty());
}
