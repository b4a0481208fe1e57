use std::path::Path;

use anyhow::Result;
use coursesync_core::notion::NotionClient;
use coursesync_core::sync::TaskOutcome;
use coursesync_core::{DuplicatePolicy, SyncConfig, SyncSummary, Syncer};
use tracing::debug;

use crate::render::Render;
use crate::utils::tui;

pub async fn run(
    config: SyncConfig,
    feed_file: Option<&Path>,
    always_create: bool,
    json: bool,
) -> Result<()> {
    let summary = sync(config, feed_file, always_create, json).await?;
    println!("{}", format_summary(&summary, json)?);
    Ok(())
}

async fn sync(
    mut config: SyncConfig,
    feed_file: Option<&Path>,
    always_create: bool,
    json: bool,
) -> Result<SyncSummary> {
    if always_create {
        config.duplicate_policy = DuplicatePolicy::AlwaysCreate;
    }

    // Fail on missing credentials before fetching anything
    let notion = NotionClient::from_config(&config)?;

    let spinner = if json {
        tui::hidden_spinner()
    } else {
        tui::create_spinner("Reading feed".to_string())
    };

    let plan = match super::plan_from(&config, feed_file, &spinner).await {
        Ok(plan) => plan,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e);
        }
    };

    let total = plan.tasks.len();
    debug!(tasks = total, policy = ?config.duplicate_policy, "starting sync");
    let mut done = 0;
    spinner.set_message(format!("Syncing 0/{total}"));

    let syncer = Syncer::new(notion, config.duplicate_policy);
    let summary = syncer
        .sync_with(&plan, |outcome: &TaskOutcome| {
            done += 1;
            if !json {
                spinner.println(outcome.render());
            }
            spinner.set_message(format!("Syncing {done}/{total}"));
        })
        .await;
    spinner.finish_and_clear();

    Ok(summary)
}

fn format_summary(summary: &SyncSummary, json: bool) -> Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(summary)?)
    } else {
        Ok(format!("\n{}", summary.render()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DATABASE_ID: &str = "23e399d3-5713-805c-9c0a-000be677710c";

    const FEED: &str = "BEGIN:VCALENDAR\r
VERSION:2.0\r
BEGIN:VEVENT\r
UID:a1\r
DTSTART:20250310T235900Z\r
SUMMARY:Homework 3 [cs_124_000_111]\r
END:VEVENT\r
END:VCALENDAR\r
";

    fn config(server: &MockServer) -> SyncConfig {
        SyncConfig::from_toml(&format!(
            r#"
notion_token = "secret_cli"
database_id = "{DATABASE_ID}"
notion_api_url = "{uri}"
skip_past = false
"#,
            uri = server.uri()
        ))
        .unwrap()
    }

    fn feed_file() -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), FEED).unwrap();
        file
    }

    async fn mount_existing_task(server: &MockServer, query_calls: u64) {
        Mock::given(method("POST"))
            .and(path(format!("/v1/databases/{DATABASE_ID}/query")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "results": [{ "id": "old" }] })),
            )
            .expect(query_calls)
            .mount(server)
            .await;
    }

    async fn mount_create(server: &MockServer, create_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/v1/pages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "new-page" })))
            .expect(create_calls)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_existing_task_is_skipped_by_default() {
        let server = MockServer::start().await;
        mount_existing_task(&server, 1).await;
        mount_create(&server, 0).await;
        let feed = feed_file();

        let summary = sync(config(&server), Some(feed.path()), false, true)
            .await
            .unwrap();

        assert_eq!(summary.created, 0);
        assert_eq!(summary.skipped, 1);
    }

    #[tokio::test]
    async fn test_always_create_bypasses_duplicate_check() {
        let server = MockServer::start().await;
        mount_existing_task(&server, 0).await;
        mount_create(&server, 1).await;
        let feed = feed_file();

        let summary = sync(config(&server), Some(feed.path()), true, false)
            .await
            .unwrap();

        assert_eq!(summary.created, 1);
        assert_eq!(summary.skipped, 0);
    }

    #[tokio::test]
    async fn test_json_output_is_the_summary_document() {
        let server = MockServer::start().await;
        mount_existing_task(&server, 0).await;
        mount_create(&server, 1).await;
        let feed = feed_file();

        let summary = sync(config(&server), Some(feed.path()), true, true)
            .await
            .unwrap();
        let output: Value = serde_json::from_str(&format_summary(&summary, true).unwrap()).unwrap();

        assert_eq!(output["success"], true);
        assert_eq!(output["total_assignments"], 1);
        assert_eq!(output["created"], 1);
        assert_eq!(output["skipped"], 0);
        assert_eq!(output["errors"], json!([]));
        assert!(output["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_before_reading_feed() {
        let config = SyncConfig::from_toml("skip_past = false").unwrap();
        let err = sync(config, Some(Path::new("/not/read.ics")), false, true)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("notion_token"));
    }
}
