//! Sync endpoint

use axum::{Json, Router, extract::State, routing::get};
use coursesync_core::SyncSummary;
use coursesync_core::feed::HttpFeed;
use coursesync_core::notion::NotionClient;
use coursesync_core::sync::run_sync;
use tracing::info;

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/sync", get(sync).post(sync))
}

/// GET|POST /sync - Run one sync pass and return its summary
async fn sync(State(state): State<AppState>) -> Result<Json<SyncSummary>, AppError> {
    let config = state.config();
    info!("sync requested");

    let feed = HttpFeed::from_config(config)?;
    let notion = NotionClient::from_config(config)?;
    let summary = run_sync(config, &feed, notion).await?;

    Ok(Json(summary))
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use coursesync_core::SyncConfig;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::routes::app;
    use crate::state::AppState;

    const FEED: &str = "BEGIN:VCALENDAR\r
VERSION:2.0\r
BEGIN:VEVENT\r
UID:a1\r
DTSTART:20250310T235900Z\r
SUMMARY:CS 124 000111: Homework 3\r
LOCATION:cs_124_000_111\r
END:VEVENT\r
BEGIN:VEVENT\r
UID:a2\r
DTSTART:20250312T235900Z\r
SUMMARY:Survey [citl_100_120258]\r
END:VEVENT\r
END:VCALENDAR\r
";

    fn state(server: &MockServer) -> AppState {
        let config = SyncConfig::from_toml(&format!(
            r#"
feed_url = "{uri}/feed.ics"
notion_token = "secret_server"
database_id = "23e399d3-5713-805c-9c0a-000be677710c"
notion_api_url = "{uri}"
skip_past = false
ignored_courses = ["CITL"]

[courses]
"CS 124" = "25a399d357138052ab2be817336f99b7"
"#,
            uri = server.uri()
        ))
        .unwrap();
        AppState::new(config).unwrap()
    }

    async fn mount_notion(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/v1/databases/23e399d3-5713-805c-9c0a-000be677710c/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
            .mount(server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/pages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "page-1" })))
            .mount(server)
            .await;
    }

    async fn call(state: AppState, method: &str) -> (StatusCode, Value) {
        let response = app(state)
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri("/sync")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_sync_returns_summary() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed.ics"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FEED))
            .mount(&server)
            .await;
        mount_notion(&server).await;

        for verb in ["GET", "POST"] {
            let (status, body) = call(state(&server), verb).await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["success"], true);
            assert_eq!(body["total_assignments"], 2);
            assert_eq!(body["created"], 1);
            assert_eq!(body["skipped"], 1);
            assert_eq!(body["errors"], json!([]));
            assert!(body["timestamp"].is_string());
        }
    }

    #[tokio::test]
    async fn test_feed_failure_is_500_with_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let (status, body) = call(state(&server), "GET").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("Failed to fetch calendar feed"));
        assert!(message.contains("503"));
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;
        let response = app(state(&server))
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_state_requires_credentials() {
        let config = SyncConfig::from_toml("feed_url = \"https://example.edu/feed.ics\"").unwrap();
        assert!(AppState::new(config).is_err());
    }
}
