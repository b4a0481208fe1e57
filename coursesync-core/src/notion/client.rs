use chrono::NaiveDate;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::{PropertyNames, SyncConfig};
use crate::error::{SyncError, SyncResult};
use crate::record::TaskRecord;

use super::TaskDatabase;
use super::wire::{self, ApiErrorBody, PageResponse, QueryResponse};

/// API version every request is pinned to.
pub const NOTION_VERSION: &str = "2022-06-28";

/// Client for one Notion tasks database.
#[derive(Debug, Clone)]
pub struct NotionClient {
    http: reqwest::Client,
    api_url: Url,
    token: String,
    database_id: String,
    properties: PropertyNames,
}

impl NotionClient {
    pub fn new(
        http: reqwest::Client,
        api_url: Url,
        token: impl Into<String>,
        database_id: impl Into<String>,
        properties: PropertyNames,
    ) -> Self {
        NotionClient {
            http,
            api_url,
            token: token.into(),
            database_id: database_id.into(),
            properties,
        }
    }

    /// Build a client from config. Token and database id are required.
    pub fn from_config(config: &SyncConfig) -> SyncResult<Self> {
        let token = config.notion_token.clone().ok_or_else(|| {
            SyncError::Config(
                "notion_token is required (set it in the config file or COURSESYNC_NOTION_TOKEN)"
                    .into(),
            )
        })?;
        let database_id = config.database_id.clone().ok_or_else(|| {
            SyncError::Config(
                "database_id is required (set it in the config file or COURSESYNC_DATABASE_ID)"
                    .into(),
            )
        })?;

        Ok(NotionClient::new(
            config.http_client()?,
            config.notion_api_url.clone(),
            token,
            database_id.trim(),
            config.properties.clone(),
        ))
    }

    fn endpoint(&self, path: &str) -> SyncResult<Url> {
        let mut base = self.api_url.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path)
            .map_err(|e| SyncError::Config(format!("Invalid Notion endpoint '{path}': {e}")))
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> SyncResult<T> {
        let url = self.endpoint(path)?;

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        debug!(status = status.as_u16(), path, "Notion response");

        if !status.is_success() {
            return Err(api_error(status, response).await);
        }

        Ok(response.json().await?)
    }
}

/// Turn a non-2xx response into [`SyncError::Api`], keeping the API's own
/// message when the body has one.
async fn api_error(status: StatusCode, response: Response) -> SyncError {
    let text = response.text().await.unwrap_or_default();

    let message = match serde_json::from_str::<ApiErrorBody>(&text) {
        Ok(ApiErrorBody {
            code: Some(code),
            message: Some(message),
        }) => format!("{message} ({code})"),
        Ok(ApiErrorBody {
            message: Some(message),
            ..
        }) => message,
        _ if !text.trim().is_empty() => text,
        _ => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    };

    SyncError::Api {
        status: status.as_u16(),
        message,
    }
}

impl TaskDatabase for NotionClient {
    async fn find_existing(&self, title: &str, due_date: NaiveDate) -> SyncResult<bool> {
        let body = wire::duplicate_query(&self.properties, title, due_date);
        let path = format!("v1/databases/{}/query", self.database_id);

        let response: QueryResponse = self.post(&path, &body).await?;
        Ok(!response.results.is_empty())
    }

    async fn create_task(&self, record: &TaskRecord) -> SyncResult<String> {
        let body = wire::create_page(&self.database_id, &self.properties, record);

        let page: PageResponse = self.post("v1/pages", &body).await?;
        debug!(page_id = %page.id, title = %record.title, "created Notion page");
        Ok(page.id)
    }
}
