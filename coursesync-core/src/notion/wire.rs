//! Request bodies for the Notion API.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::config::PropertyNames;
use crate::record::{TaskRecord, TaskStatus};

const SOURCE_LINK_TEXT: &str = "View assignment";

/// Database query matching tasks by exact title and due date.
pub(crate) fn duplicate_query(properties: &PropertyNames, title: &str, due_date: NaiveDate) -> Value {
    json!({
        "filter": {
            "and": [
                { "property": properties.title, "title": { "equals": title } },
                { "property": properties.due_date, "date": { "equals": due_date.format("%Y-%m-%d").to_string() } }
            ]
        },
        "page_size": 1
    })
}

/// Page creation request for one task.
pub(crate) fn create_page(database_id: &str, properties: &PropertyNames, record: &TaskRecord) -> Value {
    let status = match record.status {
        TaskStatus::NotStarted => properties.status_value.as_str(),
    };

    let mut props = Map::new();
    props.insert(
        properties.title.clone(),
        json!({ "title": [{ "text": { "content": record.title } }] }),
    );
    // Date only, no time: Notion shows it as an all-day date
    props.insert(
        properties.due_date.clone(),
        json!({ "date": { "start": record.due_date.format("%Y-%m-%d").to_string() } }),
    );
    props.insert(properties.status.clone(), json!({ "status": { "name": status } }));
    if let Some(project) = record.project {
        props.insert(
            properties.project.clone(),
            json!({ "relation": [{ "id": project.to_string() }] }),
        );
    }

    let children: Vec<Value> = record
        .source_url
        .iter()
        .map(|url| {
            json!({
                "object": "block",
                "type": "paragraph",
                "paragraph": {
                    "rich_text": [{
                        "type": "text",
                        "text": { "content": SOURCE_LINK_TEXT, "link": { "url": url } }
                    }]
                }
            })
        })
        .collect();

    json!({
        "parent": { "database_id": database_id },
        "properties": props,
        "children": children,
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct QueryResponse {
    #[serde(default)]
    pub results: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageResponse {
    pub id: String,
}

/// Error body returned by the API on non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
}
