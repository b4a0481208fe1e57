//! Sync configuration.
//!
//! Read from `~/.config/coursesync/config.toml` (or an explicit path) and
//! overridden by `COURSESYNC_*` environment variables, then validated into a
//! typed [`SyncConfig`] that is handed to each component.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use url::Url;

use crate::course::CourseMapping;
use crate::error::{SyncError, SyncResult};
use crate::sync::DuplicatePolicy;

pub const DEFAULT_NOTION_API_URL: &str = "https://api.notion.com";

const ENV_PREFIX: &str = "COURSESYNC";

/// Written by `coursesync init`; every option commented out.
const DEFAULT_CONFIG: &str = "\
# coursesync configuration

# Calendar feed to read assignments from (webcal:// links work too):
# feed_url = \"https://canvas.example.edu/feeds/calendars/user_XXXX.ics\"

# Notion integration token and the id of the tasks database:
# notion_token = \"secret_...\"
# database_id = \"23e399d3-5713-805c-9c0a-000be677710c\"

# Zone used to turn due timestamps into dates (defaults to the feed's zone):
# time_zone = \"America/Chicago\"

# \"skip-if-exists\" checks Notion for a task with the same name and due date
# before creating one; \"always-create\" does not:
# duplicate_policy = \"skip-if-exists\"

# Ignore assignments that are already past due:
# skip_past = true

# Give up on slow HTTP requests after this long:
# http_timeout = \"30s\"

# Courses (or whole departments) whose events are never synced:
# ignored_courses = [\"CITL\"]

# Notion property names, if your database uses different ones:
# [properties]
# title = \"Name\"
# due_date = \"Due Date\"
# status = \"Status\"
# status_value = \"Not started\"
# project = \"Project\"

# Course code -> Notion project page (id or URL):
# [courses]
# \"CS 124\" = \"https://www.notion.so/25a399d357138052ab2be817336f99b7\"
# \"MATH 231\" = \"25a399d3571380a9899bfd0aa5f4d4c6\"
";

/// Names of the Notion database properties tasks are written to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PropertyNames {
    pub title: String,
    pub due_date: String,
    pub status: String,
    /// Status option new tasks are created with
    pub status_value: String,
    pub project: String,
}

impl Default for PropertyNames {
    fn default() -> Self {
        PropertyNames {
            title: "Name".into(),
            due_date: "Due Date".into(),
            status: "Status".into(),
            status_value: "Not started".into(),
            project: "Project".into(),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_NOTION_API_URL.to_string()
}

fn default_skip_past() -> bool {
    true
}

/// Configuration as written by the user, before validation.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    feed_url: Option<String>,
    notion_token: Option<String>,
    database_id: Option<String>,
    #[serde(default = "default_api_url")]
    notion_api_url: String,
    time_zone: Option<String>,
    #[serde(default)]
    duplicate_policy: DuplicatePolicy,
    #[serde(default = "default_skip_past")]
    skip_past: bool,
    http_timeout: Option<String>,
    #[serde(default)]
    ignored_courses: Vec<String>,
    #[serde(default)]
    properties: PropertyNames,
    #[serde(default)]
    courses: BTreeMap<String, String>,
}

/// Validated configuration for one sync run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub feed_url: Option<Url>,
    pub notion_token: Option<String>,
    pub database_id: Option<String>,
    pub notion_api_url: Url,
    /// Zone due dates are computed in; falls back to the feed's zone
    pub time_zone: Option<Tz>,
    pub duplicate_policy: DuplicatePolicy,
    /// Drop events due before today
    pub skip_past: bool,
    pub http_timeout: Option<Duration>,
    pub properties: PropertyNames,
    pub courses: CourseMapping,
}

impl SyncConfig {
    /// Default location: ~/.config/coursesync/config.toml
    pub fn config_path() -> SyncResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SyncError::Config("Could not determine config directory".into()))?
            .join("coursesync");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from `path` (required to exist) or from the default location
    /// (optional), with environment overrides applied on top.
    pub fn load(path: Option<&Path>) -> SyncResult<Self> {
        Self::load_with_env(path, None)
    }

    /// Parse configuration from TOML text alone, without the environment.
    pub fn from_toml(contents: &str) -> SyncResult<Self> {
        let raw: ConfigFile = Config::builder()
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()
            .map_err(|e| SyncError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| SyncError::Config(e.to_string()))?;

        Self::validate(raw)
    }

    fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> SyncResult<Self> {
        let file = match path {
            Some(path) => {
                let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref());
                File::from(expanded).required(true)
            }
            None => File::from(Self::config_path()?).required(false),
        };

        let environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("ignored_courses")
            .try_parsing(true)
            .source(env);

        let raw: ConfigFile = Config::builder()
            .add_source(file)
            .add_source(environment)
            .build()
            .map_err(|e| SyncError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| SyncError::Config(e.to_string()))?;

        Self::validate(raw)
    }

    fn validate(raw: ConfigFile) -> SyncResult<Self> {
        let feed_url = raw
            .feed_url
            .filter(|s| !s.trim().is_empty())
            .map(|s| parse_feed_url(&s))
            .transpose()?;

        let notion_api_url = Url::parse(&raw.notion_api_url).map_err(|e| {
            SyncError::Config(format!("Invalid notion_api_url '{}': {e}", raw.notion_api_url))
        })?;

        let time_zone = raw
            .time_zone
            .filter(|s| !s.trim().is_empty())
            .map(|name| {
                name.trim()
                    .parse::<Tz>()
                    .map_err(|_| SyncError::Config(format!("Unknown time_zone '{name}'")))
            })
            .transpose()?;

        let http_timeout = raw
            .http_timeout
            .map(|s| {
                humantime::parse_duration(&s)
                    .map_err(|e| SyncError::Config(format!("Invalid http_timeout '{s}': {e}")))
            })
            .transpose()?;

        let courses = CourseMapping::from_table(&raw.courses, &raw.ignored_courses)?;

        Ok(SyncConfig {
            feed_url,
            notion_token: raw.notion_token.filter(|s| !s.trim().is_empty()),
            database_id: raw.database_id.filter(|s| !s.trim().is_empty()),
            notion_api_url,
            time_zone,
            duplicate_policy: raw.duplicate_policy,
            skip_past: raw.skip_past,
            http_timeout,
            properties: raw.properties,
            courses,
        })
    }

    /// HTTP client shared by the feed fetcher and the Notion client.
    pub fn http_client(&self) -> SyncResult<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("coursesync/", env!("CARGO_PKG_VERSION")));

        if let Some(timeout) = self.http_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(builder.build()?)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> SyncResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SyncError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, DEFAULT_CONFIG)
            .map_err(|e| SyncError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

/// `webcal://` is a subscription alias for `https://`.
fn parse_feed_url(s: &str) -> SyncResult<Url> {
    let s = s.trim();
    let normalized = match s.strip_prefix("webcal://") {
        Some(rest) => format!("https://{rest}"),
        None => s.to_string(),
    };

    Url::parse(&normalized).map_err(|e| SyncError::Config(format!("Invalid feed_url: {e}")))
}
