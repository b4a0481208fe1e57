//! Course codes and the course → project mapping table.
//!
//! Feed events identify their course with an underscore-delimited context
//! code (`math_231_120258_248828`). The mapper reduces that to a display
//! code (`MATH 231`) and looks it up in the table loaded from config.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::{SyncError, SyncResult};

static DISPLAY_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([A-Za-z]+)\s*(\d+)\s*$").expect("display code pattern"));

/// Course codes written into titles: `[HIST 281]`, `(HIST 281)`, or a leading `HIST 281:`.
static TITLE_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\[(]([A-Z]{2,})\s*(\d{3,})[A-Z]*[\])]|^([A-Z]{2,})\s*(\d{3,})[A-Z]*(?:\s+\d+)*\s*[:\-]")
        .expect("title code pattern")
});

/// Notion page ids: bare 32-hex or hyphenated, optionally at the end of a page URL.
static PAGE_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)([0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}|[0-9a-f]{32})/?(?:[?#].*)?$",
    )
    .expect("page id pattern")
});

/// A normalized course code such as `MATH 231`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CourseCode {
    department: String,
    number: String,
}

impl CourseCode {
    /// Build a code from its two tokens. The department must be alphabetic
    /// and the number numeric.
    pub fn new(department: &str, number: &str) -> Option<Self> {
        let valid = !department.is_empty()
            && !number.is_empty()
            && department.chars().all(|c| c.is_ascii_alphabetic())
            && number.chars().all(|c| c.is_ascii_digit());

        valid.then(|| CourseCode {
            department: department.to_ascii_uppercase(),
            number: number.to_string(),
        })
    }

    /// Parse a feed identifier of the form `<dept>_<number>_<extra-digits>`.
    ///
    /// Trailing tokens are optional but must be numeric when present.
    pub fn from_identifier(raw: &str) -> Option<Self> {
        let mut tokens = raw.trim().split('_');
        let department = tokens.next()?;
        let number = tokens.next()?;

        if !tokens.all(|t| !t.is_empty() && t.chars().all(|c| c.is_ascii_digit())) {
            return None;
        }

        Self::new(department, number)
    }

    /// Parse a display code such as `CS 124` or `cs124`.
    pub fn from_display(s: &str) -> Option<Self> {
        let caps = DISPLAY_CODE.captures(s)?;
        Self::new(&caps[1], &caps[2])
    }

    /// Find a display-form course code written into an event title.
    pub fn find_in_title(title: &str) -> Option<Self> {
        let caps = TITLE_CODE.captures(title)?;
        let department = caps.get(1).or_else(|| caps.get(3))?;
        let number = caps.get(2).or_else(|| caps.get(4))?;
        Self::new(department.as_str(), number.as_str())
    }

    pub fn department(&self) -> &str {
        &self.department
    }

    pub fn number(&self) -> &str {
        &self.number
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.department, self.number)
    }
}

impl Serialize for CourseCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CourseCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        CourseCode::from_display(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid course code '{s}'")))
    }
}

/// Reference to the Notion page that represents a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectRef(Uuid);

impl ProjectRef {
    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl FromStr for ProjectRef {
    type Err = SyncError;

    /// Accepts a bare id, a hyphenated id, or a `notion.so` page URL.
    fn from_str(s: &str) -> SyncResult<Self> {
        let s = s.trim();
        PAGE_ID
            .captures(s)
            .and_then(|caps| Uuid::parse_str(&caps[1]).ok())
            .map(ProjectRef)
            .ok_or_else(|| SyncError::Config(format!("'{s}' is not a Notion page id or URL")))
    }
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl Serialize for ProjectRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Result of looking a course up in the mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingOutcome {
    Mapped(ProjectRef),
    /// No project is configured for the course. Not an error: the task is
    /// still created, just without a project link.
    Unmapped,
}

impl MappingOutcome {
    pub fn project(self) -> Option<ProjectRef> {
        match self {
            MappingOutcome::Mapped(project) => Some(project),
            MappingOutcome::Unmapped => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum IgnoreRule {
    Course(CourseCode),
    Department(String),
}

/// Static course → project table. Built once from config, never mutated.
#[derive(Debug, Clone, Default)]
pub struct CourseMapping {
    courses: BTreeMap<CourseCode, ProjectRef>,
    ignored: Vec<IgnoreRule>,
}

impl CourseMapping {
    /// Build the table from raw config entries.
    ///
    /// Keys go through [`CourseCode::from_display`], so `"CS124"` and
    /// `"cs 124"` configure the same course. Ignore entries may be a full
    /// code (`"CS 199"`) or a bare department (`"CITL"`).
    pub fn from_table(table: &BTreeMap<String, String>, ignored: &[String]) -> SyncResult<Self> {
        let mut courses = BTreeMap::new();

        for (key, value) in table {
            let code = CourseCode::from_display(key).ok_or_else(|| {
                SyncError::Config(format!("Invalid course code '{key}' in [courses]"))
            })?;
            let project = value.parse::<ProjectRef>().map_err(|_| {
                SyncError::Config(format!(
                    "Course '{key}': '{value}' is not a Notion page id or URL"
                ))
            })?;
            courses.insert(code, project);
        }

        let ignored = ignored
            .iter()
            .map(|entry| {
                let trimmed = entry.trim();
                if let Some(code) = CourseCode::from_display(trimmed) {
                    Ok(IgnoreRule::Course(code))
                } else if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
                    Ok(IgnoreRule::Department(trimmed.to_ascii_uppercase()))
                } else {
                    Err(SyncError::Config(format!(
                        "Invalid entry '{entry}' in ignored_courses"
                    )))
                }
            })
            .collect::<SyncResult<Vec<_>>>()?;

        Ok(CourseMapping { courses, ignored })
    }

    pub fn lookup(&self, code: &CourseCode) -> MappingOutcome {
        match self.courses.get(code) {
            Some(project) => MappingOutcome::Mapped(*project),
            None => MappingOutcome::Unmapped,
        }
    }

    pub fn is_ignored(&self, code: &CourseCode) -> bool {
        self.ignored.iter().any(|rule| match rule {
            IgnoreRule::Course(ignored) => ignored == code,
            IgnoreRule::Department(department) => department == code.department(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CourseCode, &ProjectRef)> {
        self.courses.iter()
    }

    /// Ignore rules in display form, for listing.
    pub fn ignored(&self) -> Vec<String> {
        self.ignored
            .iter()
            .map(|rule| match rule {
                IgnoreRule::Course(code) => code.to_string(),
                IgnoreRule::Department(department) => department.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}
