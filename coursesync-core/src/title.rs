//! Assignment title cleanup.

use once_cell::sync::Lazy;
use regex::Regex;

/// `... [math_231_120258_248828]` at the end of a title
static CONTEXT_CODE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*\[[a-z0-9_]+\]\s*$").expect("context code pattern"));

/// `(MATH 231 - Fall 2025 120258)` and similar groups carrying a long numeric id
static ID_PARENTHETICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\([^)]*\d{5,}[^)]*\)\s*").expect("id group pattern"));

/// `[HIST 281] ...`
static BRACKETED_COURSE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[[A-Z]{2,}\s*\d{3,}[A-Z]*\]\s*").expect("bracketed prefix pattern")
});

/// `CS 124: ...`, `CS 124 000111: ...`, `MATH 231 - ...`
static COURSE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z]{2,}\s*\d{3,}[A-Z]*(?:\s+\d+)*\s*[:\-]\s*").expect("course prefix pattern")
});

/// `... 248828` at the end of a title
static TRAILING_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+\d{5,}$").expect("trailing id pattern"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// Strip identifiers, course codes, and numeric ids from a feed title.
///
/// Rules are applied until nothing changes, so the result is a fixpoint and
/// normalizing it again returns it unchanged. If everything would be
/// stripped, the original title is returned as-is.
pub fn normalize_title(title: &str, raw_identifier: Option<&str>) -> String {
    let identifier = raw_identifier.and_then(identifier_pattern);
    let mut current = title.to_string();

    loop {
        let next = strip_once(&current, identifier.as_ref());
        if next == current {
            break;
        }
        current = next;
    }

    if current.is_empty() {
        title.to_string()
    } else {
        current
    }
}

/// Matches the identifier as a whole token, bracketed or bare, so
/// `cs_124` does not eat into `cs_1245`.
fn identifier_pattern(raw: &str) -> Option<Regex> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let start = if raw.starts_with(is_word) { r"" } else { "" };
    let end = if raw.ends_with(is_word) { r"" } else { "" };
    let escaped = regex::escape(raw);

    Regex::new(&format!(r"\[{escaped}\]|{start}{escaped}{end}")).ok()
}

fn strip_once(title: &str, identifier: Option<&Regex>) -> String {
    let mut s = title.to_string();

    if let Some(identifier) = identifier {
        s = identifier.replace_all(&s, " ").into_owned();
    }

    s = CONTEXT_CODE_SUFFIX.replace(&s, "").into_owned();
    s = ID_PARENTHETICAL.replace_all(&s, " ").into_owned();
    s = WHITESPACE.replace_all(s.trim(), " ").into_owned();
    s = BRACKETED_COURSE_PREFIX.replace(&s, "").into_owned();
    s = COURSE_PREFIX.replace(&s, "").into_owned();
    s = TRAILING_ID.replace(&s, "").into_owned();

    s.trim().to_string()
}
