use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

static HTML_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Issue {
    pub id: i64,
    pub title: String,
    #[sqlx(rename = "type")]
    pub issue_type: String,
    pub status: String,
    pub priority: String,
    pub list_position: f64,
    pub description: Option<String>,
    /// Tag-stripped projection of `description`, used for search. Always
    /// recomputed from `description` before persisting, never set directly.
    pub description_text: Option<String>,
    pub estimate: Option<i32>,
    pub time_spent: Option<i32>,
    pub time_remaining: Option<i32>,
    pub reporter_id: i64,
    pub project_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Remove `<tag>`-shaped substrings from rich-text markup.
pub fn strip_tags(html: &str) -> String {
    HTML_TAG_RE.replace_all(html, "").into_owned()
}
