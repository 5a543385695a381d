//! Payload validators. Each validator maps a JSON payload to a
//! field -> message map; an empty map means the payload is acceptable.
//! At most one message per field, first failing rule wins. In partial mode
//! only keys present in the payload are checked.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

pub type FieldErrors = BTreeMap<String, String>;

pub const ISSUE_TYPES: [&str; 3] = ["task", "bug", "story"];
pub const ISSUE_STATUSES: [&str; 4] = ["backlog", "selected", "inprogress", "done"];
pub const ISSUE_PRIORITIES: [&str; 5] = ["1", "2", "3", "4", "5"];
pub const PROJECT_CATEGORIES: [&str; 3] = ["software", "marketing", "business"];

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r".+@.+\..+").unwrap());
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:http(s)?://)?[\w.-]+(?:\.[\w.-]+)+[\w\-._~:/?#\[\]@!$&'()*+,;=.]+$").unwrap()
});

pub fn validate_project(payload: &Value) -> FieldErrors {
    let mut errors = FieldErrors::new();

    let name = payload.get("name");
    if is_nil_or_empty(name) {
        add_error(&mut errors, "name", "This field is required");
    } else if text_of(name).is_some_and(|name| name.chars().count() > 100) {
        add_error(&mut errors, "name", "Must be at most 100 characters");
    }

    let category = payload.get("category");
    if is_nil_or_empty(category) {
        add_error(&mut errors, "category", "This field is required");
    } else if !text_of(category).is_some_and(|c| PROJECT_CATEGORIES.contains(&c.as_str())) {
        add_error(&mut errors, "category", choice_message(&PROJECT_CATEGORIES));
    }

    let url = payload.get("url");
    if !is_nil_or_empty(url) && !text_of(url).is_some_and(|url| URL_RE.is_match(&url)) {
        add_error(&mut errors, "url", "Must be a valid URL");
    }

    errors
}

pub fn validate_issue(payload: &Value, partial: bool) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if !partial || payload.get("title").is_some() {
        let title = payload.get("title");
        if is_nil_or_empty(title) {
            add_error(&mut errors, "title", "This field is required");
        } else if text_of(title).is_some_and(|title| title.chars().count() > 200) {
            add_error(&mut errors, "title", "Must be at most 200 characters");
        }
    }

    validate_choice(&mut errors, payload, "type", &ISSUE_TYPES, partial);
    validate_choice(&mut errors, payload, "status", &ISSUE_STATUSES, partial);
    validate_choice(&mut errors, payload, "priority", &ISSUE_PRIORITIES, partial);

    let mut required_int_fields = vec!["reporterId"];
    if !partial {
        required_int_fields.push("projectId");
    }
    for field in required_int_fields {
        if !partial || payload.get(field).is_some() {
            if payload.get(field).and_then(to_int).is_none() {
                add_error(&mut errors, field, "This field is required");
            }
        }
    }

    if let Some(value) = payload.get("listPosition") {
        if to_float(value).is_none() {
            add_error(&mut errors, "listPosition", "This field is required");
        }
    }

    for field in ["estimate", "timeSpent", "timeRemaining"] {
        if let Some(value) = payload.get(field) {
            if !value.is_null() && to_int(value).is_none() {
                add_error(&mut errors, field, "Must be a number");
            }
        }
    }

    if let Some(value) = payload.get("userIds") {
        if !value.is_array() {
            add_error(&mut errors, "userIds", "Must be an array");
        }
    }

    errors
}

pub fn validate_comment(payload: &Value, partial: bool) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if !partial || payload.get("body").is_some() {
        let body = payload.get("body");
        if is_nil_or_empty(body) {
            add_error(&mut errors, "body", "This field is required");
        } else if text_of(body).is_some_and(|body| body.chars().count() > 50000) {
            add_error(&mut errors, "body", "Must be at most 50000 characters");
        }
    }

    errors
}

pub fn validate_user(payload: &Value) -> FieldErrors {
    let mut errors = FieldErrors::new();

    let name = payload.get("name");
    if is_nil_or_empty(name) {
        add_error(&mut errors, "name", "This field is required");
    } else if text_of(name).is_some_and(|name| name.chars().count() > 100) {
        add_error(&mut errors, "name", "Must be at most 100 characters");
    }

    let email = payload.get("email");
    if is_nil_or_empty(email) {
        add_error(&mut errors, "email", "This field is required");
    } else if text_of(email).is_some_and(|email| email.chars().count() > 200) {
        add_error(&mut errors, "email", "Must be at most 200 characters");
    } else if !text_of(email).is_some_and(|email| EMAIL_RE.is_match(&email)) {
        add_error(&mut errors, "email", "Must be a valid email");
    }

    errors
}

/// Assignee ids from either a `userIds` array or a `users` array of objects.
/// Ids are coerced to integers, deduplicated preserving first-seen order, and
/// anything non-coercible is silently dropped.
pub fn extract_user_ids(payload: &Value) -> Vec<i64> {
    let raw: Vec<&Value> = if let Some(ids) = payload.get("userIds").and_then(Value::as_array) {
        ids.iter().collect()
    } else if let Some(users) = payload.get("users").and_then(Value::as_array) {
        users
            .iter()
            .filter(|user| user.is_object())
            .filter_map(|user| user.get("id"))
            .collect()
    } else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut normalized = Vec::new();
    for value in raw {
        let Some(id) = to_int(value) else { continue };
        if seen.insert(id) {
            normalized.push(id);
        }
    }
    normalized
}

/// Missing, `null`, or `""`.
fn is_nil_or_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// String form of a scalar value; objects and arrays have none.
pub fn text_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Integer coercion: JSON numbers and numeric strings count, `null` and `""`
/// do not.
pub fn to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<i64>().ok()
            }
        }
        _ => None,
    }
}

pub fn to_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    }
}

fn add_error(errors: &mut FieldErrors, field: &str, message: impl Into<String>) {
    errors
        .entry(field.to_string())
        .or_insert_with(|| message.into());
}

fn validate_choice(
    errors: &mut FieldErrors,
    payload: &Value,
    field: &str,
    options: &[&str],
    partial: bool,
) {
    if partial && payload.get(field).is_none() {
        return;
    }
    let value = payload.get(field);
    if is_nil_or_empty(value) {
        add_error(errors, field, "This field is required");
    } else if !text_of(value).is_some_and(|v| options.contains(&v.as_str())) {
        add_error(errors, field, choice_message(options));
    }
}

fn choice_message(options: &[&str]) -> String {
    let mut sorted = options.to_vec();
    sorted.sort_unstable();
    format!("Must be one of: {}", sorted.join(", "))
}
