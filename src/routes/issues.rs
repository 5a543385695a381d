use std::collections::{HashMap, HashSet};

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::PgPool;

use super::JsonPayload;
use crate::auth::extractor::CurrentUser;
use crate::db;
use crate::db::issues::NewIssue;
use crate::error::ApiError;
use crate::models::issue::strip_tags;
use crate::models::{Comment, User};
use crate::serialize::{serialize_issue, serialize_issue_detail};
use crate::state::SharedState;
use crate::validate;
use crate::validate::{text_of, to_float, to_int};

#[derive(Deserialize)]
pub struct IssuesQuery {
    #[serde(rename = "searchTerm")]
    pub search_term: Option<String>,
}

/// Issues in the current user's project, optionally filtered by a
/// case-insensitive substring match on title or plain-text description.
pub async fn list(
    CurrentUser(user): CurrentUser,
    State(state): State<SharedState>,
    Query(query): Query<IssuesQuery>,
) -> Result<Json<Value>, ApiError> {
    let Some(project_id) = user.project_id else {
        return Ok(Json(json!({ "issues": [] })));
    };

    let term = query
        .search_term
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty());
    let issues = db::issues::list_by_project(&state.pool, project_id, term).await?;

    let issue_ids: Vec<i64> = issues.iter().map(|issue| issue.id).collect();
    let mut assignees: HashMap<i64, Vec<i64>> = HashMap::new();
    for (issue_id, user_id) in db::issues::assignee_pairs(&state.pool, &issue_ids).await? {
        assignees.entry(issue_id).or_default().push(user_id);
    }

    let data: Vec<Value> = issues
        .iter()
        .map(|issue| {
            let user_ids = assignees.get(&issue.id).map(Vec::as_slice).unwrap_or(&[]);
            serialize_issue(issue, user_ids)
        })
        .collect();

    Ok(Json(json!({ "issues": data })))
}

/// One issue with its assignees and comment thread, comments oldest first.
pub async fn get(
    CurrentUser(_user): CurrentUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let issue = db::issues::find_by_id(&state.pool, id)
        .await?
        .ok_or(ApiError::EntityNotFound("Issue"))?;

    let users = db::issues::assignees(&state.pool, issue.id).await?;

    let comments = db::comments::list_by_issue(&state.pool, issue.id).await?;
    let author_ids: Vec<i64> = comments.iter().map(|comment| comment.user_id).collect();
    let authors: HashMap<i64, User> = db::users::find_by_ids(&state.pool, &author_ids)
        .await?
        .into_iter()
        .map(|user| (user.id, user))
        .collect();
    let thread: Vec<(Comment, User)> = comments
        .into_iter()
        .filter_map(|comment| {
            authors
                .get(&comment.user_id)
                .cloned()
                .map(|author| (comment, author))
        })
        .collect();

    Ok(Json(json!({
        "issue": serialize_issue_detail(&issue, &users, Some(&thread))
    })))
}

pub async fn create(
    CurrentUser(_user): CurrentUser,
    State(state): State<SharedState>,
    JsonPayload(payload): JsonPayload,
) -> Result<Json<Value>, ApiError> {
    let errors = validate::validate_issue(&payload, false);
    if !errors.is_empty() {
        return Err(ApiError::BadUserInput(errors));
    }

    let project_id = payload
        .get("projectId")
        .and_then(to_int)
        .ok_or_else(|| ApiError::Internal("projectId absent after validation".to_string()))?;
    let reporter_id = payload
        .get("reporterId")
        .and_then(to_int)
        .ok_or_else(|| ApiError::Internal("reporterId absent after validation".to_string()))?;
    let status = text_of(payload.get("status")).unwrap_or_default();

    let assignee_ids = resolve_assignees(&state.pool, &payload).await?;

    let description = text_of(payload.get("description"));
    let description_text = description.as_deref().map(strip_tags);

    let mut tx = state.pool.begin().await?;

    // New issues are prepended to their column.
    let min = db::issues::min_list_position(&mut *tx, project_id, &status).await?;
    let list_position = match min {
        Some(min) => min - 1.0,
        None => 1.0,
    };

    let issue = db::issues::create(
        &mut *tx,
        &NewIssue {
            title: text_of(payload.get("title")).unwrap_or_default(),
            issue_type: text_of(payload.get("type")).unwrap_or_default(),
            status,
            priority: text_of(payload.get("priority")).unwrap_or_default(),
            list_position,
            description,
            description_text,
            estimate: payload.get("estimate").and_then(to_int).map(|v| v as i32),
            time_spent: payload.get("timeSpent").and_then(to_int).map(|v| v as i32),
            time_remaining: payload
                .get("timeRemaining")
                .and_then(to_int)
                .map(|v| v as i32),
            reporter_id,
            project_id,
        },
    )
    .await?;
    db::issues::replace_assignees(&mut *tx, issue.id, &assignee_ids).await?;

    tx.commit().await?;

    let users = db::issues::assignees(&state.pool, issue.id).await?;
    Ok(Json(json!({
        "issue": serialize_issue_detail(&issue, &users, None)
    })))
}

/// Partial update: only keys present in the payload are applied. A `userIds`
/// or `users` key replaces the whole assignee set.
pub async fn update(
    CurrentUser(_user): CurrentUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    JsonPayload(payload): JsonPayload,
) -> Result<Json<Value>, ApiError> {
    let mut issue = db::issues::find_by_id(&state.pool, id)
        .await?
        .ok_or(ApiError::EntityNotFound("Issue"))?;

    let errors = validate::validate_issue(&payload, true);
    if !errors.is_empty() {
        return Err(ApiError::BadUserInput(errors));
    }

    if payload.get("title").is_some() {
        if let Some(title) = text_of(payload.get("title")) {
            issue.title = title;
        }
    }
    if payload.get("type").is_some() {
        if let Some(issue_type) = text_of(payload.get("type")) {
            issue.issue_type = issue_type;
        }
    }
    if payload.get("status").is_some() {
        if let Some(status) = text_of(payload.get("status")) {
            issue.status = status;
        }
    }
    if payload.get("priority").is_some() {
        if let Some(priority) = text_of(payload.get("priority")) {
            issue.priority = priority;
        }
    }
    if let Some(value) = payload.get("listPosition") {
        if let Some(position) = to_float(value) {
            issue.list_position = position;
        }
    }
    if payload.get("description").is_some() {
        issue.description = text_of(payload.get("description"));
    }
    if payload.get("estimate").is_some() {
        issue.estimate = payload.get("estimate").and_then(to_int).map(|v| v as i32);
    }
    if payload.get("timeSpent").is_some() {
        issue.time_spent = payload.get("timeSpent").and_then(to_int).map(|v| v as i32);
    }
    if payload.get("timeRemaining").is_some() {
        issue.time_remaining = payload
            .get("timeRemaining")
            .and_then(to_int)
            .map(|v| v as i32);
    }
    if let Some(reporter_id) = payload.get("reporterId").and_then(to_int) {
        issue.reporter_id = reporter_id;
    }
    if let Some(project_id) = payload.get("projectId").and_then(to_int) {
        issue.project_id = project_id;
    }

    // The tag-stripped projection always follows the rich text.
    issue.description_text = issue.description.as_deref().map(strip_tags);

    let reassign = payload.get("userIds").is_some() || payload.get("users").is_some();
    let assignee_ids = if reassign {
        Some(resolve_assignees(&state.pool, &payload).await?)
    } else {
        None
    };

    let mut tx = state.pool.begin().await?;
    let issue = db::issues::update(&mut *tx, &issue).await?;
    if let Some(ids) = &assignee_ids {
        db::issues::replace_assignees(&mut *tx, issue.id, ids).await?;
    }
    tx.commit().await?;

    let users = db::issues::assignees(&state.pool, issue.id).await?;
    Ok(Json(json!({
        "issue": serialize_issue_detail(&issue, &users, None)
    })))
}

/// Deletes the issue (comments and assignments cascade) and returns its
/// pre-deletion representation.
pub async fn delete(
    CurrentUser(_user): CurrentUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let issue = db::issues::find_by_id(&state.pool, id)
        .await?
        .ok_or(ApiError::EntityNotFound("Issue"))?;

    let users = db::issues::assignees(&state.pool, issue.id).await?;
    let data = serialize_issue_detail(&issue, &users, None);

    db::issues::delete(&state.pool, issue.id).await?;

    Ok(Json(json!({ "issue": data })))
}

/// Ids requested in the payload that resolve to existing users, first-seen
/// order preserved, unknown ids dropped.
async fn resolve_assignees(pool: &PgPool, payload: &Value) -> Result<Vec<i64>, ApiError> {
    let requested = validate::extract_user_ids(payload);
    if requested.is_empty() {
        return Ok(Vec::new());
    }

    let existing: HashSet<i64> = db::users::find_by_ids(pool, &requested)
        .await?
        .into_iter()
        .map(|user| user.id)
        .collect();

    Ok(requested
        .into_iter()
        .filter(|id| existing.contains(id))
        .collect())
}
