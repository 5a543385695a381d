use std::collections::HashMap;

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use super::JsonPayload;
use crate::auth::extractor::CurrentUser;
use crate::db;
use crate::error::ApiError;
use crate::serialize::{serialize_project, serialize_project_basic};
use crate::state::SharedState;
use crate::validate;

/// The current user's project with its members and issues (partial shape).
pub async fn get(
    CurrentUser(user): CurrentUser,
    State(state): State<SharedState>,
) -> Result<Json<Value>, ApiError> {
    let project_id = user.project_id.ok_or(ApiError::EntityNotFound("Project"))?;
    let project = db::projects::find_by_id(&state.pool, project_id)
        .await?
        .ok_or(ApiError::EntityNotFound("Project"))?;

    let users = db::users::list_by_project(&state.pool, project.id).await?;
    let issues = db::issues::list_by_project(&state.pool, project.id, None).await?;

    let issue_ids: Vec<i64> = issues.iter().map(|issue| issue.id).collect();
    let mut assignees: HashMap<i64, Vec<i64>> = HashMap::new();
    for (issue_id, user_id) in db::issues::assignee_pairs(&state.pool, &issue_ids).await? {
        assignees.entry(issue_id).or_default().push(user_id);
    }

    Ok(Json(json!({
        "project": serialize_project(&project, &users, &issues, &assignees)
    })))
}

pub async fn update(
    CurrentUser(user): CurrentUser,
    State(state): State<SharedState>,
    JsonPayload(payload): JsonPayload,
) -> Result<Json<Value>, ApiError> {
    let errors = validate::validate_project(&payload);
    if !errors.is_empty() {
        return Err(ApiError::BadUserInput(errors));
    }

    let project_id = user.project_id.ok_or(ApiError::EntityNotFound("Project"))?;
    db::projects::find_by_id(&state.pool, project_id)
        .await?
        .ok_or(ApiError::EntityNotFound("Project"))?;

    let name = validate::text_of(payload.get("name")).unwrap_or_default();
    let url = validate::text_of(payload.get("url"));
    let description = validate::text_of(payload.get("description"));
    let category = validate::text_of(payload.get("category")).unwrap_or_default();

    let project = db::projects::update(
        &state.pool,
        project_id,
        &name,
        url.as_deref(),
        description.as_deref(),
        &category,
    )
    .await?;

    Ok(Json(json!({ "project": serialize_project_basic(&project) })))
}
