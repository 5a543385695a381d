use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Value, json};

use super::JsonPayload;
use crate::auth::extractor::CurrentUser;
use crate::db;
use crate::error::ApiError;
use crate::serialize::serialize_comment;
use crate::state::SharedState;
use crate::validate;
use crate::validate::{text_of, to_int};

pub async fn create(
    CurrentUser(_user): CurrentUser,
    State(state): State<SharedState>,
    JsonPayload(payload): JsonPayload,
) -> Result<Json<Value>, ApiError> {
    let mut errors = validate::validate_comment(&payload, false);

    let issue_id = payload.get("issueId").and_then(to_int);
    if issue_id.is_none() {
        errors
            .entry("issueId".to_string())
            .or_insert_with(|| "This field is required".to_string());
    }
    let user_id = payload.get("userId").and_then(to_int);
    if user_id.is_none() {
        errors
            .entry("userId".to_string())
            .or_insert_with(|| "This field is required".to_string());
    }

    if !errors.is_empty() {
        return Err(ApiError::BadUserInput(errors));
    }

    let body = text_of(payload.get("body")).unwrap_or_default();
    let comment = db::comments::create(
        &state.pool,
        &body,
        user_id.unwrap_or_default(),
        issue_id.unwrap_or_default(),
    )
    .await?;

    Ok(Json(json!({ "comment": serialize_comment(&comment, None) })))
}

pub async fn update(
    CurrentUser(_user): CurrentUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    JsonPayload(payload): JsonPayload,
) -> Result<Json<Value>, ApiError> {
    db::comments::find_by_id(&state.pool, id)
        .await?
        .ok_or(ApiError::EntityNotFound("Comment"))?;

    let errors = validate::validate_comment(&payload, false);
    if !errors.is_empty() {
        return Err(ApiError::BadUserInput(errors));
    }

    let body = text_of(payload.get("body")).unwrap_or_default();
    let comment = db::comments::update_body(&state.pool, id, &body).await?;

    Ok(Json(json!({ "comment": serialize_comment(&comment, None) })))
}

pub async fn delete(
    CurrentUser(_user): CurrentUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let comment = db::comments::find_by_id(&state.pool, id)
        .await?
        .ok_or(ApiError::EntityNotFound("Comment"))?;

    let data = serialize_comment(&comment, None);
    db::comments::delete(&state.pool, comment.id).await?;

    Ok(Json(json!({ "comment": data })))
}
