use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::auth::extractor::CurrentUser;
use crate::auth::jwt;
use crate::error::ApiError;
use crate::seed;
use crate::serialize::serialize_user;
use crate::state::SharedState;

/// Creates a fresh demo project with fixture users and issues, and returns a
/// token for the designated demo user.
pub async fn guest(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    let user = seed::create_guest_account(&state.pool).await?;
    let token = jwt::sign_token(user.id, &state.config.jwt_secret).map_err(ApiError::Internal)?;
    Ok(Json(json!({ "authToken": token })))
}

pub async fn current_user(CurrentUser(user): CurrentUser) -> Result<Json<Value>, ApiError> {
    Ok(Json(json!({ "currentUser": serialize_user(&user) })))
}
