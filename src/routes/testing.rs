//! Fixture routes for end-to-end test suites. Outside test mode they answer
//! exactly like an unknown route, so production deployments expose nothing.

use axum::Json;
use axum::extract::{OriginalUri, State};
use serde_json::{Value, json};

use crate::auth::jwt;
use crate::config::RunMode;
use crate::error::ApiError;
use crate::seed;
use crate::state::SharedState;

pub async fn reset_database(
    State(state): State<SharedState>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<Value>, ApiError> {
    ensure_test_mode(&state, uri.path())?;
    seed::reset_database(&state.pool).await?;
    Ok(Json(json!(true)))
}

pub async fn create_account(
    State(state): State<SharedState>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<Value>, ApiError> {
    ensure_test_mode(&state, uri.path())?;
    let user = seed::create_test_account(&state.pool).await?;
    let token = jwt::sign_token(user.id, &state.config.jwt_secret).map_err(ApiError::Internal)?;
    Ok(Json(json!({ "authToken": token })))
}

fn ensure_test_mode(state: &SharedState, path: &str) -> Result<(), ApiError> {
    if state.config.env == RunMode::Test {
        Ok(())
    } else {
        Err(ApiError::RouteNotFound(path.to_string()))
    }
}
