pub mod auth;
pub mod comments;
pub mod issues;
pub mod project;
pub mod testing;

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::routing::{delete, get, post, put};
use axum::Router;
use serde_json::{Value, json};

use crate::error::ApiError;
use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/authentication/guest", post(auth::guest))
        .route("/currentUser", get(auth::current_user))
        // Project
        .route("/project", get(project::get).put(project::update))
        // Issues
        .route("/issues", get(issues::list).post(issues::create))
        .route(
            "/issues/{id}",
            get(issues::get).put(issues::update).delete(issues::delete),
        )
        // Comments
        .route("/comments", post(comments::create))
        .route(
            "/comments/{id}",
            put(comments::update).delete(comments::delete),
        )
        // Test fixtures (no-ops outside test mode)
        .route("/test/reset-database", delete(testing::reset_database))
        .route("/test/create-account", post(testing::create_account))
}

/// Lenient JSON body: anything that does not parse as JSON is treated as an
/// empty object, so the validators report missing fields instead of the
/// framework rejecting the request.
pub struct JsonPayload(pub Value);

impl<S: Send + Sync> FromRequest<S> for JsonPayload {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::Internal(format!("failed to read request body: {e}")))?;
        let value = serde_json::from_slice(&bytes).unwrap_or_else(|_| json!({}));
        Ok(JsonPayload(value))
    }
}
