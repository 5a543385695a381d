use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Domain errors rendered through the uniform envelope
/// `{"error": {"message", "code", "status", "data"}}`.
#[derive(Debug)]
pub enum ApiError {
    /// Unknown path, or a test-only route hit outside test mode.
    RouteNotFound(String),
    /// A referenced entity does not exist; carries the entity name.
    EntityNotFound(&'static str),
    /// Payload failed validation; carries field -> message.
    BadUserInput(BTreeMap<String, String>),
    InvalidToken(String),
    Internal(String),
    Database(sqlx::Error),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::RouteNotFound(path) => write!(f, "Route Not Found: {path}"),
            ApiError::EntityNotFound(entity) => write!(f, "Entity Not Found: {entity}"),
            ApiError::BadUserInput(fields) => write!(f, "Bad User Input: {fields:?}"),
            ApiError::InvalidToken(msg) => write!(f, "Invalid Token: {msg}"),
            ApiError::Internal(msg) => write!(f, "Internal Error: {msg}"),
            ApiError::Database(err) => write!(f, "Database Error: {err}"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, data) = match &self {
            ApiError::RouteNotFound(path) => (
                StatusCode::NOT_FOUND,
                "ROUTE_NOT_FOUND",
                format!("Route '{path}' does not exist."),
                json!({}),
            ),
            ApiError::EntityNotFound(entity) => (
                StatusCode::NOT_FOUND,
                "ENTITY_NOT_FOUND",
                format!("{entity} not found."),
                json!({}),
            ),
            ApiError::BadUserInput(fields) => (
                StatusCode::BAD_REQUEST,
                "BAD_USER_INPUT",
                "There were validation errors.".to_string(),
                json!({ "fields": fields }),
            ),
            ApiError::InvalidToken(msg) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
                msg.clone(),
                json!({}),
            ),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Something went wrong, please contact our support.".to_string(),
                    json!({}),
                )
            }
            ApiError::Database(err) => {
                tracing::error!("Database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Something went wrong, please contact our support.".to_string(),
                    json!({}),
                )
            }
        };

        let body = json!({
            "error": {
                "message": message,
                "code": code,
                "status": status.as_u16(),
                "data": data,
            }
        });
        (status, axum::Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Database(err)
    }
}
