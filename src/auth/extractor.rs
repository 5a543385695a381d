use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::jwt;
use crate::db;
use crate::error::ApiError;
use crate::models::User;
use crate::state::SharedState;

/// The authenticated user resolved from the `Authorization: Bearer <token>`
/// header. Every failure mode (missing header, bad token, unknown user)
/// rejects with `InvalidToken`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<SharedState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::InvalidToken("Authentication token not found.".to_string()))?;

        let claims = jwt::decode_token(token, &state.config.jwt_secret)
            .map_err(|_| ApiError::InvalidToken("Authentication token is invalid.".to_string()))?;

        let user = db::users::find_by_id(&state.pool, claims.sub)
            .await?
            .ok_or_else(|| {
                ApiError::InvalidToken("Authentication token is invalid: User not found.".to_string())
            })?;

        Ok(CurrentUser(user))
    }
}
