//! Acting-user resolution.
//!
//! The service runs behind an authenticating proxy and trusts the
//! `X-User-Id` header to name the acting user. The extractor loads the user
//! row so handlers always work with a verified identity.

use crate::error::ApiError;
use crate::state::SharedState;
use crate::users::models::User;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Header carrying the acting user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor for the authenticated user of a request.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing X-User-Id header".to_string()))?;

        let user = state
            .db
            .users()
            .find(user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Unknown user".to_string()))?;

        Ok(AuthUser(user))
    }
}
