//! API error type and its HTTP mapping.
//!
//! Handlers return `Result<_, ApiError>`; the `IntoResponse` impl turns every
//! variant into a `{"error": message}` JSON body with the matching status.

use crate::db::DbError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced to API clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Db(DbError),
}

impl ApiError {
    /// Guard failure for room-scoped endpoints hit by a non-member.
    pub fn not_a_member() -> Self {
        ApiError::Forbidden("You are not a member of this room".to_string())
    }

    /// Standard 404 for an unknown room id.
    pub fn room_not_found() -> Self {
        ApiError::NotFound("Room not found".to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UsernameTaken(_)
            | DbError::AlreadyMember
            | DbError::CategoryExists(_)
            | DbError::PaymentTooLarge => ApiError::BadRequest(err.to_string()),
            DbError::MemberNotFound(_) => ApiError::NotFound(err.to_string()),
            other => ApiError::Db(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Db(err) => {
                tracing::error!(error = %err, "database failure while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
