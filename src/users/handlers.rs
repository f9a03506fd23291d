//! REST API handlers for user registration.

use super::models::CreateUserInput;
use crate::error::ApiError;
use crate::state::SharedState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

/// Creates routes for user operations.
pub fn routes() -> Router<SharedState> {
    Router::new().route("/users", post(create_user))
}

/// Endpoint: POST /users
async fn create_user(
    State(state): State<SharedState>,
    Json(payload): Json<CreateUserInput>,
) -> Result<impl IntoResponse, ApiError> {
    let username = payload.username.trim();
    if username.is_empty() {
        return Err(ApiError::BadRequest("Username is required".to_string()));
    }

    let user = state.db.users().create(username, &payload.email).await?;
    tracing::info!(user_id = %user.id, username = %user.username, "user created");

    Ok((StatusCode::CREATED, Json(user)))
}
