//! REST API handlers for rooms and memberships.

use super::helpers::require_membership;
use super::models::{CreateRoomInput, JoinRoomInput};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::SharedState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

/// Creates routes for room operations.
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/rooms", post(create_room).get(my_rooms))
        .route("/rooms/join", post(join_room))
        .route("/rooms/:room_id/members", get(room_members))
        .route("/rooms/:room_id/withdraw", post(withdraw))
}

/// Endpoint: POST /rooms
///
/// The creating user becomes the first member, and the room is seeded with
/// the default categories.
async fn create_room(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateRoomInput>,
) -> Result<impl IntoResponse, ApiError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Room name is required".to_string()));
    }

    let member_name = payload
        .member_name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(&user.username);

    let (room, _member) = state
        .db
        .rooms()
        .create(
            name,
            payload.icon.as_deref(),
            &user.id,
            member_name,
            payload.member_icon.as_deref(),
        )
        .await?;

    tracing::info!(room_id = %room.id, user_id = %user.id, "room created");
    Ok((StatusCode::CREATED, Json(room)))
}

/// Endpoint: POST /rooms/join
async fn join_room(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<JoinRoomInput>,
) -> Result<impl IntoResponse, ApiError> {
    let room = state
        .db
        .rooms()
        .find_by_invite_code(payload.invite_code.trim())
        .await?
        .ok_or_else(|| ApiError::NotFound("Invalid invite code".to_string()))?;

    if state
        .db
        .rooms()
        .membership(&room.id, &user.id)
        .await?
        .is_some()
    {
        return Err(ApiError::BadRequest("Already a member".to_string()));
    }

    let member_name = payload
        .member_name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(&user.username);

    state
        .db
        .rooms()
        .add_member(&room.id, &user.id, member_name, payload.icon.as_deref())
        .await?;

    tracing::info!(room_id = %room.id, user_id = %user.id, "user joined room");
    Ok((StatusCode::CREATED, Json(room)))
}

/// Endpoint: GET /rooms
async fn my_rooms(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let rooms = state.db.rooms().rooms_for_user(&user.id).await?;
    Ok(Json(rooms))
}

/// Endpoint: GET /rooms/:room_id/members
async fn room_members(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    require_membership(&state.db, &room_id, &user.id).await?;
    let members = state.db.rooms().members_of(&room_id).await?;
    Ok(Json(members))
}

/// Endpoint: POST /rooms/:room_id/withdraw
///
/// The creator anchors the room and cannot leave it.
async fn withdraw(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let room = state
        .db
        .rooms()
        .find(&room_id)
        .await?
        .ok_or_else(ApiError::room_not_found)?;

    if room.creator_id == user.id {
        return Err(ApiError::Forbidden(
            "Room creator cannot withdraw from the room".to_string(),
        ));
    }

    let member = state
        .db
        .rooms()
        .membership(&room_id, &user.id)
        .await?
        .ok_or_else(|| {
            ApiError::BadRequest("You are not a member of this room".to_string())
        })?;

    state.db.rooms().remove_member(&member.id).await?;

    tracing::info!(room_id = %room_id, user_id = %user.id, "user withdrew from room");
    Ok(Json(json!({ "message": "Successfully withdrew from the room" })))
}
