//! Shared guards for room-scoped endpoints.

use super::models::{Room, RoomMember};
use crate::db::Database;
use crate::error::ApiError;

/// Resolve a room and the acting user's membership in it.
///
/// Every room-scoped endpoint goes through this: an unknown room is a 404
/// and a non-member is a 403, before any resource-specific work happens.
pub async fn require_membership(
    db: &Database,
    room_id: &str,
    user_id: &str,
) -> Result<(Room, RoomMember), ApiError> {
    let room = db
        .rooms()
        .find(room_id)
        .await?
        .ok_or_else(ApiError::room_not_found)?;

    let member = db
        .rooms()
        .membership(room_id, user_id)
        .await?
        .ok_or_else(ApiError::not_a_member)?;

    Ok((room, member))
}
