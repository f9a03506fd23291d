//! Room domain models.

use serde::{Deserialize, Serialize};

/// A shared room of users.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub creator_id: String,
    pub invite_code: String,
    pub created_at: i64,
}

/// A user's membership in a room, with the name and icon they go by there.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RoomMember {
    pub id: String,
    pub room_id: String,
    pub user_id: String,
    pub icon: String,
    pub name: String,
    pub joined_at: i64,
}

/// Input for creating a room.
#[derive(Debug, Deserialize)]
pub struct CreateRoomInput {
    pub name: String,
    pub icon: Option<String>,
    /// Display name for the creator's membership; defaults to the username.
    pub member_name: Option<String>,
    pub member_icon: Option<String>,
}

/// Input for joining a room by invite code.
#[derive(Debug, Deserialize)]
pub struct JoinRoomInput {
    pub invite_code: String,
    /// Display name for the new membership; defaults to the username.
    pub member_name: Option<String>,
    pub icon: Option<String>,
}
