//! Category domain models.

use serde::{Deserialize, Serialize};

/// An expense category within a room.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Category {
    pub id: String,
    pub room_id: String,
    pub name: String,
    pub is_default: bool,
    pub created_at: i64,
}

/// Input for creating a category.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryInput {
    pub room_id: String,
    pub name: String,
}

/// Input for renaming a category.
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryInput {
    pub name: String,
}
