//! Shopping list domain models.

use crate::db::ListRow;
use crate::users::models::User;
use serde::{Deserialize, Serialize};

/// A shopping list with its items embedded.
#[derive(Debug, Clone, Serialize)]
pub struct ShoppingList {
    pub id: String,
    pub room_id: String,
    pub name: String,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub position: i64,
    pub items: Vec<ShoppingListItem>,
}

impl ShoppingList {
    /// Attach items to a stored list row.
    pub fn from_row(row: ListRow, items: Vec<ShoppingListItem>) -> Self {
        Self {
            id: row.id,
            room_id: row.room_id,
            name: row.name,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
            position: row.position,
            items,
        }
    }
}

/// A grocery item on a shopping list.
#[derive(Debug, Clone, Serialize)]
pub struct ShoppingListItem {
    pub id: String,
    pub list_id: String,
    pub name: String,
    pub quantity: i64,
    pub is_purchased: bool,
    pub added_by: User,
    pub added_at: i64,
    pub purchased_at: Option<i64>,
    pub memo: Option<String>,
    pub position: i64,
}

/// Input for creating a shopping list.
#[derive(Debug, Deserialize)]
pub struct CreateListInput {
    pub room_id: String,
    pub name: String,
}

/// Input for reordering a room's shopping lists.
#[derive(Debug, Deserialize)]
pub struct ReorderListsInput {
    pub list_ids: Vec<String>,
}

/// Input for creating a list item.
#[derive(Debug, Deserialize)]
pub struct CreateItemInput {
    pub shopping_list_id: String,
    pub name: String,
    pub quantity: Option<i64>,
    pub memo: Option<String>,
}

/// Input for updating a list item. Absent fields keep their current value;
/// an explicit `null` (or empty) memo clears it.
#[derive(Debug, Deserialize)]
pub struct UpdateItemInput {
    pub name: Option<String>,
    pub quantity: Option<i64>,
    #[serde(default)]
    pub memo: Option<Option<String>>,
}

/// Input for reordering a list's items.
#[derive(Debug, Deserialize)]
pub struct ReorderItemsInput {
    pub item_ids: Vec<String>,
}
