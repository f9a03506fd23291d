//! REST API handlers for shopping lists and their items.

use super::models::{
    CreateItemInput, CreateListInput, ReorderItemsInput, ReorderListsInput, ShoppingList,
    UpdateItemInput,
};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::rooms::helpers::require_membership;
use crate::state::SharedState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::json;
use std::collections::HashSet;

/// Creates routes for shopping list operations.
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/lists", post(create_list))
        .route("/lists/:list_id", delete(delete_list))
        .route("/lists/:list_id/items/reorder", post(reorder_items))
        .route("/rooms/:room_id/lists", get(room_lists))
        .route("/rooms/:room_id/lists/reorder", post(reorder_lists))
        .route("/list-items", post(create_item))
        .route("/list-items/:item_id", put(update_item).delete(delete_item))
        .route("/list-items/:item_id/toggle", post(toggle_item))
}

/// Endpoint: POST /lists
async fn create_list(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateListInput>,
) -> Result<impl IntoResponse, ApiError> {
    require_membership(&state.db, &payload.room_id, &user.id).await?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("List name is required".to_string()));
    }

    let row = state
        .db
        .lists()
        .create(&payload.room_id, name, &user.id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ShoppingList::from_row(row, Vec::new())),
    ))
}

/// Endpoint: GET /rooms/:room_id/lists
async fn room_lists(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    require_membership(&state.db, &room_id, &user.id).await?;

    let rows = state.db.lists().lists_for_room(&room_id).await?;
    let mut lists = Vec::with_capacity(rows.len());
    for row in rows {
        let items = state.db.lists().items_for_list(&row.id).await?;
        lists.push(ShoppingList::from_row(row, items));
    }

    Ok(Json(lists))
}

/// Endpoint: POST /rooms/:room_id/lists/reorder
async fn reorder_lists(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<String>,
    Json(payload): Json<ReorderListsInput>,
) -> Result<impl IntoResponse, ApiError> {
    require_membership(&state.db, &room_id, &user.id).await?;

    if payload.list_ids.is_empty() {
        return Err(ApiError::BadRequest("list_ids is required".to_string()));
    }

    let known: HashSet<String> = state
        .db
        .lists()
        .list_ids_for_room(&room_id)
        .await?
        .into_iter()
        .collect();
    for list_id in &payload.list_ids {
        if !known.contains(list_id) {
            return Err(ApiError::BadRequest(format!(
                "Shopping list {list_id} not found in this room"
            )));
        }
    }

    state.db.lists().set_list_positions(&payload.list_ids).await?;
    Ok(Json(json!({ "message": "Shopping lists reordered successfully" })))
}

/// Endpoint: DELETE /lists/:list_id
async fn delete_list(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path(list_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let list = state
        .db
        .lists()
        .find(&list_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Shopping list not found".to_string()))?;

    require_membership(&state.db, &list.room_id, &user.id).await?;

    if list.created_by != user.id {
        return Err(ApiError::Forbidden(
            "Only the creator can delete this shopping list".to_string(),
        ));
    }

    state.db.lists().delete(&list_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Endpoint: POST /list-items
async fn create_item(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateItemInput>,
) -> Result<impl IntoResponse, ApiError> {
    let list = state
        .db
        .lists()
        .find(&payload.shopping_list_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Shopping list not found".to_string()))?;

    require_membership(&state.db, &list.room_id, &user.id).await?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Item name is required".to_string()));
    }

    let quantity = payload.quantity.unwrap_or(1);
    if quantity < 1 {
        return Err(ApiError::BadRequest(
            "Quantity must be at least 1".to_string(),
        ));
    }

    let memo = payload.memo.as_deref().filter(|m| !m.is_empty());
    let item = state
        .db
        .lists()
        .create_item(&list.id, name, quantity, memo, &user)
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// Endpoint: PUT /list-items/:item_id
///
/// Partial update: absent fields keep their current value.
async fn update_item(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path(item_id): Path<String>,
    Json(payload): Json<UpdateItemInput>,
) -> Result<impl IntoResponse, ApiError> {
    let (mut item, room_id) = state
        .db
        .lists()
        .find_item(&item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".to_string()))?;

    require_membership(&state.db, &room_id, &user.id).await?;

    let name = match &payload.name {
        Some(name) => name.trim().to_string(),
        None => item.name.clone(),
    };
    if name.is_empty() {
        return Err(ApiError::BadRequest("Item name is required".to_string()));
    }

    let quantity = payload.quantity.unwrap_or(item.quantity);
    if quantity < 1 {
        return Err(ApiError::BadRequest(
            "Quantity must be at least 1".to_string(),
        ));
    }

    let memo = match payload.memo {
        None => item.memo.clone(),
        Some(memo) => memo.filter(|m| !m.is_empty()),
    };

    state
        .db
        .lists()
        .update_item(&item.id, &name, quantity, memo.as_deref())
        .await?;

    item.name = name;
    item.quantity = quantity;
    item.memo = memo;
    Ok(Json(item))
}

/// Endpoint: POST /list-items/:item_id/toggle
async fn toggle_item(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path(item_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let (mut item, room_id) = state
        .db
        .lists()
        .find_item(&item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".to_string()))?;

    require_membership(&state.db, &room_id, &user.id).await?;

    item.is_purchased = !item.is_purchased;
    item.purchased_at = if item.is_purchased {
        Some(chrono::Utc::now().timestamp())
    } else {
        None
    };

    state
        .db
        .lists()
        .set_item_purchased(&item.id, item.is_purchased, item.purchased_at)
        .await?;

    Ok(Json(item))
}

/// Endpoint: POST /lists/:list_id/items/reorder
async fn reorder_items(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path(list_id): Path<String>,
    Json(payload): Json<ReorderItemsInput>,
) -> Result<impl IntoResponse, ApiError> {
    let list = state
        .db
        .lists()
        .find(&list_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Shopping list not found".to_string()))?;

    require_membership(&state.db, &list.room_id, &user.id).await?;

    if payload.item_ids.is_empty() {
        return Err(ApiError::BadRequest("item_ids is required".to_string()));
    }

    let known: HashSet<String> = state
        .db
        .lists()
        .item_ids_for_list(&list_id)
        .await?
        .into_iter()
        .collect();
    for item_id in &payload.item_ids {
        if !known.contains(item_id) {
            return Err(ApiError::BadRequest(format!(
                "Item {item_id} not found in this list"
            )));
        }
    }

    state.db.lists().set_item_positions(&payload.item_ids).await?;
    Ok(Json(json!({ "message": "Items reordered successfully" })))
}

/// Endpoint: DELETE /list-items/:item_id
async fn delete_item(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path(item_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let (item, room_id) = state
        .db
        .lists()
        .find_item(&item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".to_string()))?;

    require_membership(&state.db, &room_id, &user.id).await?;

    if item.added_by.id != user.id {
        return Err(ApiError::Forbidden(
            "Only the user who added this item can delete it".to_string(),
        ));
    }

    state.db.lists().delete_item(&item.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
