//! REST API handlers for expense categories.

use super::models::{CreateCategoryInput, UpdateCategoryInput};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::rooms::helpers::require_membership;
use crate::state::SharedState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};

/// Creates routes for category operations.
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/rooms/:room_id/categories", get(room_categories))
        .route("/categories", post(create_category))
        .route("/categories/:category_id", put(update_category))
}

/// Endpoint: GET /rooms/:room_id/categories
async fn room_categories(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    require_membership(&state.db, &room_id, &user.id).await?;
    let categories = state.db.categories().for_room(&room_id).await?;
    Ok(Json(categories))
}

/// Endpoint: POST /categories
async fn create_category(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateCategoryInput>,
) -> Result<impl IntoResponse, ApiError> {
    require_membership(&state.db, &payload.room_id, &user.id).await?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest(
            "Category name is required".to_string(),
        ));
    }

    let category = state.db.categories().create(&payload.room_id, name).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Endpoint: PUT /categories/:category_id
async fn update_category(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path(category_id): Path<String>,
    Json(payload): Json<UpdateCategoryInput>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .db
        .categories()
        .find(&category_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    require_membership(&state.db, &category.room_id, &user.id).await?;

    if category.is_default {
        return Err(ApiError::Forbidden(
            "Default categories cannot be updated".to_string(),
        ));
    }

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest(
            "Category name is required".to_string(),
        ));
    }

    state.db.categories().rename(&category.id, name).await?;

    let mut category = category;
    category.name = name.to_string();
    Ok(Json(category))
}
