//! REST API handler for the purchase history listing.

use super::helpers::{page_url, total_pages, validate_params};
use super::models::{HistoryItem, HistoryQuery, HistoryView, Pagination};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::rooms::helpers::require_membership;
use crate::state::SharedState;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

/// Creates routes for history operations.
pub fn routes() -> Router<SharedState> {
    Router::new().route("/rooms/:room_id/history", get(history))
}

/// Endpoint: GET /rooms/:room_id/history
///
/// Filtering, sorting, and the page cut all happen in SQL; a page past the
/// end clamps to the last page rather than coming back empty.
async fn history(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (_, member) = require_membership(&state.db, &room_id, &user.id).await?;

    let params = validate_params(query).map_err(ApiError::BadRequest)?;

    let member_id = match params.view {
        HistoryView::MyItems => Some(member.id.as_str()),
        HistoryView::RoomItems => None,
    };

    let (mut rows, total_items, total_spent) = state
        .db
        .receipts()
        .history_page(
            &room_id,
            member_id,
            params.search.as_deref(),
            params.category_id.as_deref(),
            params.sort_by,
            params.sort_order,
            params.page_size,
            (params.page - 1) * params.page_size,
        )
        .await?;

    let total_pages = total_pages(total_items, params.page_size);
    let mut current_page = params.page;

    if current_page > total_pages {
        current_page = total_pages;
        let (clamped, _, _) = state
            .db
            .receipts()
            .history_page(
                &room_id,
                member_id,
                params.search.as_deref(),
                params.category_id.as_deref(),
                params.sort_by,
                params.sort_order,
                params.page_size,
                (current_page - 1) * params.page_size,
            )
            .await?;
        rows = clamped;
    }

    let items: Vec<HistoryItem> = rows.into_iter().map(HistoryItem::from).collect();

    let pagination = Pagination {
        current_page,
        page_size: params.page_size,
        total_pages,
        next: (current_page < total_pages)
            .then(|| page_url(&room_id, &params, current_page + 1)),
        previous: (current_page > 1).then(|| page_url(&room_id, &params, current_page - 1)),
    };

    Ok(Json(json!({
        "room_id": room_id,
        "view": params.view.as_str(),
        "total_items": total_items,
        "total_spent": total_spent,
        "items": items,
        "pagination": pagination,
    })))
}
