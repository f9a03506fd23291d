//! REST API handlers for receipt commit and split inspection.

use super::helpers::validate_receipt;
use super::models::ReceiptPayload;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::rooms::helpers::require_membership;
use crate::state::SharedState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

/// Creates routes for receipt operations.
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/rooms/:room_id/receipts", post(commit_receipt))
        .route(
            "/rooms/:room_id/receipts/:receipt_id/splits",
            get(receipt_splits),
        )
}

/// Endpoint: POST /rooms/:room_id/receipts
///
/// Commits a structured receipt: validates the payload, stores the receipt
/// with items and splits, and folds the splits into the room's debts.
async fn commit_receipt(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<String>,
    Json(payload): Json<ReceiptPayload>,
) -> Result<impl IntoResponse, ApiError> {
    require_membership(&state.db, &room_id, &user.id).await?;

    let receipt = validate_receipt(payload).map_err(ApiError::BadRequest)?;

    let stored = state
        .db
        .receipts()
        .create(&room_id, &user.id, &receipt)
        .await?;

    tracing::info!(
        room_id = %room_id,
        receipt_id = %stored.id,
        items = stored.items.len(),
        total_cents = stored.total_amount_cents,
        "receipt committed"
    );

    Ok((StatusCode::CREATED, Json(stored)))
}

/// Endpoint: GET /rooms/:room_id/receipts/:receipt_id/splits
async fn receipt_splits(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path((room_id, receipt_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    require_membership(&state.db, &room_id, &user.id).await?;

    if !state
        .db
        .receipts()
        .exists_in_room(&receipt_id, &room_id)
        .await?
    {
        return Err(ApiError::NotFound("Receipt not found".to_string()));
    }

    let splits = state.db.receipts().splits_for_receipt(&receipt_id).await?;
    Ok(Json(json!({ "receipt_id": receipt_id, "splits": splits })))
}
