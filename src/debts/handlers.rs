//! REST API handlers for debt listing and settlement.

use super::helpers::{mark_related, sort_debts};
use super::models::PayDebtInput;
use crate::auth::AuthUser;
use crate::db::PaymentOutcome;
use crate::error::ApiError;
use crate::rooms::helpers::require_membership;
use crate::state::SharedState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

/// Creates routes for debt operations.
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/rooms/:room_id/debts", get(room_debts))
        .route("/rooms/:room_id/debts/:debt_id/pay", post(pay_debt))
}

/// Endpoint: GET /rooms/:room_id/debts
async fn room_debts(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let (_, member) = require_membership(&state.db, &room_id, &user.id).await?;

    let mut debts = state.db.debts().debts_for_room(&room_id).await?;
    mark_related(&mut debts, &member.id);
    sort_debts(&mut debts);

    Ok(Json(debts))
}

/// Endpoint: POST /rooms/:room_id/debts/:debt_id/pay
///
/// A full payment removes the debt; a partial one returns what remains.
async fn pay_debt(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path((room_id, debt_id)): Path<(String, String)>,
    Json(payload): Json<PayDebtInput>,
) -> Result<impl IntoResponse, ApiError> {
    let (_, member) = require_membership(&state.db, &room_id, &user.id).await?;

    let debt = state
        .db
        .debts()
        .find(&debt_id, &room_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Debt not found".to_string()))?;

    if debt.debtor.id != member.id && debt.creditor.id != member.id {
        return Err(ApiError::Forbidden(
            "You are not involved in this debt".to_string(),
        ));
    }

    if payload.amount_cents <= 0 {
        return Err(ApiError::BadRequest(
            "Payment amount must be greater than 0.".to_string(),
        ));
    }

    match state.db.debts().pay(&debt.id, payload.amount_cents).await? {
        PaymentOutcome::Settled => {
            tracing::info!(room_id = %room_id, debt_id = %debt_id, "debt settled");
            Ok(Json(json!({ "message": "Debt fully paid and deleted." })))
        }
        PaymentOutcome::Remaining(mut remaining) => {
            mark_related(std::slice::from_mut(&mut remaining), &member.id);
            Ok(Json(json!(remaining)))
        }
    }
}
