//! Integration test common infrastructure.
//!
//! Builds the full application router over a fresh in-memory database and
//! drives it with `oneshot` requests, so tests run in parallel without a
//! listening socket or a file on disk.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use grocery_share::db::Database;
use grocery_share::router::create_app_router;
use grocery_share::state::AppState;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

/// Create a test app instance over a fresh in-memory database.
pub async fn test_app() -> Router {
    let db = Database::new(":memory:").await.expect("in-memory database");
    create_app_router(Arc::new(AppState::new(db)))
}

/// Send a JSON request, optionally acting as a user, and return the
/// response status and parsed body.
pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    user_id: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user_id) = user_id {
        builder = builder.header("x-user-id", user_id);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!({}));

    (status, body)
}

/// Register a user and return its id.
pub async fn create_user(app: &Router, username: &str) -> String {
    let (status, body) = request(
        app,
        "POST",
        "/users",
        None,
        Some(json!({
            "username": username,
            "email": format!("{username}@example.com"),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "user creation failed: {body}");
    body["id"].as_str().unwrap().to_string()
}

/// Create a room and return (room_id, invite_code).
pub async fn create_room(app: &Router, user_id: &str, name: &str) -> (String, String) {
    let (status, body) = request(
        app,
        "POST",
        "/rooms",
        Some(user_id),
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "room creation failed: {body}");
    (
        body["id"].as_str().unwrap().to_string(),
        body["invite_code"].as_str().unwrap().to_string(),
    )
}

/// Join a room by invite code.
pub async fn join_room(app: &Router, user_id: &str, invite_code: &str) {
    let (status, body) = request(
        app,
        "POST",
        "/rooms/join",
        Some(user_id),
        Some(json!({ "invite_code": invite_code })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "join failed: {body}");
}

/// The membership id of a user within a room.
pub async fn member_id(app: &Router, acting_user: &str, room_id: &str, user_id: &str) -> String {
    let (status, body) = request(
        app,
        "GET",
        &format!("/rooms/{room_id}/members"),
        Some(acting_user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "member listing failed: {body}");
    body.as_array()
        .unwrap()
        .iter()
        .find(|member| member["user_id"] == user_id)
        .unwrap_or_else(|| panic!("no membership for {user_id} in {room_id}"))["id"]
        .as_str()
        .unwrap()
        .to_string()
}

/// A minimal receipt payload with the given items.
pub fn receipt_payload(name: &str, purchase_date: &str, items: Value) -> Value {
    json!({
        "name": name,
        "total_amount_cents": 0,
        "subtotal_cents": 0,
        "tax_amount_cents": 0,
        "tax_rate": 0.0,
        "discount_amount_cents": 0,
        "discount_rate": 0.0,
        "purchase_date": purchase_date,
        "items": items,
    })
}

/// A receipt item split evenly between all members.
pub fn evenly_item(name: &str, price_cents: i64, paid_by: &str) -> Value {
    json!({
        "name": name,
        "general_name": name,
        "quantity": 1.0,
        "price_cents": price_cents,
        "category": "Food Groceries",
        "split_method": "EVENLY",
        "paid_by_id": paid_by,
    })
}

/// A receipt item carried entirely by one member.
pub fn by_user_item(name: &str, price_cents: i64, split_user: &str, paid_by: &str) -> Value {
    json!({
        "name": name,
        "general_name": name,
        "quantity": 1.0,
        "price_cents": price_cents,
        "category": "Food Groceries",
        "split_method": "BY_USER",
        "split_user_id": split_user,
        "paid_by_id": paid_by,
    })
}
