//! Integration tests for user registration, rooms, and memberships.

mod common;

use axum::http::StatusCode;
use common::{create_room, create_user, join_room, request, test_app};
use serde_json::json;

#[tokio::test]
async fn signup_and_duplicate_username() {
    let app = test_app().await;

    let (status, body) = request(
        &app,
        "POST",
        "/users",
        None,
        Some(json!({ "username": "alice", "email": "alice@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "alice");
    assert!(body["id"].as_str().is_some());

    let (status, body) = request(
        &app,
        "POST",
        "/users",
        None,
        Some(json!({ "username": "alice", "email": "other@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("alice"));
}

#[tokio::test]
async fn blank_username_rejected() {
    let app = test_app().await;
    let (status, _) = request(
        &app,
        "POST",
        "/users",
        None,
        Some(json!({ "username": "   ", "email": "x@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn requests_without_identity_are_unauthorized() {
    let app = test_app().await;
    let (status, body) = request(&app, "GET", "/rooms", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing X-User-Id header");

    let (status, body) = request(&app, "GET", "/rooms", Some("no-such-user"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unknown user");
}

#[tokio::test]
async fn creating_a_room_seeds_membership_and_default_categories() {
    let app = test_app().await;
    let alice = create_user(&app, "alice").await;

    let (status, room) = request(
        &app,
        "POST",
        "/rooms",
        Some(&alice),
        Some(json!({ "name": "Flat 4B" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(room["name"], "Flat 4B");
    assert_eq!(room["icon"], "🏠");
    assert_eq!(room["creator_id"].as_str().unwrap(), alice);
    assert_eq!(room["invite_code"].as_str().unwrap().len(), 8);
    let room_id = room["id"].as_str().unwrap();

    let (status, members) = request(
        &app,
        "GET",
        &format!("/rooms/{room_id}/members"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let members = members.as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["name"], "alice");
    assert_eq!(members[0]["icon"], "👤");

    let (status, categories) = request(
        &app,
        "GET",
        &format!("/rooms/{room_id}/categories"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let categories = categories.as_array().unwrap();
    assert_eq!(categories.len(), 6);
    assert!(categories.iter().all(|c| c["is_default"] == true));
    assert!(categories.iter().any(|c| c["name"] == "Food Groceries"));
}

#[tokio::test]
async fn join_by_invite_code() {
    let app = test_app().await;
    let alice = create_user(&app, "alice").await;
    let bob = create_user(&app, "bob").await;
    let (room_id, code) = create_room(&app, &alice, "Flat 4B").await;

    let (status, joined) = request(
        &app,
        "POST",
        "/rooms/join",
        Some(&bob),
        Some(json!({ "invite_code": code, "member_name": "Bobby" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(joined["id"].as_str().unwrap(), room_id);

    let (status, members) = request(
        &app,
        "GET",
        &format!("/rooms/{room_id}/members"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let members = members.as_array().unwrap();
    assert_eq!(members.len(), 2);
    assert!(members.iter().any(|m| m["name"] == "Bobby"));

    // Repeat join is rejected.
    let (status, body) = request(
        &app,
        "POST",
        "/rooms/join",
        Some(&bob),
        Some(json!({ "invite_code": code })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Already a member");
}

#[tokio::test]
async fn unknown_invite_code_is_not_found() {
    let app = test_app().await;
    let alice = create_user(&app, "alice").await;

    let (status, body) = request(
        &app,
        "POST",
        "/rooms/join",
        Some(&alice),
        Some(json!({ "invite_code": "00000000" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Invalid invite code");
}

#[tokio::test]
async fn room_listing_shows_only_own_rooms() {
    let app = test_app().await;
    let alice = create_user(&app, "alice").await;
    let bob = create_user(&app, "bob").await;
    let (alice_room, _) = create_room(&app, &alice, "Flat 4B").await;
    create_room(&app, &bob, "Bob's place").await;

    let (status, rooms) = request(&app, "GET", "/rooms", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let rooms = rooms.as_array().unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0]["id"].as_str().unwrap(), alice_room);
}

#[tokio::test]
async fn members_listing_is_member_only() {
    let app = test_app().await;
    let alice = create_user(&app, "alice").await;
    let mallory = create_user(&app, "mallory").await;
    let (room_id, _) = create_room(&app, &alice, "Flat 4B").await;

    let (status, body) = request(
        &app,
        "GET",
        &format!("/rooms/{room_id}/members"),
        Some(&mallory),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You are not a member of this room");
}

#[tokio::test]
async fn withdraw_rules() {
    let app = test_app().await;
    let alice = create_user(&app, "alice").await;
    let bob = create_user(&app, "bob").await;
    let carol = create_user(&app, "carol").await;
    let (room_id, code) = create_room(&app, &alice, "Flat 4B").await;
    join_room(&app, &bob, &code).await;

    // The creator anchors the room.
    let (status, _) = request(
        &app,
        "POST",
        &format!("/rooms/{room_id}/withdraw"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // A non-member cannot withdraw.
    let (status, _) = request(
        &app,
        "POST",
        &format!("/rooms/{room_id}/withdraw"),
        Some(&carol),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // A plain member can.
    let (status, _) = request(
        &app,
        "POST",
        &format!("/rooms/{room_id}/withdraw"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, members) = request(
        &app,
        "GET",
        &format!("/rooms/{room_id}/members"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(members.as_array().unwrap().len(), 1);
}
