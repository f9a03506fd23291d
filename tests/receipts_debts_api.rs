//! Integration tests for receipt commits, split arithmetic, and debt
//! netting and settlement.

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{
    by_user_item, create_room, create_user, evenly_item, join_room, member_id, receipt_payload,
    request, test_app,
};
use serde_json::{json, Value};

async fn commit(app: &Router, user: &str, room_id: &str, payload: Value) -> (StatusCode, Value) {
    request(
        app,
        "POST",
        &format!("/rooms/{room_id}/receipts"),
        Some(user),
        Some(payload),
    )
    .await
}

async fn debts(app: &Router, user: &str, room_id: &str) -> Vec<Value> {
    let (status, body) = request(
        app,
        "GET",
        &format!("/rooms/{room_id}/debts"),
        Some(user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "debt listing failed: {body}");
    body.as_array().unwrap().clone()
}

#[tokio::test]
async fn evenly_split_creates_one_share_per_member() {
    let app = test_app().await;
    let alice = create_user(&app, "alice").await;
    let bob = create_user(&app, "bob").await;
    let carol = create_user(&app, "carol").await;
    let (room_id, code) = create_room(&app, &alice, "Flat").await;
    join_room(&app, &bob, &code).await;
    join_room(&app, &carol, &code).await;
    let alice_m = member_id(&app, &alice, &room_id, &alice).await;

    let (status, receipt) = commit(
        &app,
        &alice,
        &room_id,
        receipt_payload(
            "Weekly shop",
            "2025-04-12",
            json!([evenly_item("Groceries", 1000, &alice_m)]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "commit failed: {receipt}");

    let items = receipt["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["category"]["name"], "Food Groceries");

    let splits = items[0]["splits"].as_array().unwrap();
    assert_eq!(splits.len(), 3);
    assert!(splits.iter().all(|s| s["amount_cents"] == 333));
    assert!(splits.iter().all(|s| s["paid_by"]["id"] == alice_m.as_str()));

    // Alice paid for herself, so only bob and carol owe her.
    let debts = debts(&app, &alice, &room_id).await;
    assert_eq!(debts.len(), 2);
    assert!(debts
        .iter()
        .all(|d| d["creditor"]["id"] == alice_m.as_str() && d["amount_cents"] == 333));
}

#[tokio::test]
async fn by_user_split_charges_a_single_member() {
    let app = test_app().await;
    let alice = create_user(&app, "alice").await;
    let bob = create_user(&app, "bob").await;
    let (room_id, code) = create_room(&app, &alice, "Flat").await;
    join_room(&app, &bob, &code).await;
    let alice_m = member_id(&app, &alice, &room_id, &alice).await;
    let bob_m = member_id(&app, &alice, &room_id, &bob).await;

    let (status, receipt) = commit(
        &app,
        &alice,
        &room_id,
        receipt_payload(
            "Pharmacy",
            "2025-04-13",
            json!([by_user_item("Razors", 750, &bob_m, &alice_m)]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "commit failed: {receipt}");

    let splits = receipt["items"][0]["splits"].as_array().unwrap();
    assert_eq!(splits.len(), 1);
    assert_eq!(splits[0]["amount_cents"], 750);
    assert_eq!(splits[0]["member"]["id"].as_str().unwrap(), bob_m);

    let debts = debts(&app, &bob, &room_id).await;
    assert_eq!(debts.len(), 1);
    assert_eq!(debts[0]["debtor"]["id"].as_str().unwrap(), bob_m);
    assert_eq!(debts[0]["creditor"]["id"].as_str().unwrap(), alice_m);
    assert_eq!(debts[0]["amount_cents"], 750);
    assert_eq!(debts[0]["related_to_me"], true);
}

#[tokio::test]
async fn unknown_members_in_payload_are_rejected() {
    let app = test_app().await;
    let alice = create_user(&app, "alice").await;
    let (room_id, _) = create_room(&app, &alice, "Flat").await;
    let alice_m = member_id(&app, &alice, &room_id, &alice).await;

    let (status, _) = commit(
        &app,
        &alice,
        &room_id,
        receipt_payload(
            "Shop",
            "2025-04-12",
            json!([by_user_item("Milk", 100, "not-a-member", &alice_m)]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = commit(
        &app,
        &alice,
        &room_id,
        receipt_payload(
            "Shop",
            "2025-04-12",
            json!([evenly_item("Milk", 100, "not-a-member")]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_payloads_are_rejected_with_specific_messages() {
    let app = test_app().await;
    let alice = create_user(&app, "alice").await;
    let (room_id, _) = create_room(&app, &alice, "Flat").await;
    let alice_m = member_id(&app, &alice, &room_id, &alice).await;

    let (status, body) = commit(
        &app,
        &alice,
        &room_id,
        receipt_payload("Shop", "2025-04-12", json!([])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Receipt must contain at least one item.");

    let (status, body) = commit(
        &app,
        &alice,
        &room_id,
        receipt_payload(
            "Shop",
            "12/04/2025",
            json!([evenly_item("Milk", 100, &alice_m)]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid purchase_date format. Expected YYYY-MM-DD.");

    let mut item = evenly_item("Milk", 100, &alice_m);
    item["split_method"] = json!("BY_USER");
    let (status, body) = commit(
        &app,
        &alice,
        &room_id,
        receipt_payload("Shop", "2025-04-12", json!([item])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "split_user_id is required for BY_USER split method.");
}

#[tokio::test]
async fn debts_net_across_receipts() {
    let app = test_app().await;
    let alice = create_user(&app, "alice").await;
    let bob = create_user(&app, "bob").await;
    let (room_id, code) = create_room(&app, &alice, "Flat").await;
    join_room(&app, &bob, &code).await;
    let alice_m = member_id(&app, &alice, &room_id, &alice).await;
    let bob_m = member_id(&app, &alice, &room_id, &bob).await;

    // Bob owes Alice 500.
    commit(
        &app,
        &alice,
        &room_id,
        receipt_payload(
            "R1",
            "2025-04-01",
            json!([by_user_item("A", 500, &bob_m, &alice_m)]),
        ),
    )
    .await;

    // Alice owes Bob 200: nets to bob -> alice 300.
    commit(
        &app,
        &bob,
        &room_id,
        receipt_payload(
            "R2",
            "2025-04-02",
            json!([by_user_item("B", 200, &alice_m, &bob_m)]),
        ),
    )
    .await;

    let open = debts(&app, &alice, &room_id).await;
    assert_eq!(open.len(), 1);
    assert_eq!(open[0]["debtor"]["id"].as_str().unwrap(), bob_m);
    assert_eq!(open[0]["amount_cents"], 300);

    // An exact offset deletes the row.
    commit(
        &app,
        &bob,
        &room_id,
        receipt_payload(
            "R3",
            "2025-04-03",
            json!([by_user_item("C", 300, &alice_m, &bob_m)]),
        ),
    )
    .await;
    assert!(debts(&app, &alice, &room_id).await.is_empty());

    // Going past zero flips the direction.
    commit(
        &app,
        &bob,
        &room_id,
        receipt_payload(
            "R4",
            "2025-04-04",
            json!([by_user_item("D", 400, &alice_m, &bob_m)]),
        ),
    )
    .await;
    let open = debts(&app, &alice, &room_id).await;
    assert_eq!(open.len(), 1);
    assert_eq!(open[0]["debtor"]["id"].as_str().unwrap(), alice_m);
    assert_eq!(open[0]["creditor"]["id"].as_str().unwrap(), bob_m);
    assert_eq!(open[0]["amount_cents"], 400);
}

#[tokio::test]
async fn paying_a_debt_partially_then_fully() {
    let app = test_app().await;
    let alice = create_user(&app, "alice").await;
    let bob = create_user(&app, "bob").await;
    let carol = create_user(&app, "carol").await;
    let (room_id, code) = create_room(&app, &alice, "Flat").await;
    join_room(&app, &bob, &code).await;
    join_room(&app, &carol, &code).await;
    let alice_m = member_id(&app, &alice, &room_id, &alice).await;
    let bob_m = member_id(&app, &alice, &room_id, &bob).await;

    commit(
        &app,
        &alice,
        &room_id,
        receipt_payload(
            "R1",
            "2025-04-01",
            json!([by_user_item("A", 500, &bob_m, &alice_m)]),
        ),
    )
    .await;
    let debt_id = debts(&app, &alice, &room_id).await[0]["id"]
        .as_str()
        .unwrap()
        .to_string();
    let pay_uri = format!("/rooms/{room_id}/debts/{debt_id}/pay");

    // Carol is a member but not a party to this debt.
    let (status, body) = request(
        &app,
        "POST",
        &pay_uri,
        Some(&carol),
        Some(json!({ "amount_cents": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You are not involved in this debt");

    // Overpayment and non-positive amounts are rejected.
    let (status, body) = request(
        &app,
        "POST",
        &pay_uri,
        Some(&bob),
        Some(json!({ "amount_cents": 600 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Payment amount cannot exceed the debt amount.");

    let (status, _) = request(
        &app,
        "POST",
        &pay_uri,
        Some(&bob),
        Some(json!({ "amount_cents": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Partial payment leaves the remainder.
    let (status, remaining) = request(
        &app,
        "POST",
        &pay_uri,
        Some(&bob),
        Some(json!({ "amount_cents": 200 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(remaining["amount_cents"], 300);
    assert_eq!(remaining["related_to_me"], true);

    // Exact payment deletes the debt.
    let (status, body) = request(
        &app,
        "POST",
        &pay_uri,
        Some(&alice),
        Some(json!({ "amount_cents": 300 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Debt fully paid and deleted.");
    assert!(debts(&app, &alice, &room_id).await.is_empty());
}

#[tokio::test]
async fn receipt_splits_listing_is_scoped_to_the_room() {
    let app = test_app().await;
    let alice = create_user(&app, "alice").await;
    let bob = create_user(&app, "bob").await;
    let (room_id, code) = create_room(&app, &alice, "Flat").await;
    join_room(&app, &bob, &code).await;
    let alice_m = member_id(&app, &alice, &room_id, &alice).await;

    let (_, receipt) = commit(
        &app,
        &alice,
        &room_id,
        receipt_payload(
            "Weekly shop",
            "2025-04-12",
            json!([evenly_item("Groceries", 1000, &alice_m)]),
        ),
    )
    .await;
    let receipt_id = receipt["id"].as_str().unwrap();

    let (status, body) = request(
        &app,
        "GET",
        &format!("/rooms/{room_id}/receipts/{receipt_id}/splits"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["splits"].as_array().unwrap().len(), 2);

    // The same receipt id is invisible from another room.
    let (other_room, _) = create_room(&app, &bob, "Bob's place").await;
    let (status, _) = request(
        &app,
        "GET",
        &format!("/rooms/{other_room}/receipts/{receipt_id}/splits"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
