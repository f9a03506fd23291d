//! Integration tests for the purchase history listing.
//!
//! Fixture: alice and bob share a room with three receipt items split
//! evenly, so alice's split of each is half its actual price.

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{create_room, create_user, join_room, member_id, receipt_payload, request, test_app};
use serde_json::{json, Value};

struct Fixture {
    app: Router,
    alice: String,
    room_id: String,
}

fn item(name: &str, price_cents: i64, quantity: f64, category: &str, paid_by: &str) -> Value {
    json!({
        "name": name,
        "general_name": name,
        "quantity": quantity,
        "price_cents": price_cents,
        "category": category,
        "split_method": "EVENLY",
        "paid_by_id": paid_by,
    })
}

async fn fixture() -> Fixture {
    let app = test_app().await;
    let alice = create_user(&app, "alice").await;
    let bob = create_user(&app, "bob").await;
    let (room_id, code) = create_room(&app, &alice, "Flat").await;
    join_room(&app, &bob, &code).await;
    let alice_m = member_id(&app, &alice, &room_id, &alice).await;

    for (name, date, items) in [
        (
            "First shop",
            "2025-04-01",
            json!([
                item("Oat Milk", 400, 1.0, "Food Groceries", &alice_m),
                item("Paper Towels", 600, 2.0, "Household Product", &alice_m),
            ]),
        ),
        (
            "Second shop",
            "2025-04-05",
            json!([item("Whole Milk", 300, 3.0, "Food Groceries", &alice_m)]),
        ),
    ] {
        let (status, body) = request(
            &app,
            "POST",
            &format!("/rooms/{room_id}/receipts"),
            Some(&alice),
            Some(receipt_payload(name, date, items)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "fixture commit failed: {body}");
    }

    Fixture {
        app,
        alice,
        room_id,
    }
}

async fn history(f: &Fixture, query: &str) -> (StatusCode, Value) {
    request(
        &f.app,
        "GET",
        &format!("/rooms/{}/history{query}", f.room_id),
        Some(&f.alice),
        None,
    )
    .await
}

#[tokio::test]
async fn my_items_is_the_default_view() {
    let f = fixture().await;

    let (status, body) = history(&f, "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["view"], "my_items");
    assert_eq!(body["total_items"], 3);
    // Half of 400 + 600 + 300.
    assert_eq!(body["total_spent"], 650);

    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    // Default order is purchase date ascending.
    assert_eq!(items[0]["receipt_name"], "First shop");
    assert_eq!(items[2]["receipt_name"], "Second shop");
    // my_items rows carry the split amount.
    let oat_milk = items.iter().find(|i| i["name"] == "Oat Milk").unwrap();
    assert_eq!(oat_milk["amount_cents"], 200);
}

#[tokio::test]
async fn room_items_lists_every_item_with_actual_prices() {
    let f = fixture().await;

    let (status, body) = history(&f, "?view=room_items").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["view"], "room_items");
    assert_eq!(body["total_items"], 3);
    assert_eq!(body["total_spent"], 1300);

    let items = body["items"].as_array().unwrap();
    // room_items rows have no split amount.
    assert!(items[0].get("amount_cents").is_none());
}

#[tokio::test]
async fn search_matches_item_and_receipt_names() {
    let f = fixture().await;

    let (status, body) = history(&f, "?search=milk").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_items"], 2);
    let names: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Oat Milk", "Whole Milk"]);

    // Receipt names match too.
    let (_, body) = history(&f, "?search=Second").await;
    assert_eq!(body["total_items"], 1);
    assert_eq!(body["items"][0]["name"], "Whole Milk");
}

#[tokio::test]
async fn category_filter() {
    let f = fixture().await;

    let (_, categories) = request(
        &f.app,
        "GET",
        &format!("/rooms/{}/categories", f.room_id),
        Some(&f.alice),
        None,
    )
    .await;
    let household = categories
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "Household Product")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, body) = history(&f, &format!("?category_id={household}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_items"], 1);
    assert_eq!(body["items"][0]["name"], "Paper Towels");
}

#[tokio::test]
async fn sorting_by_price_and_quantity() {
    let f = fixture().await;

    let (_, body) = history(&f, "?view=room_items&sort_by=price&sort_order=desc").await;
    let names: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Paper Towels", "Oat Milk", "Whole Milk"]);

    let (_, body) = history(&f, "?sort_by=quantity&sort_order=desc").await;
    assert_eq!(body["items"][0]["name"], "Whole Milk");
}

#[tokio::test]
async fn pagination_metadata_and_links() {
    let f = fixture().await;

    let (status, body) = history(&f, "?page_size=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);

    let pagination = &body["pagination"];
    assert_eq!(pagination["current_page"], 1);
    assert_eq!(pagination["page_size"], 2);
    assert_eq!(pagination["total_pages"], 2);
    assert!(pagination["previous"].is_null());
    let next = pagination["next"].as_str().unwrap();
    assert!(next.contains("page=2"), "next was {next}");
    assert!(next.starts_with(&format!("/rooms/{}/history?", f.room_id)));

    let (status, body) = history(&f, "?page_size=2&page=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    let pagination = &body["pagination"];
    assert_eq!(pagination["current_page"], 2);
    assert!(pagination["next"].is_null());
    assert!(pagination["previous"].as_str().unwrap().contains("page=1"));

    // A page past the end clamps to the last page.
    let (status, body) = history(&f, "?page_size=2&page=9").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["current_page"], 2);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_parameters_are_rejected() {
    let f = fixture().await;

    let cases = [
        (
            "?view=their_items",
            "Invalid view parameter. Must be 'my_items' or 'room_items'.",
        ),
        (
            "?sort_by=color",
            "Invalid sort_by parameter. Must be 'purchase_date', 'price', or 'quantity'.",
        ),
        (
            "?sort_order=sideways",
            "Invalid sort_order parameter. Must be 'asc' or 'desc'.",
        ),
        ("?page=0", "Page number must be at least 1."),
        ("?page_size=101", "Page size must be between 1 and 100."),
        ("?page=soon", "Page and page_size must be integers."),
    ];
    for (query, message) in cases {
        let (status, body) = history(&f, query).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "query {query}");
        assert_eq!(body["error"], message, "query {query}");
    }
}
