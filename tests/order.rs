mod common;

use common::{auth_headers, spawn_app, TestApp};
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn product(app: &TestApp, admin: &str, name: &str, price: &str) -> i64 {
    let created = app
        .create_product(admin, json!({ "name": name, "price": price, "stock": 5 }))
        .await;
    created["id"].as_i64().expect("id missing")
}

async fn set_status(app: &TestApp, admin: &str, order_id: i64, status: &str) -> reqwest::Response {
    app.client
        .patch(app.url(&format!("/orders/{order_id}/status")))
        .headers(auth_headers(admin))
        .json(&json!({ "status": status }))
        .send()
        .await
        .expect("Failed to send status request")
}

#[tokio::test]
async fn test_checkout_totals_and_clears_cart() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let token = app.user_token("shopper").await;
    let product_a = product(&app, &admin, "Product A", "10.00").await;
    let product_b = product(&app, &admin, "Product B", "5.00").await;

    // Step 1: fill the cart
    app.add_to_cart(&token, product_a, 2).await;
    app.add_to_cart(&token, product_b, 1).await;
    let (_, before) = app.get_json("/carts", &token).await;

    // Step 2: checkout
    let (status, body) = app.checkout(&token).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Order created successfully");
    assert_eq!(body["status"], "pending");
    assert_eq!(body["total_amount"], "25.00");
    assert!(body["created_at"].is_string());
    let order_id = body["order_id"].as_i64().expect("order_id missing");

    // Step 3: order lines snapshot the prices
    let (status, details) = app.get_json(&format!("/orders/{order_id}"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["order"]["total_amount"], "25.00");
    let items = details["items"].as_array().expect("items missing");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["product_id"], product_a);
    assert_eq!(items[0]["product_name"], "Product A");
    assert_eq!(items[0]["quantity"], 2);
    assert_eq!(items[0]["unit_price"], "10.00");
    assert_eq!(items[0]["subtotal"], "20.00");
    assert_eq!(items[1]["subtotal"], "5.00");

    // Step 4: cart emptied but kept
    let (_, after) = app.get_json("/carts", &token).await;
    assert_eq!(after["items"], json!([]));
    assert_eq!(after["cart_id"], before["cart_id"]);
}

#[tokio::test]
async fn test_checkout_without_cart_is_not_found() {
    let app = spawn_app().await;
    let token = app.user_token("shopper").await;

    let (status, body) = app.checkout(&token).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Cart not found");
}

#[tokio::test]
async fn test_checkout_empty_cart_creates_nothing() {
    let app = spawn_app().await;
    let token = app.user_token("shopper").await;

    // Step 1: provision an empty cart
    let (status, _) = app.get_json("/carts", &token).await;
    assert_eq!(status, StatusCode::OK);

    // Step 2: checkout fails
    let (status, body) = app.checkout(&token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cart is empty");

    // Step 3: no order appeared
    let (_, orders) = app.get_json("/orders", &token).await;
    assert_eq!(orders, json!([]));
}

#[tokio::test]
async fn test_order_price_is_a_snapshot() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let token = app.user_token("shopper").await;
    let product_id = product(&app, &admin, "Bagel", "4.00").await;

    app.add_to_cart(&token, product_id, 1).await;
    let (_, body) = app.checkout(&token).await;
    let order_id = body["order_id"].as_i64().expect("order_id missing");

    let response = app
        .client
        .put(app.url(&format!("/products/{product_id}")))
        .headers(auth_headers(&admin))
        .json(&json!({ "price": 9 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let (_, details) = app.get_json(&format!("/orders/{order_id}"), &token).await;
    assert_eq!(details["items"][0]["unit_price"], "4.00");
    assert_eq!(details["order"]["total_amount"], "4.00");
}

#[tokio::test]
async fn test_list_orders_newest_first() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let token = app.user_token("shopper").await;
    let product_id = product(&app, &admin, "Bagel", "1").await;

    app.add_to_cart(&token, product_id, 1).await;
    let (_, first) = app.checkout(&token).await;
    app.add_to_cart(&token, product_id, 2).await;
    let (_, second) = app.checkout(&token).await;

    let (status, orders) = app.get_json("/orders", &token).await;
    assert_eq!(status, StatusCode::OK);
    let orders = orders.as_array().expect("orders missing");
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["id"], second["order_id"]);
    assert_eq!(orders[1]["id"], first["order_id"]);
}

#[tokio::test]
async fn test_foreign_order_is_not_found() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let alice = app.user_token("alice").await;
    let bob = app.user_token("bob").await;
    let product_id = product(&app, &admin, "Bagel", "1").await;

    app.add_to_cart(&alice, product_id, 1).await;
    let (_, body) = app.checkout(&alice).await;
    let order_id = body["order_id"].as_i64().expect("order_id missing");

    let (status, body) = app.get_json(&format!("/orders/{order_id}"), &bob).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Order not found");
    assert!(body.get("order").is_none());

    let (_, bob_orders) = app.get_json("/orders", &bob).await;
    assert_eq!(bob_orders, json!([]));
}

#[tokio::test]
async fn test_status_update_accepts_any_listed_value() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let token = app.user_token("shopper").await;
    let product_id = product(&app, &admin, "Bagel", "1").await;

    app.add_to_cart(&token, product_id, 1).await;
    let (_, body) = app.checkout(&token).await;
    let order_id = body["order_id"].as_i64().expect("order_id missing");

    // Step 1: backwards transitions are allowed
    for status in ["delivered", "pending", "cancelled", "shipped"] {
        let response = set_status(&app, &admin, order_id, status).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.json::<Value>().await.expect("Failed to parse JSON");
        assert_eq!(body["message"], "Order status updated");
        assert_eq!(body["order"]["id"], order_id);
        assert_eq!(body["order"]["status"], status);
        assert!(body["order"]["updated_at"].is_string());
    }

    // Step 2: the owner sees the last one
    let (_, details) = app.get_json(&format!("/orders/{order_id}"), &token).await;
    assert_eq!(details["order"]["status"], "shipped");
}

#[tokio::test]
async fn test_status_update_rejections() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let token = app.user_token("shopper").await;
    let product_id = product(&app, &admin, "Bagel", "1").await;

    app.add_to_cart(&token, product_id, 1).await;
    let (_, body) = app.checkout(&token).await;
    let order_id = body["order_id"].as_i64().expect("order_id missing");

    let invalid = set_status(&app, &admin, order_id, "lost").await;
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    let body = invalid.json::<Value>().await.expect("Failed to parse JSON");
    assert_eq!(body["error"], "Invalid status");

    let missing = set_status(&app, &admin, 9999, "shipped").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let forbidden = set_status(&app, &token, order_id, "shipped").await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_lists_all_orders() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let alice = app.user_token("alice").await;
    let bob = app.user_token("bob").await;
    let product_id = product(&app, &admin, "Bagel", "1.50").await;

    app.add_to_cart(&alice, product_id, 1).await;
    app.checkout(&alice).await;
    app.add_to_cart(&bob, product_id, 2).await;
    app.checkout(&bob).await;

    let (status, rows) = app.get_json("/orders/all", &admin).await;
    assert_eq!(status, StatusCode::OK);
    let rows = rows.as_array().expect("rows missing");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["username"], "bob");
    assert_eq!(rows[0]["total_amount"], "3.00");
    assert_eq!(rows[1]["username"], "alice");
    assert_eq!(rows[1]["status"], "pending");
    assert!(rows[1]["user_id"].is_number());
}
