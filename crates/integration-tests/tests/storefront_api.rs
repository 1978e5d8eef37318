//! Integration tests for the storefront API.
//!
//! These tests require:
//! - A migrated and seeded database (`larder migrate && larder seed`)
//! - The storefront server running (`cargo run -p larder-storefront`)

use larder_integration_tests::{session_client, storefront_base_url};
use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

async fn first_in_stock_product(client: &reqwest::Client) -> Value {
    let base_url = storefront_base_url();
    let products: Vec<Value> = client
        .get(format!("{base_url}/api/products"))
        .send()
        .await
        .expect("Failed to list products")
        .json()
        .await
        .expect("Failed to parse products");

    products
        .into_iter()
        .find(|p| p["in_stock"] == true)
        .expect("Seeded catalog should have an in-stock product")
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_health_endpoints() {
    let client = session_client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("Failed to reach /health");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/health/ready"))
        .send()
        .await
        .expect("Failed to reach /health/ready");
    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_products_sorted_by_price() {
    let client = session_client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/api/products?sort=price_asc"))
        .send()
        .await
        .expect("Failed to list products");
    assert_eq!(resp.status(), StatusCode::OK);

    let products: Vec<Value> = resp.json().await.expect("Failed to parse products");
    assert!(!products.is_empty());
    assert!(products.iter().all(|p| p["is_active"] == true));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_unknown_sort_is_bad_request() {
    let client = session_client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/api/products?sort=cheapest"))
        .send()
        .await
        .expect("Failed to list products");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await.expect("Failed to parse error");
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_missing_product_is_not_found() {
    let client = session_client();
    let base_url = storefront_base_url();
    let slug = Uuid::new_v4();

    let resp = client
        .get(format!("{base_url}/api/products/{slug}"))
        .send()
        .await
        .expect("Failed to fetch product");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_guest_cart_add_and_remove() {
    let client = session_client();
    let base_url = storefront_base_url();
    let product = first_in_stock_product(&client).await;
    let item = json!({"type": "product", "id": product["id"]});

    let resp = client
        .post(format!("{base_url}/api/cart/add"))
        .json(&json!({"item": item, "quantity": 1}))
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(cart["total_quantity"], 1);

    // Same session cookie, so the cart survives between requests.
    let cart: Value = client
        .get(format!("{base_url}/api/cart"))
        .send()
        .await
        .expect("Failed to fetch cart")
        .json()
        .await
        .expect("Failed to parse cart");
    assert_eq!(cart["lines"].as_array().map(Vec::len), Some(1));

    let cart: Value = client
        .post(format!("{base_url}/api/cart/remove"))
        .json(&json!({"item": item}))
        .send()
        .await
        .expect("Failed to remove from cart")
        .json()
        .await
        .expect("Failed to parse cart");
    assert_eq!(cart["total_quantity"], 0);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_unknown_cart_item_is_not_found() {
    let client = session_client();
    let base_url = storefront_base_url();

    let resp = client
        .post(format!("{base_url}/api/cart/add"))
        .json(&json!({"item": {"type": "product", "id": i32::MAX}, "quantity": 1}))
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_orders_require_login() {
    let client = session_client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/api/orders"))
        .send()
        .await
        .expect("Failed to list orders");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_register_then_me() {
    let client = session_client();
    let base_url = storefront_base_url();
    let email = format!("test-{}@example.com", Uuid::new_v4());

    let resp = client
        .post(format!("{base_url}/api/auth/register"))
        .json(&json!({
            "email": email,
            "password": "brine-and-dill-42",
            "name": "Test Customer",
        }))
        .send()
        .await
        .expect("Failed to register");
    assert!(resp.status().is_success());

    let me: Value = client
        .get(format!("{base_url}/api/auth/me"))
        .send()
        .await
        .expect("Failed to fetch profile")
        .json()
        .await
        .expect("Failed to parse profile");
    assert_eq!(me["email"], email.as_str());

    let resp = client
        .post(format!("{base_url}/api/auth/register"))
        .json(&json!({
            "email": email,
            "password": "brine-and-dill-42",
            "name": "Duplicate",
        }))
        .send()
        .await
        .expect("Failed to register twice");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}
