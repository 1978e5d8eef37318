//! Integration tests for the back-office API.
//!
//! These tests require:
//! - A migrated database (`larder migrate`)
//! - The admin server running (`cargo run -p larder-admin`)
//! - For the logged-in tests, an account created with `larder admin create`
//!   and its credentials in `TEST_ADMIN_EMAIL` / `TEST_ADMIN_PASSWORD`

use larder_integration_tests::{admin_base_url, admin_credentials, session_client};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

/// Log in with the configured test account, or `None` if none is configured.
async fn logged_in_client() -> Option<(Client, Value)> {
    let (email, password) = admin_credentials()?;
    let client = session_client();
    let base_url = admin_base_url();

    let resp = client
        .post(format!("{base_url}/api/auth/login"))
        .json(&json!({"email": email, "password": password}))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::OK, "test admin login failed");

    let profile = resp.json().await.expect("Failed to parse profile");
    Some((client, profile))
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_admin_health() {
    let base_url = admin_base_url();
    let resp = session_client()
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("Failed to reach /health");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_api_requires_login() {
    let client = session_client();
    let base_url = admin_base_url();

    for path in ["/api/dashboard", "/api/orders", "/api/admin-users", "/api/auth/me"] {
        let resp = client
            .get(format!("{base_url}{path}"))
            .send()
            .await
            .expect("Request failed");
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{path}");
    }
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_unknown_admin_cannot_log_in() {
    let client = session_client();
    let base_url = admin_base_url();
    let email = format!("nobody-{}@larder.shop", Uuid::new_v4());

    let resp = client
        .post(format!("{base_url}/api/auth/login"))
        .json(&json!({"email": email, "password": "not-the-password"}))
        .send()
        .await
        .expect("Failed to post login");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = resp.json().await.expect("Failed to parse error");
    assert!(body["error"].is_string());
}

// ============================================================================
// Logged-in flows
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server and TEST_ADMIN_EMAIL/TEST_ADMIN_PASSWORD"]
async fn test_profile_lists_every_module() {
    let Some((client, profile)) = logged_in_client().await else {
        return;
    };
    let base_url = admin_base_url();

    let levels = profile["effective_permissions"]
        .as_object()
        .expect("effective_permissions should be an object");
    for module in [
        "dashboard",
        "products",
        "orders",
        "customers",
        "content",
        "admin_users",
    ] {
        assert!(levels.contains_key(module), "missing {module}");
    }

    let me: Value = client
        .get(format!("{base_url}/api/auth/me"))
        .send()
        .await
        .expect("Failed to fetch profile")
        .json()
        .await
        .expect("Failed to parse profile");
    assert_eq!(me["email"], profile["email"]);
}

#[tokio::test]
#[ignore = "Requires running admin server and TEST_ADMIN_EMAIL/TEST_ADMIN_PASSWORD"]
async fn test_order_list_accepts_status_filter() {
    let Some((client, _)) = logged_in_client().await else {
        return;
    };
    let base_url = admin_base_url();

    let resp = client
        .get(format!("{base_url}/api/orders?status=shipped&limit=10"))
        .send()
        .await
        .expect("Failed to list orders");
    assert!(
        resp.status() == StatusCode::OK || resp.status() == StatusCode::FORBIDDEN,
        "unexpected {}",
        resp.status()
    );
}

#[tokio::test]
#[ignore = "Requires running admin server and TEST_ADMIN_EMAIL/TEST_ADMIN_PASSWORD"]
async fn test_logout_ends_session() {
    let Some((client, _)) = logged_in_client().await else {
        return;
    };
    let base_url = admin_base_url();

    let resp = client
        .post(format!("{base_url}/api/auth/logout"))
        .send()
        .await
        .expect("Failed to log out");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client
        .get(format!("{base_url}/api/auth/me"))
        .send()
        .await
        .expect("Failed to fetch profile");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running admin server and TEST_ADMIN_EMAIL/TEST_ADMIN_PASSWORD"]
async fn test_deactivated_admin_cannot_log_in() {
    let Some((client, _)) = logged_in_client().await else {
        return;
    };
    let base_url = admin_base_url();
    let email = format!("temp-{}@larder.shop", Uuid::new_v4());
    let password = "Temporary-pass-2481";

    let resp = client
        .post(format!("{base_url}/api/admin-users"))
        .json(&json!({"email": email, "name": "Temp", "role": "viewer", "password": password}))
        .send()
        .await
        .expect("Failed to create admin");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.expect("Failed to parse admin");
    let id = created["id"].as_i64().expect("id should be a number");

    let resp = client
        .delete(format!("{base_url}/api/admin-users/{id}"))
        .send()
        .await
        .expect("Failed to deactivate admin");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = session_client()
        .post(format!("{base_url}/api/auth/login"))
        .json(&json!({"email": email, "password": password}))
        .send()
        .await
        .expect("Failed to post login");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = client
        .delete(format!("{base_url}/api/admin-users/{id}?hard=true"))
        .send()
        .await
        .expect("Failed to delete admin");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore = "Requires running admin server and TEST_ADMIN_EMAIL/TEST_ADMIN_PASSWORD"]
async fn test_cannot_edit_own_permissions() {
    let Some((client, profile)) = logged_in_client().await else {
        return;
    };
    let base_url = admin_base_url();
    let id = profile["id"].as_i64().expect("id should be a number");

    let resp = client
        .put(format!("{base_url}/api/admin-users/{id}/permissions"))
        .json(&json!({"role": "super_admin"}))
        .send()
        .await
        .expect("Failed to update permissions");
    assert!(
        resp.status() == StatusCode::BAD_REQUEST || resp.status() == StatusCode::FORBIDDEN,
        "unexpected {}",
        resp.status()
    );
}
