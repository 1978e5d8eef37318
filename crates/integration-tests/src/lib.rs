//! Integration tests for Larder.
//!
//! The tests drive the real HTTP servers, so they are `#[ignore]`d by default.
//!
//! # Running Tests
//!
//! ```bash
//! larder migrate && larder seed
//! cargo run -p larder-storefront &
//! cargo run -p larder-admin &
//! cargo test -p larder-integration-tests -- --ignored
//! ```
//!
//! `STOREFRONT_BASE_URL` and `ADMIN_BASE_URL` override the default local
//! addresses. Admin tests that need an account read `TEST_ADMIN_EMAIL` and
//! `TEST_ADMIN_PASSWORD`.

use reqwest::Client;

/// Base URL for the storefront API.
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL for the back-office API.
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// Credentials for an existing admin account, if configured.
#[must_use]
pub fn admin_credentials() -> Option<(String, String)> {
    let email = std::env::var("TEST_ADMIN_EMAIL").ok()?;
    let password = std::env::var("TEST_ADMIN_PASSWORD").ok()?;
    Some((email, password))
}

/// A client that keeps session cookies between requests.
///
/// # Panics
///
/// Panics if the TLS backend cannot be initialised.
#[must_use]
pub fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}
