//! HTTP route handlers for the back-office.
//!
//! # Route Structure
//!
//! ```text
//! POST   /api/auth/login                  - Email + password login (rate limited)
//! POST   /api/auth/logout
//! GET    /api/auth/me                     - Profile with effective permissions
//!
//! GET    /api/dashboard                   - Order totals, low stock, customer count
//!
//! GET    /api/products                    POST /api/products
//! GET    /api/products/{id}               PUT  /api/products/{id}
//! DELETE /api/products/{id}[?hard=true]
//!   (same shape for combos, categories, banners and posts)
//!
//! GET    /api/orders[?status=]            GET  /api/orders/{id}
//! POST   /api/orders/{id}/status
//!
//! GET    /api/customers[?q=]              GET  /api/customers/{id}
//!
//! GET    /api/content                     GET  /api/content/{page}
//! PUT    /api/content/{page}/{section}
//!
//! GET    /api/admin-users                 POST /api/admin-users
//! PUT    /api/admin-users/{id}/permissions
//! DELETE /api/admin-users/{id}[?hard=true]
//! ```
//!
//! Every handler except login checks the caller's permission level for its
//! module: view to read, limited to edit, full to create or delete.

pub mod admin_users;
pub mod auth;
pub mod banners;
pub mod categories;
pub mod combos;
pub mod content;
pub mod customers;
pub mod dashboard;
pub mod orders;
pub mod posts;
pub mod products;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use serde::Deserialize;

use crate::middleware::login_rate_limiter;
use crate::config::AdminConfig;
use crate::state::AppState;

/// Query parameters for DELETE endpoints.
///
/// By default a delete hides the record (`is_active = false`, or unpublished
/// for posts); `?hard=true` removes the row.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub hard: bool,
}

/// Build the back-office router.
pub fn routes(config: &AdminConfig) -> Router<AppState> {
    Router::new().nest("/api", api_routes(config))
}

fn api_routes(config: &AdminConfig) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes(config.trust_proxy_headers))
        .route("/dashboard", get(dashboard::show))
        .merge(catalog_routes())
        .merge(storefront_content_routes())
        // Orders
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/status", post(orders::update_status))
        // Customers
        .route("/customers", get(customers::index))
        .route("/customers/{id}", get(customers::show))
        // Admin users
        .route(
            "/admin-users",
            get(admin_users::index).post(admin_users::create),
        )
        .route(
            "/admin-users/{id}/permissions",
            put(admin_users::update_permissions),
        )
        .route("/admin-users/{id}", delete(admin_users::delete))
}

fn auth_routes(trust_proxy_headers: bool) -> Router<AppState> {
    let limited = Router::new()
        .route("/login", post(auth::login))
        .layer(login_rate_limiter(trust_proxy_headers));

    Router::new()
        .merge(limited)
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index).post(products::create))
        .route(
            "/products/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/combos", get(combos::index).post(combos::create))
        .route(
            "/combos/{id}",
            get(combos::show).put(combos::update).delete(combos::delete),
        )
        .route(
            "/categories",
            get(categories::index).post(categories::create),
        )
        .route(
            "/categories/{id}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::delete),
        )
}

fn storefront_content_routes() -> Router<AppState> {
    Router::new()
        .route("/banners", get(banners::index).post(banners::create))
        .route(
            "/banners/{id}",
            get(banners::show)
                .put(banners::update)
                .delete(banners::delete),
        )
        .route("/posts", get(posts::index).post(posts::create))
        .route(
            "/posts/{id}",
            get(posts::show).put(posts::update).delete(posts::delete),
        )
        .route("/content", get(content::index))
        .route("/content/{page}", get(content::show))
        .route("/content/{page}/{section}", put(content::update))
}
