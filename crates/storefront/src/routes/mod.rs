//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST /api/auth/login            - Log in, reconcile cart
//! POST /api/auth/register         - Create account and log in
//! POST /api/auth/logout           - Log out
//! GET  /api/auth/me               - Current customer
//!
//! # Catalog
//! GET  /api/products              - ?category=&q=&sort=&featured=
//! GET  /api/products/{slug}
//! GET  /api/combos                - ?q=&sort=&featured=
//! GET  /api/combos/{slug}
//! GET  /api/categories
//!
//! # Cart
//! GET  /api/cart
//! POST /api/cart/add
//! POST /api/cart/update
//! POST /api/cart/remove
//!
//! # Orders and addresses (requires auth)
//! GET  /api/orders
//! POST /api/orders                - Checkout
//! GET  /api/orders/{id}
//! GET  /api/addresses
//! POST /api/addresses
//! PUT  /api/addresses/{id}
//! DELETE /api/addresses/{id}
//!
//! # Content
//! GET  /api/hero-config
//! GET  /api/content/{page}
//! GET  /api/banners               - ?placement=
//! GET  /api/careers
//! GET  /api/press
//! GET  /api/blog
//! GET  /api/blog/{slug}
//! ```

pub mod addresses;
pub mod auth;
pub mod cart;
pub mod content;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::middleware::auth_rate_limiter;
use crate::config::StorefrontConfig;
use crate::state::AppState;

/// Create the auth routes router.
///
/// Login and registration are rate limited per client IP.
pub fn auth_routes(trust_proxy_headers: bool) -> Router<AppState> {
    let limited = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .layer(auth_rate_limiter(trust_proxy_headers));

    Router::new()
        .merge(limited)
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{slug}", get(products::show))
        .route("/combos", get(products::combos))
        .route("/combos/{slug}", get(products::combo))
        .route("/categories", get(products::categories))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(orders::index).post(orders::create))
        .route("/orders/{id}", get(orders::show))
        .route("/addresses", get(addresses::index).post(addresses::create))
        .route(
            "/addresses/{id}",
            put(addresses::update).delete(addresses::delete),
        )
}

/// Create the content routes router.
pub fn content_routes() -> Router<AppState> {
    Router::new()
        .route("/hero-config", get(content::hero_config))
        .route("/content/{page}", get(content::page))
        .route("/banners", get(content::banners))
        .route("/careers", get(content::careers))
        .route("/press", get(content::press))
        .route("/blog", get(content::blog))
        .route("/blog/{slug}", get(content::blog_post))
}

/// Create all routes for the storefront.
pub fn routes(config: &StorefrontConfig) -> Router<AppState> {
    let api = Router::new()
        .nest("/auth", auth_routes(config.trust_proxy_headers))
        .nest("/cart", cart_routes())
        .merge(catalog_routes())
        .merge(account_routes())
        .merge(content_routes());

    Router::new().nest("/api", api)
}
