//! Customer authentication route handlers.
//!
//! A successful login or registration cycles the session ID, stores the
//! customer in the session and reconciles the guest cart with the one saved
//! on the account.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use larder_core::cart::Cart;
use larder_db::{Customer, CustomerRepository};

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_customer, set_current_customer};
use crate::models::{CurrentCustomer, session_keys};
use crate::services::auth::{AuthService, Registration};
use crate::services::cart::CartService;
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
}

/// Returned after login or registration.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub customer: CurrentCustomer,
    /// Units in the reconciled cart.
    pub cart_count: u32,
}

/// Log in with email and password.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<SessionResponse>> {
    let customer = AuthService::new(state.pool())
        .login(&body.email, &body.password)
        .await?;

    let response = start_session(&state, &session, &customer).await?;
    tracing::info!(customer_id = %customer.id, "Customer logged in");
    Ok(Json(response))
}

/// Create an account and log in.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>)> {
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }

    let customer = AuthService::new(state.pool())
        .register(&Registration {
            email: &body.email,
            password: &body.password,
            name: &body.name,
            phone: body.phone.as_deref(),
        })
        .await?;

    let response = start_session(&state, &session, &customer).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Log out, dropping the session cart (it stays saved on the account).
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_customer(&session).await?;
    session.remove::<Cart>(session_keys::CART).await?;
    session.cycle_id().await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// The logged-in customer's profile.
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<Customer>> {
    CustomerRepository::new(state.pool())
        .get(current.id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::Unauthorized("Please log in".to_string()))
}

/// Bind `customer` to the session and reconcile carts.
async fn start_session(
    state: &AppState,
    session: &Session,
    customer: &Customer,
) -> Result<SessionResponse> {
    // Fresh ID on privilege change.
    session.cycle_id().await?;

    let current = CurrentCustomer::from(customer);
    set_current_customer(session, &current).await?;
    set_sentry_user(&customer.id, Some(customer.email.as_str()));

    let catalog = state.catalog().snapshot().await?;
    let cart = CartService::new(session, state.pool(), &catalog, Some(customer.id))
        .reconcile()
        .await?;

    Ok(SessionResponse {
        customer: current,
        cart_count: cart.total_quantity(),
    })
}
