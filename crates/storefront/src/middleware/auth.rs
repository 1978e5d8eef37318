//! Authentication extractors.
//!
//! The logged-in customer lives in the session under
//! [`session_keys::CURRENT_CUSTOMER`]. Handlers that need a customer take
//! [`RequireAuth`]; handlers that behave differently for guests take
//! [`OptionalAuth`].

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{CurrentCustomer, session_keys};

/// Extractor that requires a logged-in customer.
///
/// Rejects with `401 {"error": "Please log in"}` otherwise.
///
/// ```rust,ignore
/// async fn my_orders(RequireAuth(customer): RequireAuth) -> Result<Json<Vec<Order>>> {
///     // ...
/// }
/// ```
pub struct RequireAuth(pub CurrentCustomer);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let OptionalAuth(customer) = OptionalAuth::from_request_parts(parts, state)
            .await
            .unwrap_or(OptionalAuth(None));

        customer
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("Please log in".to_string()))
    }
}

/// Extractor that optionally gets the current customer.
pub struct OptionalAuth(pub Option<CurrentCustomer>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let customer = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(customer))
    }
}

/// Store the logged-in customer in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_customer(
    session: &Session,
    customer: &CurrentCustomer,
) -> Result<(), tower_sessions::session::Error> {
    session
        .insert(session_keys::CURRENT_CUSTOMER, customer)
        .await
}

/// Remove the logged-in customer from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_customer(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
        .await?;
    Ok(())
}
