//! Cart route handlers.
//!
//! Guests and customers share these endpoints; for customers the cart is
//! also saved to their account.

use axum::{Json, extract::State};
use serde::Deserialize;
use tower_sessions::Session;

use larder_core::cart::LineItem;

use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::services::cart::{CartService, CartView};
use crate::state::AppState;

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
pub struct AddRequest {
    pub item: LineItem,
    #[serde(default = "one")]
    pub quantity: u32,
}

const fn one() -> u32 {
    1
}

/// Quantity update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub item: LineItem,
    pub quantity: u32,
}

/// Line removal request body.
#[derive(Debug, Deserialize)]
pub struct RemoveRequest {
    pub item: LineItem,
}

/// The priced cart.
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
) -> Result<Json<CartView>> {
    let catalog = state.catalog().snapshot().await?;
    let carts = CartService::new(&session, state.pool(), &catalog, customer.map(|c| c.id));
    Ok(Json(carts.view().await?))
}

/// Add units of a product or combo.
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Json(body): Json<AddRequest>,
) -> Result<Json<CartView>> {
    let catalog = state.catalog().snapshot().await?;
    let carts = CartService::new(&session, state.pool(), &catalog, customer.map(|c| c.id));
    Ok(Json(carts.add(body.item, body.quantity).await?))
}

/// Set a line's quantity; zero removes it.
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Json(body): Json<UpdateRequest>,
) -> Result<Json<CartView>> {
    let catalog = state.catalog().snapshot().await?;
    let carts = CartService::new(&session, state.pool(), &catalog, customer.map(|c| c.id));
    Ok(Json(carts.update(body.item, body.quantity).await?))
}

/// Remove a line.
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Json(body): Json<RemoveRequest>,
) -> Result<Json<CartView>> {
    let catalog = state.catalog().snapshot().await?;
    let carts = CartService::new(&session, state.pool(), &catalog, customer.map(|c| c.id));
    Ok(Json(carts.remove(body.item).await?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use larder_core::{ComboId, ProductId};

    use super::*;

    #[test]
    fn test_add_defaults_to_one_unit() {
        let body: AddRequest =
            serde_json::from_str(r#"{"item": {"type": "combo", "id": 4}}"#).unwrap();
        assert_eq!(body.item, LineItem::Combo(ComboId::new(4)));
        assert_eq!(body.quantity, 1);
    }

    #[test]
    fn test_update_body_shape() {
        let body: UpdateRequest =
            serde_json::from_str(r#"{"item": {"type": "product", "id": 7}, "quantity": 0}"#)
                .unwrap();
        assert_eq!(body.item, LineItem::Product(ProductId::new(7)));
        assert_eq!(body.quantity, 0);
    }
}
