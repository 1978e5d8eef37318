//! Checkout and order history.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use larder_core::{AddressId, CustomerId, OrderId, TrackingStep};
use larder_db::{
    AddressInput, AddressRepository, NewOrder, Order, OrderItem, OrderRepository, TrackingEvent,
    tracking_steps,
};

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::services::cart::CartService;
use crate::state::AppState;

/// Checkout request body.
///
/// Ships to `address_id`, or to an inline `address`, or to the customer's
/// default address when neither is given.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutRequest {
    pub address_id: Option<AddressId>,
    pub address: Option<AddressInput>,
}

/// An order with its lines and tracking.
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub tracking: Vec<TrackingStep>,
    pub events: Vec<TrackingEvent>,
}

impl OrderDetail {
    async fn load(orders: &OrderRepository<'_>, order: Order) -> Result<Self> {
        let items = orders.items(order.id).await?;
        let events = orders.tracking(order.id).await?;
        Ok(Self {
            tracking: tracking_steps(order.status, &events),
            order,
            items,
            events,
        })
    }
}

/// The customer's orders, newest first.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_customer(customer.id)
        .await?;
    Ok(Json(orders))
}

/// One of the customer's orders with tracking steps.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetail>> {
    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get_for_customer(customer.id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

    Ok(Json(OrderDetail::load(&orders, order).await?))
}

/// Place an order for everything in the cart.
#[instrument(skip_all, fields(customer_id = %customer.id))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(customer): RequireAuth,
    Json(body): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<OrderDetail>)> {
    let shipping_address = resolve_address(&state, customer.id, body).await?;

    let catalog = state.catalog().snapshot().await?;
    let carts = CartService::new(&session, state.pool(), &catalog, Some(customer.id));
    let (cart, _) = carts.current().await?;
    if cart.is_empty() {
        return Err(AppError::BadRequest("Your cart is empty".to_string()));
    }

    let orders = OrderRepository::new(state.pool());
    let order = orders
        .checkout(&NewOrder {
            customer_id: customer.id,
            shipping_address,
            lines: cart.lines().to_vec(),
        })
        .await?;

    carts.clear().await?;
    state.catalog().invalidate().await;

    Ok((StatusCode::CREATED, Json(OrderDetail::load(&orders, order).await?)))
}

/// Pick the shipping address for checkout.
async fn resolve_address(
    state: &AppState,
    customer: CustomerId,
    body: CheckoutRequest,
) -> Result<AddressInput> {
    let addresses = AddressRepository::new(state.pool());

    if let Some(id) = body.address_id {
        let address = addresses
            .get(customer, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Address".to_string()))?;
        return Ok(AddressInput::from(&address));
    }

    if let Some(address) = body.address {
        address.validate().map_err(AppError::BadRequest)?;
        return Ok(address);
    }

    addresses
        .list(customer)
        .await?
        .iter()
        .find(|a| a.is_default)
        .map(AddressInput::from)
        .ok_or_else(|| AppError::BadRequest("Choose a shipping address".to_string()))
}
