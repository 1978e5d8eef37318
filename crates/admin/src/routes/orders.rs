//! Order fulfilment.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use larder_core::permission::{AdminModule, PermissionLevel};
use larder_core::{OrderId, OrderStatus, TrackingStep};
use larder_db::{Order, OrderItem, OrderRepository, TrackingEvent, tracking_steps};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

const MODULE: AdminModule = AdminModule::Orders;

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 500;

/// Listing filter.
#[derive(Debug, Default, Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub limit: Option<i64>,
}

impl OrderFilter {
    fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

/// Status change request body.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
    /// Shown to the customer in tracking; defaults to the status label.
    pub note: Option<String>,
}

/// An order with lines and history.
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub tracking: Vec<TrackingStep>,
    pub events: Vec<TrackingEvent>,
}

async fn detail(orders: &OrderRepository<'_>, order: Order) -> Result<OrderDetail> {
    let items = orders.items(order.id).await?;
    let events = orders.tracking(order.id).await?;
    Ok(OrderDetail {
        tracking: tracking_steps(order.status, &events),
        order,
        items,
        events,
    })
}

/// Orders newest first, optionally by status.
pub async fn index(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<Vec<Order>>> {
    admin.require(state.gate(), MODULE, PermissionLevel::View)?;
    let orders = OrderRepository::new(state.pool())
        .list(filter.status, filter.limit())
        .await?;
    Ok(Json(orders))
}

/// One order with items and tracking.
pub async fn show(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetail>> {
    admin.require(state.gate(), MODULE, PermissionLevel::View)?;

    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

    Ok(Json(detail(&orders, order).await?))
}

/// Move an order along its lifecycle.
///
/// Disallowed transitions (backwards, out of a terminal state, cancelling
/// after dispatch) are rejected with 409.
#[instrument(skip_all, fields(admin_id = %admin.0.id, order_id = %id, next = %body.status))]
pub async fn update_status(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<OrderId>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<OrderDetail>> {
    admin.require(state.gate(), MODULE, PermissionLevel::Limited)?;

    let note = body.note.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let orders = OrderRepository::new(state.pool());
    let order = orders.update_status(id, body.status, note).await?;

    Ok(Json(detail(&orders, order).await?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(OrderFilter::default().limit(), DEFAULT_LIMIT);
        let huge = OrderFilter {
            limit: Some(10_000),
            ..OrderFilter::default()
        };
        assert_eq!(huge.limit(), MAX_LIMIT);
        let negative = OrderFilter {
            limit: Some(-3),
            ..OrderFilter::default()
        };
        assert_eq!(negative.limit(), 1);
    }

    #[test]
    fn test_status_body_shape() {
        let body: StatusUpdate =
            serde_json::from_str(r#"{"status": "out_for_delivery"}"#).unwrap();
        assert_eq!(body.status, OrderStatus::OutForDelivery);
        assert!(body.note.is_none());
    }
}
