//! Back-office overview.

use axum::{Json, extract::State};
use serde::Serialize;

use larder_core::permission::{AdminModule, PermissionLevel};
use larder_db::{CustomerRepository, DashboardSummary, OrderRepository, Product, ProductRepository};

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Products at or below this many units are flagged.
const LOW_STOCK_THRESHOLD: u32 = 5;

/// Dashboard payload.
#[derive(Debug, Serialize)]
pub struct Dashboard {
    #[serde(flatten)]
    pub orders: DashboardSummary,
    pub customer_count: i64,
    pub low_stock: Vec<Product>,
}

/// Order totals, customer count and products running low.
pub async fn show(State(state): State<AppState>, admin: RequireAdmin) -> Result<Json<Dashboard>> {
    admin.require(state.gate(), AdminModule::Dashboard, PermissionLevel::View)?;

    let orders = OrderRepository::new(state.pool()).summary().await?;
    let customer_count = CustomerRepository::new(state.pool()).count().await?;
    let low_stock = ProductRepository::new(state.pool())
        .low_stock(LOW_STOCK_THRESHOLD)
        .await?;

    Ok(Json(Dashboard {
        orders,
        customer_count,
        low_stock,
    }))
}
