//! Customer lookup.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use larder_core::CustomerId;
use larder_core::permission::{AdminModule, PermissionLevel};
use larder_db::{
    Address, AddressRepository, Customer, CustomerRepository, CustomerSummary, Order,
    OrderRepository,
};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

const MODULE: AdminModule = AdminModule::Customers;

const LIST_LIMIT: i64 = 200;

/// Search parameters.
#[derive(Debug, Default, Deserialize)]
pub struct CustomerSearch {
    /// Matches name, email or phone.
    pub q: Option<String>,
}

/// A customer with their addresses and orders.
#[derive(Debug, Serialize)]
pub struct CustomerDetail {
    #[serde(flatten)]
    pub customer: Customer,
    pub addresses: Vec<Address>,
    pub orders: Vec<Order>,
}

/// Customers with order counts and spend.
pub async fn index(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Query(search): Query<CustomerSearch>,
) -> Result<Json<Vec<CustomerSummary>>> {
    admin.require(state.gate(), MODULE, PermissionLevel::View)?;
    let customers = CustomerRepository::new(state.pool())
        .list(search.q.as_deref(), LIST_LIMIT)
        .await?;
    Ok(Json(customers))
}

/// One customer.
pub async fn show(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<CustomerId>,
) -> Result<Json<CustomerDetail>> {
    admin.require(state.gate(), MODULE, PermissionLevel::View)?;

    let customer = CustomerRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))?;
    let addresses = AddressRepository::new(state.pool()).list(id).await?;
    let orders = OrderRepository::new(state.pool())
        .list_for_customer(id)
        .await?;

    Ok(Json(CustomerDetail {
        customer,
        addresses,
        orders,
    }))
}
