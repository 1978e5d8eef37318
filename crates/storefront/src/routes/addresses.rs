//! Saved shipping addresses.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use larder_core::AddressId;
use larder_db::{Address, AddressInput, AddressRepository};

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// The customer's addresses, default first.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
) -> Result<Json<Vec<Address>>> {
    let addresses = AddressRepository::new(state.pool())
        .list(customer.id)
        .await?;
    Ok(Json(addresses))
}

/// Save a new address.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    Json(input): Json<AddressInput>,
) -> Result<(StatusCode, Json<Address>)> {
    input.validate().map_err(AppError::BadRequest)?;

    let address = AddressRepository::new(state.pool())
        .create(customer.id, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(address)))
}

/// Replace an address.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    Path(id): Path<AddressId>,
    Json(input): Json<AddressInput>,
) -> Result<Json<Address>> {
    input.validate().map_err(AppError::BadRequest)?;

    let address = AddressRepository::new(state.pool())
        .update(customer.id, id, &input)
        .await?;
    Ok(Json(address))
}

/// Delete an address.
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    Path(id): Path<AddressId>,
) -> Result<StatusCode> {
    AddressRepository::new(state.pool())
        .delete(customer.id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
