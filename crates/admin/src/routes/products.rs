//! Product management.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use larder_core::ProductId;
use larder_core::permission::{AdminModule, PermissionLevel};
use larder_db::{Product, ProductInput, ProductRepository};

use super::DeleteParams;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

const MODULE: AdminModule = AdminModule::Products;

/// Every product, active or not.
pub async fn index(
    State(state): State<AppState>,
    admin: RequireAdmin,
) -> Result<Json<Vec<Product>>> {
    admin.require(state.gate(), MODULE, PermissionLevel::View)?;
    Ok(Json(ProductRepository::new(state.pool()).list_all().await?))
}

/// One product.
pub async fn show(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    admin.require(state.gate(), MODULE, PermissionLevel::View)?;
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
}

/// Create a product.
#[instrument(skip_all, fields(admin_id = %admin.0.id))]
pub async fn create(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    admin.require(state.gate(), MODULE, PermissionLevel::Full)?;
    input.validate().map_err(AppError::BadRequest)?;

    let product = ProductRepository::new(state.pool()).create(&input).await?;
    tracing::info!(product_id = %product.id, slug = %product.slug, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace a product's fields.
#[instrument(skip_all, fields(admin_id = %admin.0.id, product_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<ProductId>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>> {
    admin.require(state.gate(), MODULE, PermissionLevel::Limited)?;
    input.validate().map_err(AppError::BadRequest)?;

    Ok(Json(
        ProductRepository::new(state.pool()).update(id, &input).await?,
    ))
}

/// Deactivate a product, or remove it with `?hard=true`.
#[instrument(skip_all, fields(admin_id = %admin.0.id, product_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<ProductId>,
    Query(params): Query<DeleteParams>,
) -> Result<StatusCode> {
    admin.require(state.gate(), MODULE, PermissionLevel::Full)?;

    let products = ProductRepository::new(state.pool());
    if params.hard {
        products.delete(id).await?;
    } else {
        products.deactivate(id).await?;
    }

    tracing::info!(hard = params.hard, "Product removed");
    Ok(StatusCode::NO_CONTENT)
}
