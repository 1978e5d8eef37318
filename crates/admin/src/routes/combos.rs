//! Combo (bundle) management.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use larder_core::ComboId;
use larder_core::permission::{AdminModule, PermissionLevel};
use larder_db::{Combo, ComboInput, ComboRepository};

use super::DeleteParams;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

const MODULE: AdminModule = AdminModule::Combos;

/// Every combo with its components.
pub async fn index(State(state): State<AppState>, admin: RequireAdmin) -> Result<Json<Vec<Combo>>> {
    admin.require(state.gate(), MODULE, PermissionLevel::View)?;
    Ok(Json(ComboRepository::new(state.pool()).list_all().await?))
}

/// One combo.
pub async fn show(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<ComboId>,
) -> Result<Json<Combo>> {
    admin.require(state.gate(), MODULE, PermissionLevel::View)?;
    ComboRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Combo".to_string()))
}

/// Create a combo from existing products.
#[instrument(skip_all, fields(admin_id = %admin.0.id))]
pub async fn create(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Json(input): Json<ComboInput>,
) -> Result<(StatusCode, Json<Combo>)> {
    admin.require(state.gate(), MODULE, PermissionLevel::Full)?;
    input.validate().map_err(AppError::BadRequest)?;

    let combo = ComboRepository::new(state.pool()).create(&input).await?;
    tracing::info!(combo_id = %combo.id, slug = %combo.slug, "Combo created");
    Ok((StatusCode::CREATED, Json(combo)))
}

/// Replace a combo and its components.
#[instrument(skip_all, fields(admin_id = %admin.0.id, combo_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<ComboId>,
    Json(input): Json<ComboInput>,
) -> Result<Json<Combo>> {
    admin.require(state.gate(), MODULE, PermissionLevel::Limited)?;
    input.validate().map_err(AppError::BadRequest)?;

    Ok(Json(ComboRepository::new(state.pool()).update(id, &input).await?))
}

/// Deactivate a combo, or remove it with `?hard=true`.
#[instrument(skip_all, fields(admin_id = %admin.0.id, combo_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<ComboId>,
    Query(params): Query<DeleteParams>,
) -> Result<StatusCode> {
    admin.require(state.gate(), MODULE, PermissionLevel::Full)?;

    let combos = ComboRepository::new(state.pool());
    if params.hard {
        combos.delete(id).await?;
    } else {
        combos.deactivate(id).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}
