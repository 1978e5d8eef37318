//! Storefront banner management.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use larder_core::BannerId;
use larder_core::permission::{AdminModule, PermissionLevel};
use larder_db::{Banner, BannerInput, BannerRepository};

use super::DeleteParams;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

const MODULE: AdminModule = AdminModule::Banners;

fn validate(input: &BannerInput) -> Result<()> {
    if input.title.trim().is_empty() || input.image_url.trim().is_empty() {
        return Err(AppError::BadRequest(
            "title and image_url are required".to_string(),
        ));
    }
    if input.placement.trim().is_empty() {
        return Err(AppError::BadRequest("placement cannot be blank".to_string()));
    }
    Ok(())
}

/// Every banner across placements.
pub async fn index(
    State(state): State<AppState>,
    admin: RequireAdmin,
) -> Result<Json<Vec<Banner>>> {
    admin.require(state.gate(), MODULE, PermissionLevel::View)?;
    Ok(Json(BannerRepository::new(state.pool()).list_all().await?))
}

/// One banner.
pub async fn show(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<BannerId>,
) -> Result<Json<Banner>> {
    admin.require(state.gate(), MODULE, PermissionLevel::View)?;
    BannerRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Banner".to_string()))
}

/// Create a banner.
#[instrument(skip_all, fields(admin_id = %admin.0.id))]
pub async fn create(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Json(input): Json<BannerInput>,
) -> Result<(StatusCode, Json<Banner>)> {
    admin.require(state.gate(), MODULE, PermissionLevel::Full)?;
    validate(&input)?;

    let banner = BannerRepository::new(state.pool()).create(&input).await?;
    Ok((StatusCode::CREATED, Json(banner)))
}

/// Replace a banner.
#[instrument(skip_all, fields(admin_id = %admin.0.id, banner_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<BannerId>,
    Json(input): Json<BannerInput>,
) -> Result<Json<Banner>> {
    admin.require(state.gate(), MODULE, PermissionLevel::Limited)?;
    validate(&input)?;

    Ok(Json(BannerRepository::new(state.pool()).update(id, &input).await?))
}

/// Hide a banner, or remove it with `?hard=true`.
#[instrument(skip_all, fields(admin_id = %admin.0.id, banner_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<BannerId>,
    Query(params): Query<DeleteParams>,
) -> Result<StatusCode> {
    admin.require(state.gate(), MODULE, PermissionLevel::Full)?;

    let banners = BannerRepository::new(state.pool());
    if params.hard {
        banners.delete(id).await?;
    } else {
        banners.deactivate(id).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}
