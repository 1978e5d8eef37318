//! Category management.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use larder_core::CategoryId;
use larder_core::permission::{AdminModule, PermissionLevel};
use larder_db::{Category, CategoryInput, CategoryRepository};

use super::DeleteParams;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

const MODULE: AdminModule = AdminModule::Categories;

fn validate(input: &CategoryInput) -> Result<()> {
    if input.slug.trim().is_empty() || input.name.trim().is_empty() {
        return Err(AppError::BadRequest("slug and name are required".to_string()));
    }
    Ok(())
}

/// Every category, in display order.
pub async fn index(
    State(state): State<AppState>,
    admin: RequireAdmin,
) -> Result<Json<Vec<Category>>> {
    admin.require(state.gate(), MODULE, PermissionLevel::View)?;
    Ok(Json(CategoryRepository::new(state.pool()).list_all().await?))
}

/// One category.
pub async fn show(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Result<Json<Category>> {
    admin.require(state.gate(), MODULE, PermissionLevel::View)?;
    CategoryRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Category".to_string()))
}

/// Create a category.
#[instrument(skip_all, fields(admin_id = %admin.0.id))]
pub async fn create(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<Category>)> {
    admin.require(state.gate(), MODULE, PermissionLevel::Full)?;
    validate(&input)?;

    let category = CategoryRepository::new(state.pool()).create(&input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Rename, reorder or toggle a category.
#[instrument(skip_all, fields(admin_id = %admin.0.id, category_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<CategoryId>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<Category>> {
    admin.require(state.gate(), MODULE, PermissionLevel::Limited)?;
    validate(&input)?;

    Ok(Json(
        CategoryRepository::new(state.pool())
            .update(id, &input)
            .await?,
    ))
}

/// Deactivate a category, or remove it with `?hard=true`.
///
/// Hard-deleting leaves its products uncategorised.
#[instrument(skip_all, fields(admin_id = %admin.0.id, category_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<CategoryId>,
    Query(params): Query<DeleteParams>,
) -> Result<StatusCode> {
    admin.require(state.gate(), MODULE, PermissionLevel::Full)?;

    let categories = CategoryRepository::new(state.pool());
    if params.hard {
        categories.delete(id).await?;
    } else {
        categories.deactivate(id).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}
