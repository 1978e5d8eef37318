//! Editable page content.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::instrument;

use larder_core::permission::{AdminModule, PermissionLevel};
use larder_db::{ContentPageSummary, ContentRepository};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

const MODULE: AdminModule = AdminModule::Content;

/// Section update body.
#[derive(Debug, Deserialize)]
pub struct SectionUpdate {
    pub value: String,
}

/// Page keys with section counts.
pub async fn index(
    State(state): State<AppState>,
    admin: RequireAdmin,
) -> Result<Json<Vec<ContentPageSummary>>> {
    admin.require(state.gate(), MODULE, PermissionLevel::View)?;
    Ok(Json(ContentRepository::new(state.pool()).list_pages().await?))
}

/// All sections of a page. Unknown pages are empty.
pub async fn show(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(page): Path<String>,
) -> Result<Json<BTreeMap<String, String>>> {
    admin.require(state.gate(), MODULE, PermissionLevel::View)?;
    Ok(Json(ContentRepository::new(state.pool()).page(&page).await?))
}

/// Set one section's text, creating it if needed.
#[instrument(skip_all, fields(admin_id = %admin.0.id, page = %page, section = %section))]
pub async fn update(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path((page, section)): Path<(String, String)>,
    Json(body): Json<SectionUpdate>,
) -> Result<Json<BTreeMap<String, String>>> {
    admin.require(state.gate(), MODULE, PermissionLevel::Limited)?;
    if page.trim().is_empty() || section.trim().is_empty() {
        return Err(AppError::BadRequest("page and section are required".to_string()));
    }

    let content = ContentRepository::new(state.pool());
    content.upsert(&page, &section, &body.value).await?;
    tracing::info!("Content section updated");

    Ok(Json(content.page(&page).await?))
}
