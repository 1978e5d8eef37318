//! Blog, press and careers posts.
//!
//! Posts are edited under the content module's permissions.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use larder_core::permission::{AdminModule, PermissionLevel};
use larder_core::{PostId, PostKind};
use larder_db::{Post, PostInput, PostRepository};

use super::DeleteParams;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

const MODULE: AdminModule = AdminModule::Content;

/// Listing filter.
#[derive(Debug, Default, Deserialize)]
pub struct PostFilter {
    pub kind: Option<PostKind>,
}

fn validate(input: &PostInput) -> Result<()> {
    if input.slug.trim().is_empty() || input.title.trim().is_empty() {
        return Err(AppError::BadRequest("slug and title are required".to_string()));
    }
    Ok(())
}

/// Posts of every kind, or one kind with `?kind=`, drafts included.
pub async fn index(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Query(filter): Query<PostFilter>,
) -> Result<Json<Vec<Post>>> {
    admin.require(state.gate(), MODULE, PermissionLevel::View)?;
    Ok(Json(
        PostRepository::new(state.pool())
            .list_all(filter.kind)
            .await?,
    ))
}

/// One post.
pub async fn show(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<PostId>,
) -> Result<Json<Post>> {
    admin.require(state.gate(), MODULE, PermissionLevel::View)?;
    PostRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Post".to_string()))
}

/// Create a post.
#[instrument(skip_all, fields(admin_id = %admin.0.id))]
pub async fn create(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Json(input): Json<PostInput>,
) -> Result<(StatusCode, Json<Post>)> {
    admin.require(state.gate(), MODULE, PermissionLevel::Full)?;
    validate(&input)?;

    let post = PostRepository::new(state.pool()).create(&input).await?;
    tracing::info!(post_id = %post.id, published = post.is_published, "Post created");
    Ok((StatusCode::CREATED, Json(post)))
}

/// Replace a post.
#[instrument(skip_all, fields(admin_id = %admin.0.id, post_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<PostId>,
    Json(input): Json<PostInput>,
) -> Result<Json<Post>> {
    admin.require(state.gate(), MODULE, PermissionLevel::Limited)?;
    validate(&input)?;

    Ok(Json(PostRepository::new(state.pool()).update(id, &input).await?))
}

/// Unpublish a post, or remove it with `?hard=true`.
#[instrument(skip_all, fields(admin_id = %admin.0.id, post_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<PostId>,
    Query(params): Query<DeleteParams>,
) -> Result<StatusCode> {
    admin.require(state.gate(), MODULE, PermissionLevel::Full)?;

    let posts = PostRepository::new(state.pool());
    if params.hard {
        posts.delete(id).await?;
    } else {
        posts.unpublish(id).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}
