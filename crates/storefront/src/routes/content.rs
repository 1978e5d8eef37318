//! Editable storefront content: hero, content pages, banners and posts.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use larder_core::PostKind;
use larder_db::{Banner, BannerRepository, ContentRepository, Post, PostRepository};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Content page that configures the home page hero.
const HERO_PAGE: &str = "hero";

/// Banner filter.
#[derive(Debug, Deserialize)]
pub struct BannerParams {
    pub placement: Option<String>,
}

/// Hero section settings as key/value pairs.
pub async fn hero_config(State(state): State<AppState>) -> Result<Json<BTreeMap<String, String>>> {
    let sections = ContentRepository::new(state.pool()).page(HERO_PAGE).await?;
    Ok(Json(sections))
}

/// All sections of one content page.
pub async fn page(
    State(state): State<AppState>,
    Path(page): Path<String>,
) -> Result<Json<BTreeMap<String, String>>> {
    let sections = ContentRepository::new(state.pool()).page(&page).await?;
    if sections.is_empty() {
        return Err(AppError::NotFound("Page".to_string()));
    }
    Ok(Json(sections))
}

/// Active banners, optionally for one placement.
pub async fn banners(
    State(state): State<AppState>,
    Query(params): Query<BannerParams>,
) -> Result<Json<Vec<Banner>>> {
    let placement = params.placement.as_deref().map(str::trim).filter(|p| !p.is_empty());
    let banners = BannerRepository::new(state.pool())
        .list_active(placement)
        .await?;
    Ok(Json(banners))
}

async fn published(state: &AppState, kind: PostKind) -> Result<Json<Vec<Post>>> {
    let posts = PostRepository::new(state.pool())
        .list_published(kind)
        .await?;
    Ok(Json(posts))
}

/// Open positions.
pub async fn careers(State(state): State<AppState>) -> Result<Json<Vec<Post>>> {
    published(&state, PostKind::Careers).await
}

/// Press mentions.
pub async fn press(State(state): State<AppState>) -> Result<Json<Vec<Post>>> {
    published(&state, PostKind::Press).await
}

/// Blog articles.
pub async fn blog(State(state): State<AppState>) -> Result<Json<Vec<Post>>> {
    published(&state, PostKind::Blog).await
}

/// One blog article.
pub async fn blog_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Post>> {
    PostRepository::new(state.pool())
        .get_published(PostKind::Blog, &slug)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Post".to_string()))
}
