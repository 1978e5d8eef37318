//! Catalog route handlers.
//!
//! Everything here is served from the cached catalog snapshot.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use larder_core::catalog::{ProductQuery, SortOrder};

use crate::error::{AppError, Result};
use crate::services::catalog::{CatalogSnapshot, ComboView, ProductView};
use crate::state::AppState;

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListingParams {
    /// Category slug or ID.
    pub category: Option<String>,
    /// Search text.
    pub q: Option<String>,
    pub sort: Option<String>,
    pub featured: Option<bool>,
}

impl ListingParams {
    /// Resolve the parameters against the catalog.
    fn to_query(&self, catalog: &CatalogSnapshot) -> Result<ProductQuery> {
        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(key) => Some(
                catalog
                    .category(key)
                    .ok_or_else(|| AppError::BadRequest(format!("Unknown category: {key}")))?
                    .id,
            ),
        };

        let sort = match self.sort.as_deref().map(str::trim) {
            None | Some("") => SortOrder::default(),
            Some(s) => s.parse().map_err(AppError::BadRequest)?,
        };

        Ok(ProductQuery {
            category,
            search: self.q.clone(),
            sort,
            featured_only: self.featured.unwrap_or(false),
        })
    }
}

/// List active products.
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Result<Response> {
    let catalog = state.catalog().snapshot().await?;
    let query = params.to_query(&catalog)?;

    let products: Vec<ProductView<'_>> = catalog
        .search_products(&query)
        .into_iter()
        .map(ProductView::from)
        .collect();

    Ok(Json(products).into_response())
}

/// One product by slug.
pub async fn show(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Response> {
    let catalog = state.catalog().snapshot().await?;
    let product = catalog
        .product_by_slug(&slug)
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

    Ok(Json(ProductView::from(product)).into_response())
}

/// List active combos.
pub async fn combos(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Result<Response> {
    let catalog = state.catalog().snapshot().await?;
    let query = params.to_query(&catalog)?;

    let combos: Vec<ComboView<'_>> = catalog
        .search_combos(&query)
        .into_iter()
        .map(ComboView::from)
        .collect();

    Ok(Json(combos).into_response())
}

/// One combo by slug.
pub async fn combo(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Response> {
    let catalog = state.catalog().snapshot().await?;
    let combo = catalog
        .combo_by_slug(&slug)
        .ok_or_else(|| AppError::NotFound("Combo".to_string()))?;

    Ok(Json(ComboView::from(combo)).into_response())
}

/// Active categories in display order.
pub async fn categories(State(state): State<AppState>) -> Result<Response> {
    let catalog = state.catalog().snapshot().await?;
    Ok(Json(&catalog.categories).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::catalog::fixtures::snapshot;

    #[test]
    fn test_blank_params_are_defaults() {
        let params = ListingParams {
            category: Some("  ".to_owned()),
            sort: Some(String::new()),
            ..ListingParams::default()
        };
        let query = params.to_query(&snapshot()).unwrap();
        assert_eq!(query, ProductQuery::default());
    }

    #[test]
    fn test_category_slug_resolves_to_id() {
        let params = ListingParams {
            category: Some("pickles".to_owned()),
            sort: Some("price_asc".to_owned()),
            featured: Some(true),
            ..ListingParams::default()
        };
        let query = params.to_query(&snapshot()).unwrap();
        assert_eq!(query.category.map(|c| c.as_i32()), Some(1));
        assert_eq!(query.sort, SortOrder::PriceAsc);
        assert!(query.featured_only);
    }

    #[test]
    fn test_unknown_category_and_sort_rejected() {
        let catalog = snapshot();
        let unknown_category = ListingParams {
            category: Some("chutneys".to_owned()),
            ..ListingParams::default()
        };
        assert!(matches!(
            unknown_category.to_query(&catalog),
            Err(AppError::BadRequest(msg)) if msg.contains("chutneys")
        ));

        let bad_sort = ListingParams {
            sort: Some("cheapest".to_owned()),
            ..ListingParams::default()
        };
        assert!(matches!(
            bad_sort.to_query(&catalog),
            Err(AppError::BadRequest(_))
        ));
    }
}
