//! Promotional banner repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use larder_core::BannerId;

use crate::{RepositoryError, write_error};

/// A promotional banner shown in a storefront placement.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Banner {
    pub id: BannerId,
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    /// Where the banner renders, e.g. `home` or `checkout`.
    pub placement: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when creating or replacing a banner.
#[derive(Debug, Clone, Deserialize)]
pub struct BannerInput {
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    #[serde(default = "default_placement")]
    pub placement: String,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_placement() -> String {
    "home".to_owned()
}

const fn default_true() -> bool {
    true
}

const COLUMNS: &str =
    "id, title, subtitle, image_url, link_url, placement, sort_order, is_active, created_at";

/// Repository for banner database operations.
pub struct BannerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BannerRepository<'a> {
    /// Create a new banner repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Active banners in display order, optionally for one placement.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self, placement: Option<&str>) -> Result<Vec<Banner>, RepositoryError> {
        let rows = sqlx::query_as::<_, Banner>(&format!(
            "SELECT {COLUMNS} FROM banners
             WHERE is_active AND ($1::TEXT IS NULL OR placement = $1)
             ORDER BY placement, sort_order, id"
        ))
        .bind(placement)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Every banner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Banner>, RepositoryError> {
        let rows = sqlx::query_as::<_, Banner>(&format!(
            "SELECT {COLUMNS} FROM banners ORDER BY placement, sort_order, id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Get a banner by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: BannerId) -> Result<Option<Banner>, RepositoryError> {
        let row = sqlx::query_as::<_, Banner>(&format!("SELECT {COLUMNS} FROM banners WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row)
    }

    /// Create a banner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &BannerInput) -> Result<Banner, RepositoryError> {
        sqlx::query_as::<_, Banner>(&format!(
            "INSERT INTO banners (title, subtitle, image_url, link_url, placement, sort_order, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        ))
        .bind(&input.title)
        .bind(&input.subtitle)
        .bind(&input.image_url)
        .bind(&input.link_url)
        .bind(&input.placement)
        .bind(input.sort_order)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| write_error(e, "banner"))
    }

    /// Replace a banner's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the banner doesn't exist.
    pub async fn update(&self, id: BannerId, input: &BannerInput) -> Result<Banner, RepositoryError> {
        sqlx::query_as::<_, Banner>(&format!(
            "UPDATE banners
             SET title = $2, subtitle = $3, image_url = $4, link_url = $5, placement = $6,
                 sort_order = $7, is_active = $8
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&input.title)
        .bind(&input.subtitle)
        .bind(&input.image_url)
        .bind(&input.link_url)
        .bind(&input.placement)
        .bind(input.sort_order)
        .bind(input.is_active)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| write_error(e, "banner"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Stop showing a banner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the banner doesn't exist.
    pub async fn deactivate(&self, id: BannerId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE banners SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a banner row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the banner doesn't exist.
    pub async fn delete(&self, id: BannerId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM banners WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
