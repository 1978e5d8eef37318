//! Editable page content stored as `(page, section) -> text`.

use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::PgPool;

use crate::RepositoryError;

/// A page key with its number of sections.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ContentPageSummary {
    pub page: String,
    pub sections: i64,
}

/// Repository for content page operations.
pub struct ContentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContentRepository<'a> {
    /// Create a new content repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every page key and how many sections it has.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_pages(&self) -> Result<Vec<ContentPageSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, ContentPageSummary>(
            "SELECT page, COUNT(*) AS sections FROM content_pages GROUP BY page ORDER BY page",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// All sections of a page. Unknown pages yield an empty map.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn page(&self, page: &str) -> Result<BTreeMap<String, String>, RepositoryError> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT section, value FROM content_pages WHERE page = $1")
                .bind(page)
                .fetch_all(self.pool)
                .await?;

        Ok(rows.into_iter().collect())
    }

    /// Create or replace one section of a page.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the write fails.
    pub async fn upsert(&self, page: &str, section: &str, value: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO content_pages (page, section, value)
             VALUES ($1, $2, $3)
             ON CONFLICT (page, section)
             DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
        )
        .bind(page)
        .bind(section)
        .bind(value)
        .execute(self.pool)
        .await?;

        tracing::info!(page, section, "Content section saved");
        Ok(())
    }
}
