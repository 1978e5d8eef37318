//! Editorial posts: blog articles, press mentions and job openings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use larder_core::{PostId, PostKind};

use crate::{RepositoryError, write_error};

/// A published or draft post.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Post {
    pub id: PostId,
    pub kind: PostKind,
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub body: String,
    pub published_at: Option<DateTime<Utc>>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when creating or replacing a post.
#[derive(Debug, Clone, Deserialize)]
pub struct PostInput {
    pub kind: PostKind,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub body: String,
    /// Defaults to now when publishing without a date.
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_published: bool,
}

impl PostInput {
    /// Publication timestamp to store.
    #[must_use]
    pub fn effective_published_at(&self) -> Option<DateTime<Utc>> {
        match (self.is_published, self.published_at) {
            (_, Some(at)) => Some(at),
            (true, None) => Some(Utc::now()),
            (false, None) => None,
        }
    }
}

const COLUMNS: &str =
    "id, kind, slug, title, summary, body, published_at, is_published, created_at";

/// Repository for post database operations.
pub struct PostRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PostRepository<'a> {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Published posts of one kind, newest first. Future-dated posts are hidden.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_published(&self, kind: PostKind) -> Result<Vec<Post>, RepositoryError> {
        let rows = sqlx::query_as::<_, Post>(&format!(
            "SELECT {COLUMNS} FROM posts
             WHERE kind = $1 AND is_published AND published_at <= NOW()
             ORDER BY published_at DESC"
        ))
        .bind(kind)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// One published post by kind and slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_published(
        &self,
        kind: PostKind,
        slug: &str,
    ) -> Result<Option<Post>, RepositoryError> {
        let row = sqlx::query_as::<_, Post>(&format!(
            "SELECT {COLUMNS} FROM posts
             WHERE kind = $1 AND slug = $2 AND is_published AND published_at <= NOW()"
        ))
        .bind(kind)
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Every post, optionally of one kind, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self, kind: Option<PostKind>) -> Result<Vec<Post>, RepositoryError> {
        let rows = sqlx::query_as::<_, Post>(&format!(
            "SELECT {COLUMNS} FROM posts
             WHERE $1::post_kind IS NULL OR kind = $1
             ORDER BY created_at DESC"
        ))
        .bind(kind)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Get a post by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: PostId) -> Result<Option<Post>, RepositoryError> {
        let row = sqlx::query_as::<_, Post>(&format!("SELECT {COLUMNS} FROM posts WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row)
    }

    /// Create a post.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken for that kind.
    pub async fn create(&self, input: &PostInput) -> Result<Post, RepositoryError> {
        sqlx::query_as::<_, Post>(&format!(
            "INSERT INTO posts (kind, slug, title, summary, body, published_at, is_published)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        ))
        .bind(input.kind)
        .bind(&input.slug)
        .bind(&input.title)
        .bind(&input.summary)
        .bind(&input.body)
        .bind(input.effective_published_at())
        .bind(input.is_published)
        .fetch_one(self.pool)
        .await
        .map_err(|e| write_error(e, "post"))
    }

    /// Replace a post's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the post doesn't exist.
    /// Returns `RepositoryError::Conflict` if the slug is taken for that kind.
    pub async fn update(&self, id: PostId, input: &PostInput) -> Result<Post, RepositoryError> {
        sqlx::query_as::<_, Post>(&format!(
            "UPDATE posts
             SET kind = $2, slug = $3, title = $4, summary = $5, body = $6,
                 published_at = $7, is_published = $8
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(input.kind)
        .bind(&input.slug)
        .bind(&input.title)
        .bind(&input.summary)
        .bind(&input.body)
        .bind(input.effective_published_at())
        .bind(input.is_published)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| write_error(e, "post"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Unpublish a post.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the post doesn't exist.
    pub async fn unpublish(&self, id: PostId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE posts SET is_published = FALSE WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a post row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the post doesn't exist.
    pub async fn delete(&self, id: PostId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(is_published: bool, published_at: Option<DateTime<Utc>>) -> PostInput {
        PostInput {
            kind: PostKind::Blog,
            slug: "monsoon-pickling".to_owned(),
            title: "Pickling in the monsoon".to_owned(),
            summary: String::new(),
            body: String::new(),
            published_at,
            is_published,
        }
    }

    #[test]
    fn test_publishing_without_date_stamps_now() {
        assert!(input(true, None).effective_published_at().is_some());
        assert!(input(false, None).effective_published_at().is_none());
    }

    #[test]
    fn test_explicit_date_is_kept() {
        let at = Utc::now() - chrono::Duration::days(3);
        assert_eq!(input(false, Some(at)).effective_published_at(), Some(at));
    }
}
