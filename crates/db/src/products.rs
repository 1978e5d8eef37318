//! Product repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use larder_core::catalog::CatalogEntry;
use larder_core::{CategoryId, Pricing, ProductId};

use crate::{RepositoryError, to_i32, to_u32, write_error};

// =============================================================================
// Models
// =============================================================================

/// A sellable product with its category name resolved.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
    pub price: Decimal,
    pub offer_price: Option<Decimal>,
    pub stock: u32,
    pub is_active: bool,
    pub is_featured: bool,
    pub is_new: bool,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// List and offer price.
    #[must_use]
    pub const fn pricing(&self) -> Pricing {
        Pricing::new(self.price, self.offer_price)
    }

    /// Units a shopper can buy right now.
    #[must_use]
    pub const fn available(&self) -> u32 {
        if self.is_active { self.stock } else { 0 }
    }
}

impl CatalogEntry for Product {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn category_id(&self) -> Option<CategoryId> {
        self.category_id
    }

    fn category_name(&self) -> Option<&str> {
        self.category_name.as_deref()
    }

    fn pricing(&self) -> Pricing {
        Self::pricing(self)
    }

    fn is_featured(&self) -> bool {
        self.is_featured
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Fields accepted when creating or replacing a product.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub price: Decimal,
    pub offer_price: Option<Decimal>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_new: bool,
    pub image_url: Option<String>,
}

const fn default_true() -> bool {
    true
}

impl ProductInput {
    /// Check the value rules the schema also enforces.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first violated rule.
    pub fn validate(&self) -> Result<(), String> {
        if self.slug.trim().is_empty() || self.name.trim().is_empty() {
            return Err("slug and name are required".to_owned());
        }
        if self.price < Decimal::ZERO {
            return Err("price cannot be negative".to_owned());
        }
        if let Some(offer) = self.offer_price {
            if offer < Decimal::ZERO {
                return Err("offer price cannot be negative".to_owned());
            }
            if offer > self.price {
                return Err("offer price cannot exceed price".to_owned());
            }
        }
        Ok(())
    }
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    slug: String,
    name: String,
    description: String,
    category_id: Option<CategoryId>,
    category_name: Option<String>,
    price: Decimal,
    offer_price: Option<Decimal>,
    stock: i32,
    is_active: bool,
    is_featured: bool,
    is_new: bool,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            slug: row.slug,
            name: row.name,
            description: row.description,
            category_id: row.category_id,
            category_name: row.category_name,
            price: row.price,
            offer_price: row.offer_price,
            stock: to_u32(row.stock, "stock")?,
            is_active: row.is_active,
            is_featured: row.is_featured,
            is_new: row.is_new,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT: &str = "
    SELECT p.id, p.slug, p.name, p.description, p.category_id, c.name AS category_name,
           p.price, p.offer_price, p.stock, p.is_active, p.is_featured, p.is_new,
           p.image_url, p.created_at, p.updated_at
    FROM products p
    LEFT JOIN categories c ON c.id = p.category_id";

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Active products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a row is invalid.
    pub async fn list_active(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "{SELECT} WHERE p.is_active ORDER BY p.created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Every product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a row is invalid.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "{SELECT} ORDER BY p.created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the row is invalid.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("{SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get an active product by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the row is invalid.
    pub async fn get_active_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "{SELECT} WHERE p.slug = $1 AND p.is_active"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Active products with stock at or below `threshold`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a row is invalid.
    pub async fn low_stock(&self, threshold: u32) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "{SELECT} WHERE p.is_active AND p.stock <= $1 ORDER BY p.stock, p.name"
        ))
        .bind(to_i32(threshold, "threshold")?)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken, the category
    /// doesn't exist, or a price rule is violated.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let id: ProductId = sqlx::query_scalar(
            "INSERT INTO products
                (slug, name, description, category_id, price, offer_price, stock,
                 is_active, is_featured, is_new, image_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING id",
        )
        .bind(&input.slug)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.category_id)
        .bind(input.price)
        .bind(input.offer_price)
        .bind(to_i32(input.stock, "stock")?)
        .bind(input.is_active)
        .bind(input.is_featured)
        .bind(input.is_new)
        .bind(&input.image_url)
        .fetch_one(self.pool)
        .await
        .map_err(|e| write_error(e, "product"))?;

        tracing::info!(product_id = %id, slug = %input.slug, "Product created");

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` on slug, category or price violations.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let result = sqlx::query(
            "UPDATE products
             SET slug = $2, name = $3, description = $4, category_id = $5, price = $6,
                 offer_price = $7, stock = $8, is_active = $9, is_featured = $10,
                 is_new = $11, image_url = $12, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(&input.slug)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.category_id)
        .bind(input.price)
        .bind(input.offer_price)
        .bind(to_i32(input.stock, "stock")?)
        .bind(input.is_active)
        .bind(input.is_featured)
        .bind(input.is_new)
        .bind(&input.image_url)
        .execute(self.pool)
        .await
        .map_err(|e| write_error(e, "product"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Hide a product from the storefront.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn deactivate(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE products SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a product row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` if a combo still bundles it.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| write_error(e, "product"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(price: i64, offer: Option<i64>) -> ProductInput {
        ProductInput {
            slug: "mango-pickle".to_owned(),
            name: "Mango Pickle".to_owned(),
            description: String::new(),
            category_id: None,
            price: Decimal::from(price),
            offer_price: offer.map(Decimal::from),
            stock: 3,
            is_active: true,
            is_featured: false,
            is_new: false,
            image_url: None,
        }
    }

    #[test]
    fn test_validate_price_rules() {
        assert!(input(300, Some(250)).validate().is_ok());
        assert!(input(300, Some(300)).validate().is_ok());
        assert!(input(300, None).validate().is_ok());
        assert!(input(300, Some(301)).validate().is_err());
        assert!(input(-1, None).validate().is_err());
        assert!(input(300, Some(-5)).validate().is_err());
    }

    #[test]
    fn test_validate_requires_slug_and_name() {
        let mut missing = input(300, None);
        missing.name = "  ".to_owned();
        assert!(missing.validate().is_err());
    }

    #[test]
    fn test_row_with_negative_stock_is_rejected() {
        let row = ProductRow {
            id: ProductId::new(1),
            slug: "x".to_owned(),
            name: "X".to_owned(),
            description: String::new(),
            category_id: None,
            category_name: None,
            price: Decimal::ONE,
            offer_price: None,
            stock: -2,
            is_active: true,
            is_featured: false,
            is_new: false,
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(matches!(
            Product::try_from(row),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
