//! Combo (product bundle) repository.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use larder_core::catalog::{CatalogEntry, bundle_stock};
use larder_core::{CategoryId, ComboId, Pricing, ProductId};

use crate::{RepositoryError, to_i32, to_u32, write_error};

// =============================================================================
// Models
// =============================================================================

/// One bundled product inside a combo.
#[derive(Debug, Clone, Serialize)]
pub struct ComboComponent {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    #[serde(skip)]
    pub stock: u32,
    #[serde(skip)]
    pub is_active: bool,
}

/// A bundle of products sold at an aggregate price.
#[derive(Debug, Clone, Serialize)]
pub struct Combo {
    pub id: ComboId,
    pub slug: String,
    pub name: String,
    pub description: String,
    /// Bundle price.
    pub price: Decimal,
    /// Sum of the bundled products' list prices.
    pub original_price: Decimal,
    pub is_active: bool,
    pub is_featured: bool,
    pub image_url: Option<String>,
    pub items: Vec<ComboComponent>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Combo {
    /// Original price as list price, bundle price as the offer.
    #[must_use]
    pub const fn pricing(&self) -> Pricing {
        Pricing::new(self.original_price, Some(self.price))
    }

    /// Bundles that can be assembled from current product stock.
    #[must_use]
    pub fn stock(&self) -> u32 {
        bundle_stock(self.items.iter().map(|item| {
            let stock = if item.is_active { item.stock } else { 0 };
            (stock, item.quantity)
        }))
    }

    /// Units a shopper can buy right now.
    #[must_use]
    pub fn available(&self) -> u32 {
        if self.is_active { self.stock() } else { 0 }
    }
}

impl CatalogEntry for Combo {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn category_id(&self) -> Option<CategoryId> {
        None
    }

    fn category_name(&self) -> Option<&str> {
        None
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

/// A bundled product in a [`ComboInput`].
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ComboItemInput {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Fields accepted when creating or replacing a combo.
#[derive(Debug, Clone, Deserialize)]
pub struct ComboInput {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    pub image_url: Option<String>,
    pub items: Vec<ComboItemInput>,
}

const fn default_true() -> bool {
    true
}

impl ComboInput {
    /// Check the bundle is well formed.
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
        if self.items.is_empty() {
            return Err("a combo needs at least one product".to_owned());
        }
        if self.items.iter().any(|item| item.quantity == 0) {
            return Err("bundled quantities must be positive".to_owned());
        }
        let mut seen: Vec<ProductId> = self.items.iter().map(|i| i.product_id).collect();
        seen.sort_unstable();
        seen.dedup();
        if seen.len() != self.items.len() {
            return Err("a product can only appear once per combo".to_owned());
        }
        Ok(())
    }
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ComboRow {
    id: ComboId,
    slug: String,
    name: String,
    description: String,
    price: Decimal,
    is_active: bool,
    is_featured: bool,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ComponentRow {
    combo_id: ComboId,
    product_id: ProductId,
    name: String,
    quantity: i32,
    price: Decimal,
    stock: i32,
    is_active: bool,
}

impl TryFrom<ComponentRow> for ComboComponent {
    type Error = RepositoryError;

    fn try_from(row: ComponentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            product_id: row.product_id,
            name: row.name,
            quantity: to_u32(row.quantity, "combo quantity")?,
            unit_price: row.price,
            stock: to_u32(row.stock, "stock")?,
            is_active: row.is_active,
        })
    }
}

fn assemble(row: ComboRow, items: Vec<ComboComponent>) -> Combo {
    let original_price = items
        .iter()
        .map(|item| item.unit_price * Decimal::from(item.quantity))
        .sum();

    Combo {
        id: row.id,
        slug: row.slug,
        name: row.name,
        description: row.description,
        price: row.price,
        original_price,
        is_active: row.is_active,
        is_featured: row.is_featured,
        image_url: row.image_url,
        items,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

const COLUMNS: &str =
    "id, slug, name, description, price, is_active, is_featured, image_url, created_at, updated_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for combo database operations.
pub struct ComboRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ComboRepository<'a> {
    /// Create a new combo repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    async fn with_items(&self, rows: Vec<ComboRow>) -> Result<Vec<Combo>, RepositoryError> {
        let ids: Vec<i32> = rows.iter().map(|r| r.id.as_i32()).collect();

        let components = sqlx::query_as::<_, ComponentRow>(
            "SELECT ci.combo_id, ci.product_id, p.name, ci.quantity, p.price, p.stock, p.is_active
             FROM combo_items ci
             JOIN products p ON p.id = ci.product_id
             WHERE ci.combo_id = ANY($1)
             ORDER BY p.name",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_combo: HashMap<ComboId, Vec<ComboComponent>> = HashMap::new();
        for row in components {
            by_combo
                .entry(row.combo_id)
                .or_default()
                .push(row.try_into()?);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let items = by_combo.remove(&row.id).unwrap_or_default();
                assemble(row, items)
            })
            .collect())
    }

    /// Active combos, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a row is invalid.
    pub async fn list_active(&self) -> Result<Vec<Combo>, RepositoryError> {
        let rows = sqlx::query_as::<_, ComboRow>(&format!(
            "SELECT {COLUMNS} FROM combos WHERE is_active ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        self.with_items(rows).await
    }

    /// Every combo, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a row is invalid.
    pub async fn list_all(&self) -> Result<Vec<Combo>, RepositoryError> {
        let rows = sqlx::query_as::<_, ComboRow>(&format!(
            "SELECT {COLUMNS} FROM combos ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        self.with_items(rows).await
    }

    /// Get a combo by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a row is invalid.
    pub async fn get(&self, id: ComboId) -> Result<Option<Combo>, RepositoryError> {
        let rows = sqlx::query_as::<_, ComboRow>(&format!(
            "SELECT {COLUMNS} FROM combos WHERE id = $1"
        ))
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(self.with_items(rows).await?.into_iter().next())
    }

    /// Get an active combo by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a row is invalid.
    pub async fn get_active_by_slug(&self, slug: &str) -> Result<Option<Combo>, RepositoryError> {
        let rows = sqlx::query_as::<_, ComboRow>(&format!(
            "SELECT {COLUMNS} FROM combos WHERE slug = $1 AND is_active"
        ))
        .bind(slug)
        .fetch_all(self.pool)
        .await?;

        Ok(self.with_items(rows).await?.into_iter().next())
    }

    /// Create a combo and its bundled items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken or a bundled
    /// product doesn't exist.
    pub async fn create(&self, input: &ComboInput) -> Result<Combo, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id: ComboId = sqlx::query_scalar(
            "INSERT INTO combos (slug, name, description, price, is_active, is_featured, image_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id",
        )
        .bind(&input.slug)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.is_active)
        .bind(input.is_featured)
        .bind(&input.image_url)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| write_error(e, "combo"))?;

        insert_items(&mut tx, id, &input.items).await?;
        tx.commit().await?;

        tracing::info!(combo_id = %id, slug = %input.slug, "Combo created");

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Replace a combo's fields and bundled items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the combo doesn't exist.
    /// Returns `RepositoryError::Conflict` on slug or product violations.
    pub async fn update(&self, id: ComboId, input: &ComboInput) -> Result<Combo, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE combos
             SET slug = $2, name = $3, description = $4, price = $5, is_active = $6,
                 is_featured = $7, image_url = $8, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(&input.slug)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.is_active)
        .bind(input.is_featured)
        .bind(&input.image_url)
        .execute(&mut *tx)
        .await
        .map_err(|e| write_error(e, "combo"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("DELETE FROM combo_items WHERE combo_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_items(&mut tx, id, &input.items).await?;
        tx.commit().await?;

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Hide a combo from the storefront.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the combo doesn't exist.
    pub async fn deactivate(&self, id: ComboId) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE combos SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a combo row and its bundled items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the combo doesn't exist.
    pub async fn delete(&self, id: ComboId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM combos WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| write_error(e, "combo"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

async fn insert_items(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    combo_id: ComboId,
    items: &[ComboItemInput],
) -> Result<(), RepositoryError> {
    for item in items {
        sqlx::query("INSERT INTO combo_items (combo_id, product_id, quantity) VALUES ($1, $2, $3)")
            .bind(combo_id)
            .bind(item.product_id)
            .bind(to_i32(item.quantity, "quantity")?)
            .execute(&mut **tx)
            .await
            .map_err(|e| write_error(e, "combo item"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(product: i32, quantity: u32, price: i64, stock: u32) -> ComboComponent {
        ComboComponent {
            product_id: ProductId::new(product),
            name: format!("product {product}"),
            quantity,
            unit_price: Decimal::from(price),
            stock,
            is_active: true,
        }
    }

    fn row() -> ComboRow {
        ComboRow {
            id: ComboId::new(1),
            slug: "breakfast".to_owned(),
            name: "Breakfast Box".to_owned(),
            description: String::new(),
            price: Decimal::from(500),
            is_active: true,
            is_featured: false,
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_original_price_sums_bundled_list_prices() {
        let combo = assemble(row(), vec![component(1, 2, 150, 10), component(2, 1, 300, 10)]);
        assert_eq!(combo.original_price, Decimal::from(600));
        assert_eq!(combo.pricing().effective(), Decimal::from(500));
        assert_eq!(combo.pricing().discount_percent(), Some(17));
    }

    #[test]
    fn test_stock_follows_scarcest_component() {
        let combo = assemble(row(), vec![component(1, 2, 150, 9), component(2, 1, 300, 10)]);
        assert_eq!(combo.stock(), 4);

        let mut inactive = combo.clone();
        if let Some(item) = inactive.items.first_mut() {
            item.is_active = false;
        }
        assert_eq!(inactive.stock(), 0);

        let mut hidden = combo;
        hidden.is_active = false;
        assert_eq!(hidden.available(), 0);
    }

    #[test]
    fn test_validate_rejects_duplicate_products() {
        let input = ComboInput {
            slug: "dup".to_owned(),
            name: "Dup".to_owned(),
            description: String::new(),
            price: Decimal::from(10),
            is_active: true,
            is_featured: false,
            image_url: None,
            items: vec![
                ComboItemInput {
                    product_id: ProductId::new(1),
                    quantity: 1,
                },
                ComboItemInput {
                    product_id: ProductId::new(1),
                    quantity: 2,
                },
            ],
        };
        assert!(input.validate().is_err());
    }
}
