//! Customer repository, including the persisted cart.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use sqlx::types::Json;

use larder_core::cart::{Cart, CartLine};
use larder_core::{CustomerId, Email};

use crate::{RepositoryError, write_error};

/// A storefront customer account.
#[derive(Debug, Clone, Serialize)]
pub struct Customer {
    pub id: CustomerId,
    pub email: Email,
    pub name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A customer with order aggregates, for back-office listings.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerSummary {
    #[serde(flatten)]
    pub customer: Customer,
    pub order_count: i64,
    pub total_spent: Decimal,
}

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: CustomerId,
    email: String,
    name: String,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            email,
            name: row.name,
            phone: row.phone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    customer: CustomerRow,
    password_hash: String,
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    #[sqlx(flatten)]
    customer: CustomerRow,
    order_count: i64,
    total_spent: Decimal,
}

const COLUMNS: &str = "id, email, name, phone, created_at, updated_at";

/// Repository for customer database operations.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the row is invalid.
    pub async fn get(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {COLUMNS} FROM customers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a customer and their password hash by email, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the row is invalid.
    pub async fn get_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(Customer, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialRow>(&format!(
            "SELECT {COLUMNS}, password_hash FROM customers WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| Ok((r.customer.try_into()?, r.password_hash)))
            .transpose()
    }

    /// Create a customer account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    pub async fn create(
        &self,
        email: &Email,
        name: &str,
        phone: Option<&str>,
        password_hash: &str,
    ) -> Result<Customer, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "INSERT INTO customers (email, name, phone, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        ))
        .bind(email.as_str())
        .bind(name)
        .bind(phone)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| write_error(e, "account"))?;

        row.try_into()
    }

    /// Load the customer's persisted cart.
    ///
    /// Duplicate or zero-quantity lines in stored data are folded away.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer doesn't exist.
    /// Returns `RepositoryError::DataCorruption` if the stored cart is not a
    /// list of cart lines.
    pub async fn load_cart(&self, id: CustomerId) -> Result<Cart, RepositoryError> {
        let stored: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT cart FROM customers WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        let value = stored.ok_or(RepositoryError::NotFound)?;
        let lines: Vec<CartLine> = serde_json::from_value(value)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid stored cart: {e}")))?;

        Ok(Cart::from(lines))
    }

    /// Replace the customer's persisted cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer doesn't exist.
    pub async fn save_cart(&self, id: CustomerId, cart: &Cart) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE customers SET cart = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(Json(cart.lines()))
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Customers with order aggregates, optionally filtered by a
    /// case-insensitive match on name, email or phone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a row is invalid.
    pub async fn list(
        &self,
        search: Option<&str>,
        limit: i64,
    ) -> Result<Vec<CustomerSummary>, RepositoryError> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"));

        let rows = sqlx::query_as::<_, SummaryRow>(
            "SELECT c.id, c.email, c.name, c.phone, c.created_at, c.updated_at,
                    COUNT(o.id) AS order_count,
                    COALESCE(SUM(o.total) FILTER (WHERE o.status <> 'cancelled'), 0) AS total_spent
             FROM customers c
             LEFT JOIN orders o ON o.customer_id = c.id
             WHERE $1::TEXT IS NULL
                OR c.name ILIKE $1 OR c.email ILIKE $1 OR c.phone ILIKE $1
             GROUP BY c.id
             ORDER BY c.created_at DESC
             LIMIT $2",
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(CustomerSummary {
                    customer: row.customer.try_into()?,
                    order_count: row.order_count,
                    total_spent: row.total_spent,
                })
            })
            .collect()
    }

    /// Total number of customers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
