//! `PostgreSQL` access for Larder.
//!
//! Both binaries talk to the same database through the repositories in this
//! crate. Each repository borrows a [`PgPool`] and maps rows into domain
//! models, reporting failures as [`RepositoryError`].
//!
//! # Migrations
//!
//! Migrations live in `crates/db/migrations/` and are run explicitly:
//! ```bash
//! larder migrate
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod addresses;
pub mod admin_users;
pub mod banners;
pub mod categories;
pub mod combos;
pub mod content;
pub mod customers;
pub mod orders;
pub mod posts;
pub mod products;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use addresses::{Address, AddressInput, AddressRepository};
pub use admin_users::{AdminUser, AdminUserRepository};
pub use banners::{Banner, BannerInput, BannerRepository};
pub use categories::{Category, CategoryInput, CategoryRepository};
pub use combos::{Combo, ComboComponent, ComboInput, ComboItemInput, ComboRepository};
pub use content::{ContentPageSummary, ContentRepository};
pub use customers::{Customer, CustomerRepository, CustomerSummary};
pub use orders::{
    DashboardSummary, NewOrder, Order, OrderItem, OrderRepository, TrackingEvent, tracking_steps,
};
pub use posts::{Post, PostInput, PostRepository};
pub use products::{Product, ProductInput, ProductRepository};

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email, insufficient stock).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a write failure, turning constraint violations into `Conflict`.
///
/// `what` names the record for the error message, e.g. `"product"`.
pub(crate) fn write_error(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(format!("{what} already exists"));
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::Conflict(format!("{what} is referenced by other records"));
        }
        if db_err.is_check_violation() {
            return RepositoryError::Conflict(format!("{what} violates a value constraint"));
        }
    }
    RepositoryError::Database(e)
}

/// Convert a non-negative database integer into a count.
pub(crate) fn to_u32(value: i32, field: &str) -> Result<u32, RepositoryError> {
    u32::try_from(value)
        .map_err(|_| RepositoryError::DataCorruption(format!("negative {field}: {value}")))
}

/// Convert a count into a database integer.
pub(crate) fn to_i32(value: u32, field: &str) -> Result<i32, RepositoryError> {
    i32::try_from(value)
        .map_err(|_| RepositoryError::Conflict(format!("{field} out of range: {value}")))
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_counts_are_corruption() {
        assert!(matches!(
            to_u32(-1, "stock"),
            Err(RepositoryError::DataCorruption(_))
        ));
        assert_eq!(to_u32(4, "stock").ok(), Some(4));
    }

    #[test]
    fn test_oversized_counts_are_conflicts() {
        assert!(matches!(
            to_i32(u32::MAX, "quantity"),
            Err(RepositoryError::Conflict(_))
        ));
        assert_eq!(to_i32(12, "quantity").ok(), Some(12));
    }

    #[test]
    fn test_non_database_errors_pass_through() {
        assert!(matches!(
            write_error(sqlx::Error::RowNotFound, "product"),
            RepositoryError::Database(_)
        ));
    }
}
