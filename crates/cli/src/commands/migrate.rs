//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! larder migrate
//! ```
//!
//! Applies every pending migration embedded in `larder-db`. Already-applied
//! migrations are skipped, so running it twice is harmless.

use thiserror::Error;

use super::{ConnectError, connect};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Could not reach the database.
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// A migration failed to apply.
    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending migrations.
///
/// # Errors
///
/// Fails if the database is unreachable or a migration does not apply.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    let known = larder_db::MIGRATOR.iter().count();
    tracing::info!(migrations = known, "Running migrations...");
    larder_db::MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
