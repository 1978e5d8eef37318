//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use larder_core::env::{self, EnvError};
use sqlx::PgPool;

/// Connect to `DATABASE_URL` (loading `.env` first) with the same pool
/// settings as the servers.
///
/// # Errors
///
/// Returns `ConnectError` if the variable is unset or the connection fails.
pub async fn connect() -> Result<PgPool, ConnectError> {
    dotenvy::dotenv().ok();
    let url = env::database_url("DATABASE_URL")?;

    tracing::info!("Connecting to database...");
    Ok(larder_db::create_pool(&url).await?)
}

/// Errors from [`connect`].
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error(transparent)]
    Env(#[from] EnvError),
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}
