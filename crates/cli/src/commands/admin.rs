//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! larder admin create -e owner@larder.shop -n "Shop Owner" -r super_admin -p '...'
//! LARDER_ADMIN_PASSWORD='...' larder admin create -e ops@larder.shop -n Ops -r viewer
//! larder admin list
//! ```
//!
//! Accounts created here use their role's default permission levels. Per-module
//! overrides are edited from the back-office.

use larder_admin::services::auth::{AdminAuthError, AdminAuthService};
use larder_core::AdminRole;
use larder_db::{AdminUserRepository, RepositoryError};
use thiserror::Error;

use super::{ConnectError, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Could not reach the database.
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: super_admin, admin, viewer")]
    InvalidRole(String),

    /// Account creation was rejected.
    #[error("{0}")]
    Auth(#[from] AdminAuthError),

    /// Listing failed.
    #[error("{0}")]
    Repository(#[from] RepositoryError),
}

/// Create a new admin user.
///
/// # Errors
///
/// Fails on an unknown role, a malformed email, a weak password or an email
/// that already has an account.
pub async fn create_user(
    email: &str,
    name: &str,
    role: &str,
    password: &str,
) -> Result<(), AdminError> {
    let role: AdminRole = role
        .parse()
        .map_err(|_| AdminError::InvalidRole(role.to_owned()))?;

    let pool = connect().await?;

    tracing::info!("Creating admin user: {} ({})", email, role);
    let user = AdminAuthService::new(&pool)
        .create(email, name, role, password)
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );
    Ok(())
}

/// Print every admin account.
///
/// # Errors
///
/// Fails if the database is unreachable.
pub async fn list_users() -> Result<(), AdminError> {
    let pool = connect().await?;

    let users = AdminUserRepository::new(&pool).list_all().await?;
    if users.is_empty() {
        tracing::info!("No admin users yet. Create one with `larder admin create`.");
        return Ok(());
    }

    for user in &users {
        let status = if user.is_active { "active" } else { "disabled" };
        tracing::info!(
            "{:>4}  {:<32} {:<12} {:<8} {}",
            user.id,
            user.email,
            user.role,
            status,
            user.name
        );
    }
    tracing::info!("{} admin user(s)", users.len());
    Ok(())
}
