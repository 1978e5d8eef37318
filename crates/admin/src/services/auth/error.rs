//! Admin authentication error types.

use thiserror::Error;

use larder_db::RepositoryError;

/// Errors that can occur during admin authentication operations.
#[derive(Debug, Error)]
pub enum AdminAuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] larder_core::EmailError),

    /// Unknown email or wrong password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The account exists but has been switched off.
    #[error("admin account is disabled")]
    Disabled,

    /// Admin user already exists.
    #[error("admin user already exists")]
    UserAlreadyExists,

    /// Password doesn't meet requirements.
    #[error("{0}")]
    WeakPassword(String),

    /// Hashing failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
