//! Admin authentication service.
//!
//! Back-office accounts log in with email and password (Argon2id). Accounts
//! are provisioned by a super admin through the API or with `larder admin
//! create`; there is no self sign-up.

mod error;

pub use error::AdminAuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use larder_core::{AdminRole, Email};
use larder_db::{AdminUser, AdminUserRepository, RepositoryError};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Upper bound to keep hashing cost predictable.
const MAX_PASSWORD_LENGTH: usize = 256;

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    users: AdminUserRepository<'a>,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: AdminUserRepository::new(pool),
        }
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidCredentials` if the email/password is wrong.
    /// Returns `AdminAuthError::Disabled` if the account is inactive.
    #[tracing::instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<AdminUser, AdminAuthError> {
        let email = Email::parse(email).map_err(|_| AdminAuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_with_password(&email)
            .await?
            .ok_or(AdminAuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;
        ensure_active(&user)?;

        Ok(user)
    }

    /// Provision a new admin account.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AdminAuthError::WeakPassword` if the password is too short or long.
    /// Returns `AdminAuthError::UserAlreadyExists` if the email is taken.
    #[tracing::instrument(skip_all, fields(role = %role))]
    pub async fn create(
        &self,
        email: &str,
        name: &str,
        role: AdminRole,
        password: &str,
    ) -> Result<AdminUser, AdminAuthError> {
        let email = Email::parse(email)?;
        let password_hash = hash_password(password)?;

        self.users
            .create(&email, name.trim(), role, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AdminAuthError::UserAlreadyExists,
                other => AdminAuthError::Repository(other),
            })
    }
}

/// Validate and hash a new password with Argon2id.
///
/// # Errors
///
/// Returns `AdminAuthError::WeakPassword` if the password length is out of
/// bounds, or `AdminAuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AdminAuthError> {
    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(AdminAuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(AdminAuthError::WeakPassword(format!(
            "password must be at most {MAX_PASSWORD_LENGTH} characters"
        )));
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AdminAuthError::PasswordHash)
}

/// Refuse accounts that have been deactivated from the back-office.
fn ensure_active(user: &AdminUser) -> Result<(), AdminAuthError> {
    if user.is_active {
        Ok(())
    } else {
        tracing::info!(admin_id = %user.id, "Login refused for disabled admin");
        Err(AdminAuthError::Disabled)
    }
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AdminAuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AdminAuthError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AdminAuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use chrono::Utc;
    use larder_core::permission::PermissionMap;
    use larder_core::AdminUserId;

    use super::*;
    use crate::error::AppError;

    fn account(is_active: bool) -> AdminUser {
        AdminUser {
            id: AdminUserId::new(3),
            email: Email::parse("packer@larder.shop").unwrap(),
            name: "Packer".to_string(),
            role: AdminRole::Viewer,
            permissions: PermissionMap::new(),
            is_active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_deactivated_account_is_forbidden_at_login() {
        let err = ensure_active(&account(false)).unwrap_err();
        assert!(matches!(err, AdminAuthError::Disabled));
        assert_eq!(AppError::from(err).status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_active_account_passes() {
        assert!(ensure_active(&account(true)).is_ok());
    }

    #[test]
    fn test_short_password_not_hashed() {
        assert!(matches!(
            hash_password("brine"),
            Err(AdminAuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_hash_verifies_only_the_same_password() {
        let hash = hash_password("warehouse-keys").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("warehouse-keys", &hash).is_ok());
        assert!(matches!(
            verify_password("warehouse-key", &hash),
            Err(AdminAuthError::InvalidCredentials)
        ));
    }
}
