//! Customer authentication.
//!
//! Email and password accounts, hashed with Argon2id.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use larder_core::Email;
use larder_db::{Customer, CustomerRepository, RepositoryError};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Upper bound to keep hashing cost predictable.
const MAX_PASSWORD_LENGTH: usize = 256;

/// Details collected at sign-up.
#[derive(Debug)]
pub struct Registration<'r> {
    pub email: &'r str,
    pub password: &'r str,
    pub name: &'r str,
    pub phone: Option<&'r str>,
}

/// Authentication service.
pub struct AuthService<'a> {
    customers: CustomerRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            customers: CustomerRepository::new(pool),
        }
    }

    /// Create a customer account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    #[tracing::instrument(skip_all)]
    pub async fn register(&self, registration: &Registration<'_>) -> Result<Customer, AuthError> {
        let email = Email::parse(registration.email)?;
        validate_password(registration.password)?;

        let name = registration.name.trim();
        let phone = registration
            .phone
            .map(str::trim)
            .filter(|p| !p.is_empty());

        let password_hash = hash_password(registration.password)?;

        let customer = self
            .customers
            .create(&email, name, phone, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(customer_id = %customer.id, "Customer registered");
        Ok(customer)
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[tracing::instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<Customer, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (customer, password_hash) = self
            .customers
            .get_with_password(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(customer)
    }
}

/// Check a new password against the length rules.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` describing the first failed rule.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at most {MAX_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_short_password_rejected() {
        assert!(matches!(
            validate_password("pickle"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("pickle-jar").is_ok());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // Seven multi-byte characters are still too short.
        assert!(validate_password("आमआमआमआ").is_err());
    }

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("mango-chutney").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("mango-chutney", &hash).is_ok());
        assert!(matches!(
            verify_password("lime-chutney", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("anything", "not-a-hash"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
