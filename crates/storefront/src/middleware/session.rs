//! Session middleware configuration.
//!
//! `PostgreSQL`-backed sessions using tower-sessions. The store table is
//! created by the schema migrations.

use argon2::Argon2;
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "larder_session";

/// Salt for stretching the configured secret into a cookie signing key.
const KEY_SALT: &[u8] = b"larder-storefront-session";

/// Session expiry time in seconds (7 days of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with `PostgreSQL` store.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
    key: Key,
) -> SessionManagerLayer<PostgresStore, SignedCookie> {
    let store = PostgresStore::new(pool.clone());

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_https())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key)
}

/// Derive the 64-byte cookie signing key from the configured session secret.
///
/// # Errors
///
/// Returns an error if Argon2 rejects the input, which only happens for
/// secrets longer than it accepts.
pub fn session_key(secret: &SecretString) -> Result<Key, argon2::Error> {
    let mut material = [0u8; 64];
    Argon2::default().hash_password_into(
        secret.expose_secret().as_bytes(),
        KEY_SALT,
        &mut material,
    )?;
    Ok(Key::from(&material[..]))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key_is_stable_per_secret() {
        let secret = SecretString::from("k3y-Material-for-session-signing-0042");
        let first = session_key(&secret).unwrap();
        let again = session_key(&secret).unwrap();
        let other =
            session_key(&SecretString::from("another-Secret-value-for-cookies-9981")).unwrap();

        assert_eq!(first.signing(), again.signing());
        assert_ne!(first.signing(), other.signing());
    }
}
