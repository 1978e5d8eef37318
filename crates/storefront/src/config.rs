//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `STOREFRONT_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_TRUST_PROXY_HEADERS` - Key rate limits on `CF-Connecting-IP`,
//!   `X-Real-IP` and `X-Forwarded-For` (default: false). Only enable behind a
//!   proxy that overwrites them.
//! - `CATALOG_CACHE_TTL_SECS` - How long the in-memory catalog is reused (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use larder_core::env::{self, EnvError};
use secrecy::SecretString;

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Whether client IP headers from a fronting proxy are believed
    pub trust_proxy_headers: bool,
    /// Catalog cache time-to-live
    pub catalog_cache_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables, reading `.env` first
    /// if present.
    ///
    /// # Errors
    ///
    /// Returns `EnvError` if a required variable is missing or unparseable,
    /// or the session secret fails the strength checks.
    pub fn from_env() -> Result<Self, EnvError> {
        let _ = dotenvy::dotenv();

        let ttl_secs: u64 = env::parse_or("CATALOG_CACHE_TTL_SECS", "300")?;

        Ok(Self {
            database_url: env::database_url("STOREFRONT_DATABASE_URL")?,
            host: env::parse_or("STOREFRONT_HOST", "127.0.0.1")?,
            port: env::parse_or("STOREFRONT_PORT", "3000")?,
            base_url: env::required("STOREFRONT_BASE_URL")?,
            session_secret: env::session_secret("STOREFRONT_SESSION_SECRET")?,
            trust_proxy_headers: env::parse_or("STOREFRONT_TRUST_PROXY_HEADERS", "false")?,
            catalog_cache_ttl: Duration::from_secs(ttl_secs),
            sentry_dsn: env::optional("SENTRY_DSN"),
            sentry_environment: env::optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env::parse_or("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: env::parse_or("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/larder"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: base_url.to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            trust_proxy_headers: false,
            catalog_cache_ttl: Duration::from_secs(300),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_socket_addr_and_https() {
        let config = config("http://localhost:3000");
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert!(!config.is_https());
        assert!(self::config("https://larder.shop").is_https());
    }
}
