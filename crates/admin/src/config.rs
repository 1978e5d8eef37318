//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `ADMIN_BASE_URL` - Public URL for the back-office
//! - `ADMIN_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_TRUST_PROXY_HEADERS` - Key the login rate limit on forwarded
//!   client IP headers (default: false)
//! - `ADMIN_SUPERUSER_EMAILS` - Comma-separated addresses or `*@domain` patterns
//!   that bypass permission checks
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};

use larder_core::env::{self, EnvError};
use larder_core::permission::{PatternError, SuperuserEmails};
use secrecy::SecretString;

const SUPERUSERS_VAR: &str = "ADMIN_SUPERUSER_EMAILS";

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the back-office
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Whether client IP headers from a fronting proxy are believed
    pub trust_proxy_headers: bool,
    /// Addresses that bypass permission checks
    pub superusers: SuperuserEmails,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl AdminConfig {
    /// Load configuration from environment variables, reading `.env` first
    /// if present.
    ///
    /// # Errors
    ///
    /// Returns `EnvError` if a required variable is missing or unparseable,
    /// the session secret is weak, or a superuser pattern is malformed.
    pub fn from_env() -> Result<Self, EnvError> {
        let _ = dotenvy::dotenv();

        let superusers = parse_superusers(env::optional(SUPERUSERS_VAR).as_deref().unwrap_or(""))?;
        if superusers.is_empty() {
            tracing::info!("No superuser patterns configured; role permissions apply to everyone");
        }

        Ok(Self {
            database_url: env::database_url("ADMIN_DATABASE_URL")?,
            host: env::parse_or("ADMIN_HOST", "127.0.0.1")?,
            port: env::parse_or("ADMIN_PORT", "3001")?,
            base_url: env::required("ADMIN_BASE_URL")?,
            session_secret: env::session_secret("ADMIN_SESSION_SECRET")?,
            trust_proxy_headers: env::parse_or("ADMIN_TRUST_PROXY_HEADERS", "false")?,
            superusers,
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

    /// Local configuration for unit tests.
    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self {
            database_url: SecretString::from("postgres://localhost/larder"),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3001,
            base_url: "https://admin.larder.shop".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            trust_proxy_headers: false,
            superusers: SuperuserEmails::none(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }
}

fn parse_superusers(raw: &str) -> Result<SuperuserEmails, EnvError> {
    raw.parse()
        .map_err(|e: PatternError| EnvError::Invalid(SUPERUSERS_VAR.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use larder_core::Email;

    use super::*;

    #[test]
    fn test_superuser_patterns_parse() {
        let superusers = parse_superusers("owner@larder.shop, *@ops.larder.shop").unwrap();
        assert_eq!(superusers.len(), 2);
        assert!(superusers.matches(&Email::parse("night@ops.larder.shop").unwrap()));
    }

    #[test]
    fn test_blank_superusers_is_empty() {
        assert!(parse_superusers("").unwrap().is_empty());
        assert!(parse_superusers(" , ").unwrap().is_empty());
    }

    #[test]
    fn test_bad_superuser_pattern_names_variable() {
        let err = parse_superusers("*@").unwrap_err();
        assert!(err.to_string().contains(SUPERUSERS_VAR));
    }

    #[test]
    fn test_socket_addr() {
        let config = AdminConfig::for_tests();

        assert_eq!(config.socket_addr().port(), 3001);
        assert!(config.is_https());
    }
}
