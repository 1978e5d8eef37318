//! Environment variable helpers shared by the Larder binaries.
//!
//! Each binary builds its own config struct from these. Secrets go through
//! [`session_secret`], which rejects short values, obvious placeholders and
//! low-entropy strings before the server starts.

use std::collections::HashMap;
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

/// Shortest accepted session secret.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Minimum Shannon entropy of a secret, in bits per character.
pub const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Substrings that mark a secret as copied from a template (case-insensitive).
const PLACEHOLDERS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Errors from reading configuration out of the environment.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("Missing environment variable: {0}")]
    Missing(String),
    #[error("Invalid environment variable {0}: {1}")]
    Invalid(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// A variable that must be set.
///
/// # Errors
///
/// Returns `EnvError::Missing` if `key` is unset.
pub fn required(key: &str) -> Result<String, EnvError> {
    std::env::var(key).map_err(|_| EnvError::Missing(key.to_string()))
}

/// A variable that may be unset; empty counts as unset.
#[must_use]
pub fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Parse `key`, falling back to `default` when unset.
///
/// # Errors
///
/// Returns `EnvError::Invalid` if the value (or default) does not parse.
pub fn parse_or<T>(key: &str, default: &str) -> Result<T, EnvError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional(key)
        .as_deref()
        .unwrap_or(default)
        .parse()
        .map_err(|e: T::Err| EnvError::Invalid(key.to_string(), e.to_string()))
}

/// The database URL from `key`, or the shared `DATABASE_URL`.
///
/// # Errors
///
/// Returns `EnvError::Missing` naming `key` if neither is set.
pub fn database_url(key: &str) -> Result<SecretString, EnvError> {
    optional(key)
        .or_else(|| optional("DATABASE_URL"))
        .map(SecretString::from)
        .ok_or_else(|| EnvError::Missing(key.to_string()))
}

/// A session signing secret that passes [`check_secret`].
///
/// # Errors
///
/// Returns `EnvError::Missing` if unset, or `EnvError::InsecureSecret`.
pub fn session_secret(key: &str) -> Result<SecretString, EnvError> {
    let value = required(key)?;
    check_secret(&value, key)?;
    Ok(SecretString::from(value))
}

/// Reject secrets that are short, templated or low-entropy.
///
/// # Errors
///
/// Returns `EnvError::InsecureSecret` describing the first failed check.
pub fn check_secret(value: &str, key: &str) -> Result<(), EnvError> {
    let insecure = |reason: String| Err(EnvError::InsecureSecret(key.to_string(), reason));

    if value.len() < MIN_SECRET_LENGTH {
        return insecure(format!(
            "must be at least {MIN_SECRET_LENGTH} characters (got {})",
            value.len()
        ));
    }

    let lower = value.to_lowercase();
    if let Some(pattern) = PLACEHOLDERS.iter().find(|p| lower.contains(*p)) {
        return insecure(format!("appears to be a placeholder (contains '{pattern}')"));
    }

    let entropy = shannon_entropy(value);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return insecure(format!(
            "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
        ));
    }
    Ok(())
}

/// Shannon entropy in bits per character.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn shannon_entropy(s: &str) -> f64 {
    let mut counts: HashMap<char, usize> = HashMap::new();
    let mut total = 0usize;
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }

    let total = total as f64;
    counts
        .values()
        .map(|&n| {
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_entropy_of_uniform_and_repeated_strings() {
        assert!(shannon_entropy("").abs() < f64::EPSILON);
        assert!(shannon_entropy("zzzzzz").abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("aB3$xY9!mK2@nL5#") > MIN_ENTROPY_BITS_PER_CHAR);
    }

    #[test]
    fn test_short_secret_rejected() {
        assert!(matches!(
            check_secret("aB3$xY9!", "K"),
            Err(EnvError::InsecureSecret(key, _)) if key == "K"
        ));
    }

    #[test]
    fn test_template_secrets_rejected() {
        for value in [
            "your-session-key-goes-here-0123456789",
            "changeme-changeme-changeme-changeme",
            "larder-secret-value-larder-secret-value",
        ] {
            let err = check_secret(value, "K").unwrap_err();
            assert!(err.to_string().contains("placeholder"), "{value}: {err}");
        }
    }

    #[test]
    fn test_low_entropy_secret_rejected() {
        let err = check_secret(&"ab".repeat(20), "K").unwrap_err();
        assert!(err.to_string().contains("entropy"));
    }

    #[test]
    fn test_random_secret_accepted() {
        assert!(check_secret("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%", "K").is_ok());
    }

    #[test]
    fn test_parse_or_uses_default_for_unset_key() {
        let port: u16 = parse_or("LARDER_TEST_SURELY_UNSET_PORT", "3000").unwrap();
        assert_eq!(port, 3000);
        let bad: Result<u16, _> = parse_or("LARDER_TEST_SURELY_UNSET_PORT", "http");
        assert!(matches!(bad, Err(EnvError::Invalid(..))));
    }
}
