//! Canonical email addresses.
//!
//! Customer and admin accounts are keyed by email, and superuser patterns
//! match against the domain, so every address is trimmed and lowercased
//! once at the boundary and compared in that form everywhere else.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Why a string was rejected as an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    #[error("email must contain an @ symbol")]
    MissingAtSymbol,
    #[error("email local part cannot be empty")]
    EmptyLocalPart,
    #[error("email domain cannot be empty")]
    EmptyDomain,
    /// More than one @, or whitespace inside the address.
    #[error("email contains invalid characters")]
    InvalidCharacters,
}

/// A trimmed, lowercased address with exactly one `@` and non-empty parts.
///
/// ```
/// use larder_core::Email;
///
/// let email = Email::parse(" Owner@Larder.Shop ").unwrap();
/// assert_eq!(email.as_str(), "owner@larder.shop");
/// assert_eq!(email.domain(), "larder.shop");
///
/// assert!(Email::parse("no-at-symbol").is_err());
/// assert!(Email::parse("two@at@signs").is_err());
/// ```
///
/// Deserializing runs the same checks, so request bodies can take an
/// `Email` field directly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LENGTH: usize = 254;

    /// Validate and normalize an address.
    ///
    /// # Errors
    ///
    /// Returns the first [`EmailError`] the trimmed input fails.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let s = input.trim();
        match s.len() {
            0 => return Err(EmailError::Empty),
            n if n > Self::MAX_LENGTH => {
                return Err(EmailError::TooLong {
                    max: Self::MAX_LENGTH,
                });
            }
            _ => {}
        }
        if s.chars().any(char::is_whitespace) || s.matches('@').nth(1).is_some() {
            return Err(EmailError::InvalidCharacters);
        }

        match s.split_once('@') {
            None => Err(EmailError::MissingAtSymbol),
            Some(("", _)) => Err(EmailError::EmptyLocalPart),
            Some((_, "")) => Err(EmailError::EmptyDomain),
            Some(_) => Ok(Self(s.to_lowercase())),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Everything after the `@`.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map_or("", |(_, domain)| domain)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Email {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Email {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(raw)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Email {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0.as_str(), buf)
    }
}
