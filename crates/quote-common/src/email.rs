//! Email Value Object
//!
//! Immutable, validated email address. The gateway keys every admission
//! decision off the domain part, so an `Email` that exists is guaranteed
//! to have one.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated email address, stored lowercased and trimmed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Parse and validate an email address.
    pub fn parse(value: impl Into<String>) -> Result<Self, EmailError> {
        let value = value.into().trim().to_lowercase();

        if value.is_empty() {
            return Err(EmailError::Empty);
        }

        if !Self::is_valid_format(&value) {
            return Err(EmailError::InvalidFormat);
        }

        Ok(Self(value))
    }

    /// The full address.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The domain part. Always present on a validated address.
    pub fn domain(&self) -> &str {
        // validated in parse(): exactly one '@' with a non-empty domain
        self.0.split('@').nth(1).unwrap_or_default()
    }

    fn is_valid_format(email: &str) -> bool {
        let mut parts = email.split('@');
        let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
            (Some(local), Some(domain), None) => (local, domain),
            _ => return false,
        };

        !local.is_empty()
            && !domain.is_empty()
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Email validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// Empty after trimming.
    Empty,
    /// Not a `local@domain.tld` shape.
    InvalidFormat,
}

impl std::error::Error for EmailError {}

impl fmt::Display for EmailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "email cannot be empty"),
            Self::InvalidFormat => write!(f, "invalid email format"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_exposes_domain() {
        let email = Email::parse("buyer@clientco.com").unwrap();
        assert_eq!(email.as_str(), "buyer@clientco.com");
        assert_eq!(email.domain(), "clientco.com");
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        let email = Email::parse("  Buyer@ClientCo.COM ").unwrap();
        assert_eq!(email.as_str(), "buyer@clientco.com");
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
    }

    #[test]
    fn rejects_malformed() {
        for bad in ["no-at-sign", "user@", "@domain.com", "a@b@c.com", "user@nodot"] {
            assert_eq!(Email::parse(bad), Err(EmailError::InvalidFormat), "{bad}");
        }
    }
}
