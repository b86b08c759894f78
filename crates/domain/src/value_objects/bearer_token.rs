//! Bearer token value object

use std::fmt;

use subtle::ConstantTimeEq;

use crate::errors::DomainError;

/// Scheme prefix of an `Authorization` header carrying a bearer token
const BEARER_PREFIX: &str = "Bearer ";

/// Opaque bearer credential
///
/// Used purely as a lookup key, never as a signed credential. The value is
/// redacted from `Debug` output and compared in constant time.
#[derive(Clone)]
pub struct BearerToken(String);

impl BearerToken {
    /// Create a token from its raw value, trimming surrounding whitespace
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::ValidationError(
                "Bearer token must not be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Extract the token from an `Authorization` header value
    ///
    /// Returns `None` when the header does not use the `Bearer` scheme or
    /// carries an empty token.
    pub fn from_authorization(header: &str) -> Option<Self> {
        let token = header.strip_prefix(BEARER_PREFIX)?.trim();
        if token.is_empty() {
            return None;
        }
        Some(Self(token.to_string()))
    }

    /// Expose the raw token value
    ///
    /// Only call this when writing the token onto the wire.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Number of characters in the token
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    /// Always `false` for a constructed token
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as an `Authorization` header value
    pub fn to_header_value(&self) -> String {
        format!("{BEARER_PREFIX}{}", self.0)
    }

    /// Constant-time equality
    pub fn matches(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl PartialEq for BearerToken {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other)
    }
}

impl Eq for BearerToken {}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}
