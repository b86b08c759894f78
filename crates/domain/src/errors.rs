//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Target name is empty or contains unsupported characters
    #[error("Invalid target name: {0}")]
    InvalidTargetName(String),

    /// Upstream base URL is malformed
    #[error("Invalid upstream URL: {0}")]
    InvalidUrl(String),

    /// A credential, rule or default refers to a target that is not configured
    #[error("Unknown target: {0}")]
    UnknownTarget(String),

    /// Route rule is malformed
    #[error("Invalid route: {0}")]
    InvalidRoute(String),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Reason a request failed bearer-token authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    /// No usable `Authorization: Bearer` header was sent
    #[error("No token provided")]
    MissingToken,

    /// A token was sent but is not in the credential set
    #[error("Invalid token")]
    InvalidToken,
}

impl AuthFailure {
    /// Stable machine-readable kind used in error bodies and logs
    #[must_use]
    pub const fn kind(self) -> &'static str {
        match self {
            Self::MissingToken => "no_token_provided",
            Self::InvalidToken => "invalid_token",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_target_error_message() {
        let err = DomainError::UnknownTarget("cloud".to_string());
        assert_eq!(err.to_string(), "Unknown target: cloud");
    }

    #[test]
    fn invalid_url_error_message() {
        let err = DomainError::InvalidUrl("ftp://x".to_string());
        assert_eq!(err.to_string(), "Invalid upstream URL: ftp://x");
    }

    #[test]
    fn invalid_route_error_message() {
        let err = DomainError::InvalidRoute("prefix must start with /".to_string());
        assert_eq!(err.to_string(), "Invalid route: prefix must start with /");
    }

    #[test]
    fn auth_failure_messages_match_wire_text() {
        assert_eq!(AuthFailure::MissingToken.to_string(), "No token provided");
        assert_eq!(AuthFailure::InvalidToken.to_string(), "Invalid token");
    }

    #[test]
    fn auth_failure_kinds_are_distinct() {
        assert_eq!(AuthFailure::MissingToken.kind(), "no_token_provided");
        assert_eq!(AuthFailure::InvalidToken.kind(), "invalid_token");
    }
}
