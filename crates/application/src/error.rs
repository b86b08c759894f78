//! Application-level errors

use domain::{AuthFailure, DomainError};
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Bearer-token authentication failed
    #[error("Not authorized: {0}")]
    NotAuthorized(AuthFailure),

    /// No route rule mounts the requested path
    #[error("No route for path: {0}")]
    NoRoute(String),

    /// The resolved target is missing from the routing table
    #[error("Unknown target: {0}")]
    UnknownTarget(String),

    /// Network-level failure contacting the upstream
    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    /// The upstream did not answer within the configured bound
    #[error("Upstream timeout after {0}ms")]
    UpstreamTimeout(u64),

    /// The inbound request could not be turned into an upstream request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthFailure> for ApplicationError {
    fn from(failure: AuthFailure) -> Self {
        Self::NotAuthorized(failure)
    }
}
