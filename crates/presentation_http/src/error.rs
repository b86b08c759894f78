//! API error handling
//!
//! Every failure the gateway synthesizes is a JSON body
//! `{ "error": <kind>, "message": <text> }`. Internal details and upstream
//! URLs are logged, never returned.

use application::ApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::AuthFailure;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No token provided")]
    NoTokenProvided,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Target server unreachable")]
    BadGateway,

    #[error("Target server did not respond in time")]
    GatewayTimeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Machine-readable error kind
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NoTokenProvided => "no_token_provided",
            Self::InvalidToken => "invalid_token",
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::MethodNotAllowed(_) => "method_not_allowed",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::BadGateway => "bad_gateway",
            Self::GatewayTimeout => "gateway_timeout",
            Self::Internal(_) => "internal_error",
        }
    }

    /// HTTP status for this error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NoTokenProvided | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::BadGateway => StatusCode::BAD_GATEWAY,
            Self::GatewayTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the caller
    fn public_message(&self) -> String {
        match self {
            Self::NoTokenProvided => "No token provided".to_string(),
            Self::InvalidToken => "Invalid token".to_string(),
            Self::BadRequest(msg)
            | Self::NotFound(msg)
            | Self::MethodNotAllowed(msg)
            | Self::PayloadTooLarge(msg) => msg.clone(),
            Self::BadGateway => "Target server unreachable".to_string(),
            Self::GatewayTimeout => "Target server did not respond in time".to_string(),
            Self::Internal(_) => "An internal error occurred".to_string(),
        }
    }
}

/// Error response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error kind, e.g. `invalid_token`
    pub error: String,
    /// Human-readable description
    pub message: String,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            error: err.kind().to_string(),
            message: err.public_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            error!(error = %detail, "Internal error");
        }

        (self.status(), Json(ErrorResponse::from(&self))).into_response()
    }
}

impl From<AuthFailure> for ApiError {
    fn from(failure: AuthFailure) -> Self {
        match failure {
            AuthFailure::MissingToken => Self::NoTokenProvided,
            AuthFailure::InvalidToken => Self::InvalidToken,
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::NotAuthorized(failure) => failure.into(),
            ApplicationError::NoRoute(path) => Self::NotFound(format!("No route for {path}")),
            ApplicationError::InvalidRequest(msg) => Self::BadRequest(msg),
            ApplicationError::UpstreamUnreachable(_) => Self::BadGateway,
            ApplicationError::UpstreamTimeout(_) => Self::GatewayTimeout,
            ApplicationError::UnknownTarget(_)
            | ApplicationError::Configuration(_)
            | ApplicationError::Internal(_)
            | ApplicationError::Domain(_) => Self::Internal(err.to_string()),
        }
    }
}
