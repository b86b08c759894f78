//! HTTP middleware components
//!
//! This module contains middleware for authentication, request correlation,
//! CORS and request validation.

pub mod auth;
pub mod cors;
pub mod request_id;
pub mod validation;

pub use auth::{TokenAuth, TokenAuthLayer};
pub use cors::cors_layer;
pub use request_id::{REQUEST_ID_HEADER, RequestId, RequestIdLayer, RequestIdService};
pub use validation::{ValidatedJson, ValidationError};
