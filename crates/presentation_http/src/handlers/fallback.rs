//! Method mismatch on a dedicated route

use axum::http::{Method, Uri};

use crate::error::ApiError;

/// Reject a method the matched route does not serve
pub async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError::MethodNotAllowed(format!("Method {method} not allowed for {}", uri.path()))
}
