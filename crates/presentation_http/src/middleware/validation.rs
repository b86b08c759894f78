//! Request validation
//!
//! Provides a `ValidatedJson` extractor that validates request bodies using the validator crate.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use thiserror::Error;
use validator::Validate;

use crate::error::ApiError;

/// Validation error type
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] JsonRejection),
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::JsonError(rejection)
                if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE =>
            {
                Self::PayloadTooLarge(rejection.body_text())
            },
            ValidationError::JsonError(rejection) => Self::BadRequest(rejection.body_text()),
            ValidationError::ValidationFailed(msg) => Self::BadRequest(msg),
        }
    }
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

/// A JSON extractor that also validates the request body
///
/// Use this instead of `Json<T>` when you want automatic validation
/// of the request body using the `validator` crate. Rejections use the
/// gateway's `{error, message}` body with kind `bad_request`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidationError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;

        value.validate().map_err(|e| {
            let mut errors: Vec<String> = e
                .field_errors()
                .iter()
                .flat_map(|(field, errors)| {
                    errors
                        .iter()
                        .map(|error| {
                            format!(
                                "{}: {}",
                                field,
                                error
                                    .message
                                    .as_ref()
                                    .map_or_else(|| error.code.to_string(), ToString::to_string)
                            )
                        })
                        .collect::<Vec<_>>()
                })
                .collect();
            errors.sort();

            ValidationError::ValidationFailed(errors.join("; "))
        })?;

        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::{Body, to_bytes},
        extract::DefaultBodyLimit,
        routing::post,
    };
    use domain::SmsMessage;
    use tower::ServiceExt;

    use super::*;
    use crate::error::ErrorResponse;

    async fn test_handler(ValidatedJson(req): ValidatedJson<SmsMessage>) -> String {
        req.phone
    }

    fn create_test_app() -> Router {
        Router::new()
            .route("/test", post(test_handler))
            .layer(DefaultBodyLimit::max(256))
    }

    async fn send(body: impl Into<Body>, content_type: Option<&str>) -> (StatusCode, Vec<u8>) {
        let mut builder = axum::http::Request::builder().method("POST").uri("/test");
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        let response = create_test_app()
            .oneshot(builder.body(body.into()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    fn error_kind(bytes: &[u8]) -> String {
        serde_json::from_slice::<ErrorResponse>(bytes).unwrap().error
    }

    #[tokio::test]
    async fn valid_request_passes() {
        let (status, body) = send(
            r#"{"phone": "+911234567890", "message": "test"}"#,
            Some("application/json"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"+911234567890");
    }

    #[tokio::test]
    async fn empty_message_rejected() {
        let (status, body) = send(
            r#"{"phone": "+911234567890", "message": ""}"#,
            Some("application/json"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_kind(&body), "bad_request");
    }

    #[tokio::test]
    async fn missing_field_rejected() {
        let (status, body) = send(r#"{"phone": "+911234567890"}"#, Some("application/json")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_kind(&body), "bad_request");
    }

    #[tokio::test]
    async fn invalid_json_rejected() {
        let (status, body) = send(r#"{"phone": not valid json}"#, Some("application/json")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_kind(&body), "bad_request");
    }

    #[tokio::test]
    async fn missing_content_type_is_bad_request() {
        let (status, body) = send(r#"{"phone": "1", "message": "m"}"#, None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_kind(&body), "bad_request");
    }

    #[tokio::test]
    async fn oversized_body_is_payload_too_large() {
        let json = format!(r#"{{"phone": "1", "message": "{}"}}"#, "x".repeat(1024));
        let (status, body) = send(json, Some("application/json")).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(error_kind(&body), "payload_too_large");
    }

    #[test]
    fn validation_error_debug() {
        let error = ValidationError::ValidationFailed("test".to_string());
        let debug = format!("{error:?}");
        assert!(debug.contains("ValidationFailed"));
    }
}
