//! Forwarding handler
//!
//! Serves every path without a dedicated route. The request context bound by
//! the auth middleware decides which upstream receives the request.

use application::{InboundRequest, RequestContext};
use axum::{
    Extension,
    body::{Body, Bytes},
    extract::{State, rejection::BytesRejection},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::{error::ApiError, state::AppState};

/// Forward the request to the target bound in its context
pub async fn forward(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text())
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    })?;

    let inbound = InboundRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(ToString::to_string),
        headers: header_pairs(&headers),
        body,
    };

    let upstream = state.gateway_service.forward(&ctx, inbound).await?;

    let status = StatusCode::from_u16(upstream.status).map_err(|_| {
        ApiError::Internal(format!("upstream sent invalid status {}", upstream.status))
    })?;

    let mut response = (status, Body::from(upstream.body)).into_response();
    for (name, value) in upstream.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_bytes(&value),
        ) {
            (Ok(name), Ok(value)) => {
                response.headers_mut().append(name, value);
            },
            _ => debug!(header = %name, "Dropping upstream header that is not valid HTTP"),
        }
    }

    Ok(response)
}

/// Inbound headers as owned pairs, values kept byte for byte
fn header_pairs(headers: &HeaderMap) -> Vec<(String, Bytes)> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                Bytes::copy_from_slice(value.as_bytes()),
            )
        })
        .collect()
}
