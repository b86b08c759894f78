//! Request forwarding
//!
//! Rewrites the inbound path according to the matching route rule, swaps the
//! caller's credential for the upstream's, and relays the upstream answer.
//! One attempt per request; failures are returned, never retried.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{error, info, instrument};

use crate::{
    error::ApplicationError,
    ports::{ForwardRequest, ForwardResponse, UpstreamPort},
    request_context::RequestContext,
};

/// Headers that apply to a single connection and are never forwarded
pub const HOP_BY_HOP_HEADERS: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Inbound headers the gateway replaces with its own values
const REPLACED_REQUEST_HEADERS: [&str; 5] = [
    "host",
    "authorization",
    "content-type",
    "content-length",
    "x-request-id",
];

/// Header carrying the correlation ID upstream
const X_REQUEST_ID: &str = "x-request-id";

/// Content type announced to upstreams
const JSON_CONTENT_TYPE: &str = "application/json";

/// An inbound request as seen by the gateway
#[derive(Debug, Clone)]
pub struct InboundRequest {
    /// HTTP method
    pub method: String,
    /// Path without query
    pub path: String,
    /// Raw query string, if the URI had one
    pub query: Option<String>,
    /// Inbound headers; values are raw bytes
    pub headers: Vec<(String, Bytes)>,
    /// Inbound body (may be empty)
    pub body: Bytes,
}

/// Forwards authenticated requests to their resolved upstream
#[derive(Clone)]
pub struct GatewayService {
    upstream: Arc<dyn UpstreamPort>,
}

impl std::fmt::Debug for GatewayService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayService").finish_non_exhaustive()
    }
}

impl GatewayService {
    /// Create a gateway service on top of an upstream adapter
    pub fn new(upstream: Arc<dyn UpstreamPort>) -> Self {
        Self { upstream }
    }

    /// Forward `request` to the target bound in `ctx`
    #[instrument(skip(self, ctx, request), fields(target_name = %ctx.target(), path = %request.path))]
    pub async fn forward(
        &self,
        ctx: &RequestContext,
        request: InboundRequest,
    ) -> Result<ForwardResponse, ApplicationError> {
        let rule = ctx
            .topology()
            .route_for(&request.path)
            .ok_or_else(|| ApplicationError::NoRoute(request.path.clone()))?;

        let upstream_path = rule
            .rewrite(&request.path, request.query.as_deref())
            .ok_or_else(|| ApplicationError::NoRoute(request.path.clone()))?;

        let upstream = ctx
            .upstream()
            .ok_or_else(|| ApplicationError::UnknownTarget(ctx.target().to_string()))?;

        let mut headers = end_to_end_headers(&request.headers, &REPLACED_REQUEST_HEADERS);
        headers.push((
            "authorization".to_string(),
            Bytes::from(upstream.token().to_header_value()),
        ));
        headers.push((
            "content-type".to_string(),
            Bytes::from_static(JSON_CONTENT_TYPE.as_bytes()),
        ));
        headers.push((X_REQUEST_ID.to_string(), Bytes::from(ctx.request_id().to_string())));

        let body = (!request.body.is_empty()).then_some(request.body);

        info!(
            method = %request.method,
            path = %request.path,
            upstream_path = %upstream_path,
            target_name = %ctx.target(),
            body_bytes = body.as_ref().map_or(0, Bytes::len),
            "Proxying request"
        );

        let forward = ForwardRequest {
            method: request.method,
            url: upstream.url_for(&upstream_path),
            headers,
            body,
        };

        match self.upstream.forward(forward).await {
            Ok(mut response) => {
                response.headers = end_to_end_headers(&response.headers, &["content-length"]);
                info!(status = response.status, target_name = %ctx.target(), "Upstream responded");
                Ok(response)
            },
            Err(e) => {
                error!(target_name = %ctx.target(), error = %e, "Upstream request failed");
                Err(e)
            },
        }
    }
}

/// Drop hop-by-hop headers, headers listed in `Connection`, and `extra`
fn end_to_end_headers(headers: &[(String, Bytes)], extra: &[&str]) -> Vec<(String, Bytes)> {
    let connection_listed: Vec<String> = headers
        .iter()
        .filter(|(name, _)| name.eq_ignore_ascii_case("connection"))
        .flat_map(|(_, value)| {
            String::from_utf8_lossy(value)
                .split(',')
                .map(|token| token.trim().to_ascii_lowercase())
                .collect::<Vec<_>>()
        })
        .filter(|token| !token.is_empty())
        .collect();

    headers
        .iter()
        .filter(|(name, _)| {
            let lower = name.to_ascii_lowercase();
            !HOP_BY_HOP_HEADERS.contains(&lower.as_str())
                && !extra.contains(&lower.as_str())
                && !connection_listed.contains(&lower)
        })
        .cloned()
        .collect()
}
