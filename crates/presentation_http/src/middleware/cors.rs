//! CORS policy
//!
//! With no configured origins the request origin is mirrored and credentials
//! are allowed, so browser front ends on any dev host can call the gateway.
//! A `*` entry allows any origin without credentials. Otherwise only the
//! listed origins are accepted.

use axum::http::{
    HeaderValue, Method,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use infrastructure::ServerConfig;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

/// Build the CORS layer for the server configuration
#[must_use]
pub fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods(ALLOWED_METHODS)
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    if server.allowed_origins.is_empty() {
        return base
            .allow_origin(AllowOrigin::mirror_request())
            .allow_credentials(true);
    }

    if server.allows_any_origin() {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = server
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            },
        })
        .collect();

    base.allow_origin(origins).allow_credentials(true)
}
