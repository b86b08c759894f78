//! Route definitions

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::{
    handlers,
    middleware::{RequestIdLayer, TokenAuthLayer},
    state::AppState,
};

/// Create the main router with all routes
///
/// Authentication and request IDs are part of the router; CORS, tracing and
/// panic recovery are added by the binary.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.load().server.max_body_size_bytes;
    let auth = TokenAuthLayer::new(state.config.clone(), state.auth_service);

    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/mock/health", get(handlers::health::mock_health))
        // In-process mock upstream
        .route("/mock/api/sms", post(handlers::mock_sms::send_sms))
        // Everything else is forwarded
        .fallback(handlers::proxy::forward)
        .method_not_allowed_fallback(handlers::fallback::method_not_allowed)
        .layer(DefaultBodyLimit::max(body_limit))
        // Layers run outermost-last: request id, then auth
        .layer(auth)
        .layer(RequestIdLayer::new())
        .with_state(state)
}
