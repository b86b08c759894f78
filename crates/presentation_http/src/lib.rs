//! Rail Madad gateway HTTP presentation layer
//!
//! Authenticates browser requests, forwards them to the upstream bound to
//! the caller's token and serves the health and mock SMS endpoints.

pub mod config_reload;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config_reload::{ReloadableConfig, spawn_config_reload_handler};
pub use error::{ApiError, ErrorResponse};
pub use middleware::{RequestIdLayer, TokenAuthLayer, ValidatedJson, ValidationError, cors_layer};
pub use routes::create_router;
pub use state::AppState;
