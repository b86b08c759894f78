//! Application services - Use case implementations

mod auth_service;
mod gateway_service;

pub use auth_service::AuthService;
pub use gateway_service::{GatewayService, HOP_BY_HOP_HEADERS, InboundRequest};
