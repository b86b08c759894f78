//! Application layer - Use cases and orchestration
//!
//! Authenticates inbound requests against the gateway topology and forwards
//! them through the upstream port.

pub mod error;
pub mod ports;
pub mod request_context;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use request_context::RequestContext;
pub use services::*;
