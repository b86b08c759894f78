//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer and loads the gateway
//! configuration.

pub mod adapters;
pub mod config;
pub mod validation;

pub use adapters::*;
pub use config::{
    AppConfig, CredentialEntry, Environment, GatewayConfig, RouteConfig, ServerConfig,
    TargetConfig, UpstreamConfig,
};
pub use validation::{SecurityValidator, SecurityWarning, WarningSeverity};
