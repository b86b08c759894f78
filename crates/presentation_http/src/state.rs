//! Application state shared across handlers

use std::sync::Arc;

use application::{AuthService, GatewayService, ports::UpstreamPort};

use crate::config_reload::ReloadableConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Hot-reloadable configuration and topology
    pub config: ReloadableConfig,
    /// Bearer-token authentication
    pub auth_service: AuthService,
    /// Request forwarding
    pub gateway_service: Arc<GatewayService>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("default_target", &self.config.topology().default_target())
            .field("auth_service", &self.auth_service)
            .field("gateway_service", &self.gateway_service)
            .finish()
    }
}

impl AppState {
    /// Assemble state around an upstream adapter
    #[must_use]
    pub fn new(config: ReloadableConfig, upstream: Arc<dyn UpstreamPort>) -> Self {
        Self {
            config,
            auth_service: AuthService::new(),
            gateway_service: Arc::new(GatewayService::new(upstream)),
        }
    }
}
