//! Hot-reloadable configuration support
//!
//! Provides SIGHUP signal handling for runtime reload of the gateway
//! topology without server restart. The configuration and the topology
//! derived from it are swapped together, and only when the new topology
//! validates.

use std::sync::Arc;

use arc_swap::ArcSwap;
use domain::{DomainError, Topology};
use infrastructure::AppConfig;
use tracing::{error, info, warn};

/// A configuration together with the topology built from it
#[derive(Debug)]
struct Generation {
    config: Arc<AppConfig>,
    topology: Arc<Topology>,
}

/// Error raised when a candidate configuration cannot be applied
#[derive(Debug, thiserror::Error)]
pub enum ReloadError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid gateway topology: {0}")]
    Topology(#[from] DomainError),
}

/// A wrapper around `AppConfig` that supports atomic reload via SIGHUP
///
/// Only the gateway section (targets, credentials, routes, public paths,
/// default target) takes effect on reload. Settings baked into the listener,
/// the router or the upstream client at startup are reported by
/// [`restart_required_changes`] and keep their old values until restart.
#[derive(Debug, Clone)]
pub struct ReloadableConfig {
    inner: Arc<ArcSwap<Generation>>,
}

impl ReloadableConfig {
    /// Create a new reloadable configuration
    ///
    /// Fails if the gateway section does not describe a valid topology.
    pub fn new(config: AppConfig) -> Result<Self, DomainError> {
        let topology = config.topology()?;
        Ok(Self {
            inner: Arc::new(ArcSwap::new(Arc::new(Generation {
                config: Arc::new(config),
                topology: Arc::new(topology),
            }))),
        })
    }

    /// Get the current configuration
    #[must_use]
    pub fn load(&self) -> Arc<AppConfig> {
        Arc::clone(&self.inner.load().config)
    }

    /// Get the current topology
    #[must_use]
    pub fn topology(&self) -> Arc<Topology> {
        Arc::clone(&self.inner.load().topology)
    }

    /// Replace the configuration if its topology validates
    ///
    /// Returns the names of changed settings that only apply after restart.
    pub fn apply(&self, config: AppConfig) -> Result<Vec<&'static str>, ReloadError> {
        let topology = config.topology()?;
        let new_default = topology.default_target().to_string();
        let targets = topology.routing().len();
        let credentials = topology.credentials().len();

        let old = self.inner.swap(Arc::new(Generation {
            config: Arc::new(config),
            topology: Arc::new(topology),
        }));
        let ignored = restart_required_changes(&old.config, &self.load());

        info!(
            old_default_target = %old.topology.default_target(),
            new_default_target = %new_default,
            targets,
            credentials,
            "Gateway topology reloaded"
        );
        for setting in &ignored {
            warn!(setting, "Changed setting takes effect only after restart");
        }

        Ok(ignored)
    }

    /// Reload configuration from disk
    ///
    /// Returns `true` if the reload was successful
    pub fn reload(&self) -> bool {
        match AppConfig::load()
            .map_err(ReloadError::from)
            .and_then(|config| self.apply(config))
        {
            Ok(_) => true,
            Err(e) => {
                error!(error = %e, "Failed to reload configuration");
                false
            },
        }
    }
}

/// Settings that differ between `old` and `new` but are fixed at startup
pub fn restart_required_changes(old: &AppConfig, new: &AppConfig) -> Vec<&'static str> {
    let (os, ns) = (&old.server, &new.server);
    let (ou, nu) = (&old.upstream, &new.upstream);

    [
        ("server.host", os.host != ns.host),
        ("server.port", os.port != ns.port),
        ("server.allowed_origins", os.allowed_origins != ns.allowed_origins),
        ("server.max_body_size_bytes", os.max_body_size_bytes != ns.max_body_size_bytes),
        ("server.log_format", os.log_format != ns.log_format),
        ("server.shutdown_timeout_secs", os.shutdown_timeout_secs != ns.shutdown_timeout_secs),
        ("upstream.timeout_secs", ou.timeout_secs != nu.timeout_secs),
        ("upstream.connect_timeout_secs", ou.connect_timeout_secs != nu.connect_timeout_secs),
        ("upstream.user_agent", ou.user_agent != nu.user_agent),
        ("upstream.accept_invalid_certs", ou.accept_invalid_certs != nu.accept_invalid_certs),
        ("environment", old.environment != new.environment),
    ]
    .into_iter()
    .filter_map(|(name, changed)| changed.then_some(name))
    .collect()
}

/// Spawn a background task that listens for SIGHUP and reloads configuration
///
/// Returns a handle that can be used to manually trigger reloads
#[cfg(unix)]
pub fn spawn_config_reload_handler(config: ReloadableConfig) -> ReloadableConfig {
    use tokio::signal::unix::{SignalKind, signal};

    let config_clone = config.clone();
    tokio::spawn(async move {
        let mut sighup = match signal(SignalKind::hangup()) {
            Ok(s) => s,
            Err(e) => {
                error!("Failed to install SIGHUP handler: {}", e);
                return;
            },
        };

        loop {
            sighup.recv().await;
            info!("Received SIGHUP, reloading configuration");
            if config_clone.reload() {
                info!("Configuration reload complete");
            } else {
                warn!("Configuration reload failed, keeping previous config");
            }
        }
    });

    config
}

/// No-op on non-Unix systems
#[cfg(not(unix))]
pub fn spawn_config_reload_handler(config: ReloadableConfig) -> ReloadableConfig {
    warn!("SIGHUP config reload not supported on this platform");
    config
}
