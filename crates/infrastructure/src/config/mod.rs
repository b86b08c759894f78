//! Application configuration
//!
//! Split into focused sub-modules:
//! - `server`: HTTP listener, CORS, body limits, logging format
//! - `upstream`: outbound client timeouts and TLS
//! - `gateway`: targets, credentials, route rules, public paths

mod gateway;
mod server;
mod upstream;

use std::fmt;

use domain::{DomainError, Topology};
use serde::{Deserialize, Serialize};

pub use gateway::{CredentialEntry, GatewayConfig, RouteConfig, TargetConfig};
pub use server::ServerConfig;
pub use upstream::UpstreamConfig;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "RAILMADAD_CONFIG";

/// Prefix for environment overrides (`RAILMADAD__SERVER__PORT=8080`)
pub const ENV_PREFIX: &str = "RAILMADAD";

/// Application environment (development or production)
///
/// Controls security validation strictness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment - relaxed security warnings
    #[default]
    Development,
    /// Production environment - strict security validation
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!(
                "Invalid environment: {s}. Use 'development' or 'production'"
            )),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development or production)
    ///
    /// In production, critical security warnings prevent startup unless
    /// RAILMADAD_ALLOW_INSECURE_CONFIG=true.
    #[serde(default)]
    pub environment: Option<Environment>,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream client configuration
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Gateway topology configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl AppConfig {
    /// Load configuration from environment and optional file
    ///
    /// The file is `$RAILMADAD_CONFIG` if set, otherwise an optional
    /// `config.toml` in the working directory.
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).ok();
        Self::load_from(path.as_deref())
    }

    /// Load configuration from `path` (required) or the optional default file
    pub fn load_from(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::with_name(path).required(true),
            None => config::File::with_name("config").required(false),
        };

        // Defaults come from the serde attributes on each section
        let builder = config::Config::builder()
            .add_source(file)
            // Override with environment variables (e.g., RAILMADAD__SERVER__PORT)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Whether the gateway runs in production mode
    #[must_use]
    pub fn is_production(&self) -> bool {
        self.environment == Some(Environment::Production)
    }

    /// Build the routing topology from the gateway section
    pub fn topology(&self) -> Result<Topology, DomainError> {
        self.gateway.to_topology()
    }
}
