//! Gateway topology configuration: upstream targets, inbound credentials,
//! path-rewrite rules and the public-path allowlist.

use std::collections::BTreeMap;

use domain::{
    BearerToken, CredentialSet, DomainError, RouteRule, RoutingTable, TargetName, Topology,
    UpstreamTarget,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// One upstream backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Base URL (http or https, may carry a path prefix)
    pub base_url: String,

    /// Credential presented to this upstream
    #[serde(skip_serializing)]
    pub token: SecretString,
}

/// An inbound bearer token and the target it authorizes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialEntry {
    /// Token callers send in `Authorization: Bearer <token>`
    #[serde(skip_serializing)]
    pub token: SecretString,

    /// Name of the target in `gateway.targets`
    pub target: String,
}

/// A forwarded path prefix and its upstream replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Inbound prefix, e.g. `/sms`
    pub prefix: String,

    /// Upstream prefix substituted for it, e.g. `/api/sms`
    #[serde(default)]
    pub replacement: String,
}

/// Gateway configuration
///
/// Example in config.toml:
/// ```toml
/// [gateway]
/// default_target = "local"
///
/// [gateway.targets.local]
/// base_url = "http://localhost:8082"
/// token = "upstream-local-token"
///
/// [[gateway.credentials]]
/// token = "3f1c2a9e-6d0b-4f57-9a8e-1b2c3d4e5f60"
/// target = "local"
///
/// [[gateway.routes]]
/// prefix = "/sms"
/// replacement = "/api/sms"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Target reported by `/health` and used for public paths
    #[serde(default = "default_target")]
    pub default_target: String,

    /// Upstream targets by name
    #[serde(default)]
    pub targets: BTreeMap<String, TargetConfig>,

    /// Inbound credentials
    #[serde(default)]
    pub credentials: Vec<CredentialEntry>,

    /// Forwarded prefixes
    #[serde(default = "default_routes")]
    pub routes: Vec<RouteConfig>,

    /// Paths served without authentication (exact match)
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
}

fn default_target() -> String {
    "local".to_string()
}

fn default_routes() -> Vec<RouteConfig> {
    vec![RouteConfig {
        prefix: "/sms".to_string(),
        replacement: "/api/sms".to_string(),
    }]
}

fn default_public_paths() -> Vec<String> {
    vec!["/health".to_string(), "/mock/health".to_string()]
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            default_target: default_target(),
            targets: BTreeMap::new(),
            credentials: Vec::new(),
            routes: default_routes(),
            public_paths: default_public_paths(),
        }
    }
}

impl GatewayConfig {
    /// Build the validated routing topology
    pub fn to_topology(&self) -> Result<Topology, DomainError> {
        let targets = self
            .targets
            .iter()
            .map(|(name, target)| {
                UpstreamTarget::new(
                    TargetName::new(name.as_str())?,
                    target.base_url.as_str(),
                    BearerToken::new(target.token.expose_secret())?,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        let routing = RoutingTable::new(targets)?;

        let credentials = CredentialSet::new(
            self.credentials
                .iter()
                .map(|entry| -> Result<_, DomainError> {
                    Ok((
                        BearerToken::new(entry.token.expose_secret())?,
                        TargetName::new(entry.target.as_str())?,
                    ))
                })
                .collect::<Result<Vec<_>, _>>()?,
        )?;

        let routes = self
            .routes
            .iter()
            .map(|route| RouteRule::new(route.prefix.as_str(), route.replacement.as_str()))
            .collect::<Result<Vec<_>, _>>()?;

        Topology::new(
            routing,
            credentials,
            routes,
            self.public_paths.iter().cloned(),
            TargetName::new(self.default_target.as_str())?,
        )
    }
}
