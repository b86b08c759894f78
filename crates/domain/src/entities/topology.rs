//! Gateway topology: everything needed to authenticate and route a request

use std::collections::BTreeSet;

use crate::{
    entities::{CredentialSet, RouteRule, RoutingTable, UpstreamTarget},
    errors::DomainError,
    value_objects::TargetName,
};

/// Immutable snapshot of the gateway's routing configuration
///
/// Built once from configuration and replaced wholesale on reload. Requests
/// read from a single snapshot for their whole lifetime.
#[derive(Debug, Clone)]
pub struct Topology {
    routing: RoutingTable,
    credentials: CredentialSet,
    routes: Vec<RouteRule>,
    public_paths: BTreeSet<String>,
    default_target: TargetName,
}

impl Topology {
    /// Assemble a topology and check its references
    ///
    /// Fails if the default target, any credential or the routing table are
    /// inconsistent, or if two rules share a prefix.
    pub fn new(
        routing: RoutingTable,
        credentials: CredentialSet,
        routes: Vec<RouteRule>,
        public_paths: impl IntoIterator<Item = String>,
        default_target: TargetName,
    ) -> Result<Self, DomainError> {
        if !routing.contains(&default_target) {
            return Err(DomainError::UnknownTarget(format!(
                "default target '{default_target}' is not configured"
            )));
        }

        for (_, target) in credentials.iter() {
            if !routing.contains(target) {
                return Err(DomainError::UnknownTarget(format!(
                    "credential refers to unconfigured target '{target}'"
                )));
            }
        }

        let mut seen = BTreeSet::new();
        for rule in &routes {
            if !seen.insert(rule.prefix().to_string()) {
                return Err(DomainError::InvalidRoute(format!(
                    "prefix '{}' is mounted more than once",
                    rule.prefix()
                )));
            }
        }

        let mut routes = routes;
        routes.sort_by_key(|rule| std::cmp::Reverse(rule.specificity()));

        Ok(Self {
            routing,
            credentials,
            routes,
            public_paths: public_paths.into_iter().collect(),
            default_target,
        })
    }

    /// Whether `path` is exempt from authentication (exact match)
    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.contains(path)
    }

    /// Most specific rule that mounts `path`
    pub fn route_for(&self, path: &str) -> Option<&RouteRule> {
        self.routes.iter().find(|rule| rule.matches(path))
    }

    /// Upstream registered under `name`
    pub fn upstream(&self, name: &TargetName) -> Option<&UpstreamTarget> {
        self.routing.get(name)
    }

    /// Target used when no credential selects one, and reported by `/health`
    pub const fn default_target(&self) -> &TargetName {
        &self.default_target
    }

    /// Configured routing table
    pub const fn routing(&self) -> &RoutingTable {
        &self.routing
    }

    /// Configured inbound credentials
    pub const fn credentials(&self) -> &CredentialSet {
        &self.credentials
    }

    /// Rules ordered from most to least specific
    pub fn routes(&self) -> &[RouteRule] {
        &self.routes
    }

    /// Paths that skip authentication
    pub fn public_paths(&self) -> impl Iterator<Item = &str> {
        self.public_paths.iter().map(String::as_str)
    }
}
