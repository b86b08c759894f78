//! Request context carrying the target resolved for a single request
//!
//! The gateway never records the "active target" in process-wide state.
//! Authentication resolves the target from the caller's token and stores it
//! here, together with the topology snapshot it was resolved against. The
//! forwarding step reads only from this context, so concurrent requests with
//! tokens for different targets cannot redirect each other.

use std::sync::Arc;

use domain::{TargetName, Topology, UpstreamTarget};
use uuid::Uuid;

/// Context for a single request
#[derive(Debug, Clone)]
pub struct RequestContext {
    target: TargetName,
    topology: Arc<Topology>,
    request_id: Uuid,
    authenticated: bool,
}

impl RequestContext {
    /// Context for a request authenticated by a token bound to `target`
    #[must_use]
    pub fn authenticated(topology: Arc<Topology>, target: TargetName, request_id: Uuid) -> Self {
        Self {
            target,
            topology,
            request_id,
            authenticated: true,
        }
    }

    /// Context for a request on a public path; routes to the default target
    #[must_use]
    pub fn public(topology: Arc<Topology>, request_id: Uuid) -> Self {
        let target = topology.default_target().clone();
        Self {
            target,
            topology,
            request_id,
            authenticated: false,
        }
    }

    /// Target resolved for this request
    #[must_use]
    pub const fn target(&self) -> &TargetName {
        &self.target
    }

    /// Upstream registered for the resolved target in this request's snapshot
    #[must_use]
    pub fn upstream(&self) -> Option<&UpstreamTarget> {
        self.topology.upstream(&self.target)
    }

    /// Topology snapshot the request was authenticated against
    #[must_use]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Correlation ID
    #[must_use]
    pub const fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Whether the caller presented a valid token
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}
