//! Bearer-token authentication against the gateway topology

use std::sync::Arc;

use domain::{AuthFailure, BearerToken, Topology};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::request_context::RequestContext;

/// Authenticates inbound requests
///
/// 1. Public paths skip authentication and route to the default target.
/// 2. A missing or non-Bearer `Authorization` header fails with
///    [`AuthFailure::MissingToken`].
/// 3. A token absent from the credential set fails with
///    [`AuthFailure::InvalidToken`].
/// 4. Otherwise the token's target is bound to this request's context only.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthService;

impl AuthService {
    /// Create a new authentication service
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Authenticate one request
    ///
    /// `authorization` is the raw `Authorization` header value, if any.
    pub fn authenticate(
        &self,
        topology: Arc<Topology>,
        path: &str,
        authorization: Option<&str>,
        request_id: Uuid,
    ) -> Result<RequestContext, AuthFailure> {
        if topology.is_public(path) {
            return Ok(RequestContext::public(topology, request_id));
        }

        let Some(token) = authorization.and_then(BearerToken::from_authorization) else {
            warn!(path = %path, reason = AuthFailure::MissingToken.kind(), "Authentication failed");
            return Err(AuthFailure::MissingToken);
        };

        let Some(target) = topology.credentials().resolve(&token).cloned() else {
            warn!(path = %path, reason = AuthFailure::InvalidToken.kind(), "Authentication failed");
            return Err(AuthFailure::InvalidToken);
        };

        debug!(path = %path, target_name = %target, "Request authenticated");
        Ok(RequestContext::authenticated(topology, target, request_id))
    }
}
