//! Upstream forwarding port
//!
//! Defines how the gateway hands a fully prepared request to an upstream
//! service and receives its answer.

use async_trait::async_trait;
use bytes::Bytes;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// A request ready to be sent upstream
///
/// Headers are already filtered and carry the upstream credential.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    /// HTTP method (e.g. `POST`)
    pub method: String,
    /// Absolute upstream URL including the rewritten path and query
    pub url: String,
    /// Headers to send, in order; values are raw bytes
    pub headers: Vec<(String, Bytes)>,
    /// Body bytes, `None` when the inbound request had no body
    pub body: Option<Bytes>,
}

impl ForwardRequest {
    /// Value of the first header named `name` (case-insensitive), if UTF-8
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        header_value(&self.headers, name)
    }
}

/// The upstream's answer
#[derive(Debug, Clone)]
pub struct ForwardResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers; values are raw bytes
    pub headers: Vec<(String, Bytes)>,
    /// Response body
    pub body: Bytes,
}

impl ForwardResponse {
    /// Value of the first header named `name` (case-insensitive), if UTF-8
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        header_value(&self.headers, name)
    }
}

fn header_value<'a>(headers: &'a [(String, Bytes)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .and_then(|(_, v)| std::str::from_utf8(v).ok())
}

/// Port for sending a request to an upstream service
///
/// Implementations make exactly one attempt. Connection failures map to
/// [`ApplicationError::UpstreamUnreachable`] and timeouts to
/// [`ApplicationError::UpstreamTimeout`]; any HTTP status the upstream
/// returns, including 5xx, is a successful [`ForwardResponse`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UpstreamPort: Send + Sync {
    /// Send the request and wait for the complete response
    async fn forward(&self, request: ForwardRequest) -> Result<ForwardResponse, ApplicationError>;
}
