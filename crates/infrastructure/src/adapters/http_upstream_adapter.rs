//! HTTP upstream adapter - Implements UpstreamPort using reqwest

use std::time::Duration;

use application::{
    error::ApplicationError,
    ports::{ForwardRequest, ForwardResponse, UpstreamPort},
};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{
    Client, Method,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use tracing::{debug, instrument, warn};

use crate::config::UpstreamConfig;

/// Forwards prepared requests over HTTP
///
/// Holds one pooled `reqwest::Client` shared by all targets. Each call makes
/// exactly one attempt bounded by the configured timeout.
#[derive(Debug, Clone)]
pub struct HttpUpstreamAdapter {
    client: Client,
    timeout: Duration,
}

impl HttpUpstreamAdapter {
    /// Create an adapter from the upstream configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn new(config: &UpstreamConfig) -> Result<Self, ApplicationError> {
        if config.accept_invalid_certs {
            warn!("Upstream TLS certificate verification is disabled");
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            timeout: config.timeout(),
        })
    }

    /// Configured request timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    fn timeout_millis(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Map a reqwest error to the gateway's upstream failure kinds
    fn map_error(&self, err: &reqwest::Error) -> ApplicationError {
        // A connect timeout reports both flags; it is still an unreachable upstream
        if err.is_connect() {
            ApplicationError::UpstreamUnreachable(format!("connection failed: {err}"))
        } else if err.is_timeout() {
            ApplicationError::UpstreamTimeout(self.timeout_millis())
        } else if err.is_builder() {
            ApplicationError::Internal(format!("could not build upstream request: {err}"))
        } else {
            ApplicationError::UpstreamUnreachable(err.to_string())
        }
    }

    fn header_map(headers: &[(String, Bytes)]) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_bytes(value),
            ) {
                (Ok(name), Ok(value)) => {
                    map.append(name, value);
                },
                _ => debug!(header = %name, "Skipping header that is not valid HTTP"),
            }
        }
        map
    }
}

#[async_trait]
impl UpstreamPort for HttpUpstreamAdapter {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn forward(&self, request: ForwardRequest) -> Result<ForwardResponse, ApplicationError> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| ApplicationError::InvalidRequest(e.to_string()))?;

        let mut builder = self
            .client
            .request(method, &request.url)
            .headers(Self::header_map(&request.headers));
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| self.map_error(&e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    Bytes::copy_from_slice(value.as_bytes()),
                )
            })
            .collect();
        let body = response.bytes().await.map_err(|e| self.map_error(&e))?;

        debug!(status, body_bytes = body.len(), "Upstream response received");

        Ok(ForwardResponse {
            status,
            headers,
            body,
        })
    }
}
