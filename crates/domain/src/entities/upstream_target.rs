//! Upstream target entity

use url::Url;

use crate::{errors::DomainError, value_objects::BearerToken, value_objects::TargetName};

/// A backend the gateway can forward to
///
/// `token` is the credential the gateway presents *to the upstream*. It is
/// unrelated to the inbound tokens callers use to authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    name: TargetName,
    base_url: String,
    token: BearerToken,
}

impl UpstreamTarget {
    /// Create a new upstream target
    ///
    /// The base URL must be absolute `http` or `https` without query or
    /// fragment. It may carry a path prefix (e.g. `http://localhost:3001/mock`).
    pub fn new(
        name: TargetName,
        base_url: impl Into<String>,
        token: BearerToken,
    ) -> Result<Self, DomainError> {
        let base_url = normalize_base_url(&base_url.into())?;
        Ok(Self {
            name,
            base_url,
            token,
        })
    }

    /// Logical name
    pub const fn name(&self) -> &TargetName {
        &self.name
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Credential presented to the upstream
    pub const fn token(&self) -> &BearerToken {
        &self.token
    }

    /// Whether the upstream is reached over TLS
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Join the base URL with an already rewritten path and query
    pub fn url_for(&self, path_and_query: &str) -> String {
        format!("{}{path_and_query}", self.base_url)
    }
}

fn normalize_base_url(raw: &str) -> Result<String, DomainError> {
    let trimmed = raw.trim();
    let url =
        Url::parse(trimmed).map_err(|e| DomainError::InvalidUrl(format!("'{trimmed}': {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(DomainError::InvalidUrl(format!("'{trimmed}' must use http or https")));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(DomainError::InvalidUrl(format!("'{trimmed}' has no host")));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(DomainError::InvalidUrl(format!(
            "'{trimmed}' must not contain a query or fragment"
        )));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(DomainError::InvalidUrl(format!(
            "'{trimmed}' must not embed credentials"
        )));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}
