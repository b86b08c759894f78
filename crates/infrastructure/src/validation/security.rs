//! Security validation for application configuration
//!
//! Validates configuration for security issues and provides warnings at startup.
//! Critical issues in production will prevent startup unless explicitly allowed.

use std::fmt;

use reqwest::Url;
use secrecy::ExposeSecret;

use crate::config::{AppConfig, ServerConfig};

/// Environment variable that lets production start despite critical findings
pub const ALLOW_INSECURE_ENV: &str = "RAILMADAD_ALLOW_INSECURE_CONFIG";

/// Inbound tokens shorter than this are flagged
const MIN_TOKEN_LEN: usize = 16;

/// Severity level for security warnings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WarningSeverity {
    /// Informational - no action required
    Info,
    /// Warning - should be addressed but not critical
    Warning,
    /// Critical - must be addressed in production
    Critical,
}

impl fmt::Display for WarningSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// A security warning with severity and description
#[derive(Debug, Clone)]
pub struct SecurityWarning {
    /// Severity level of the warning
    pub severity: WarningSeverity,
    /// Short code identifying the warning type
    pub code: String,
    /// Human-readable description of the issue
    pub message: String,
    /// Recommended action to resolve the issue
    pub recommendation: String,
}

impl SecurityWarning {
    /// Create a new security warning
    #[must_use]
    pub fn new(
        severity: WarningSeverity,
        code: impl Into<String>,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            code: code.into(),
            message: message.into(),
            recommendation: recommendation.into(),
        }
    }

    /// Create a warning-level issue
    #[must_use]
    pub fn warning(
        code: impl Into<String>,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self::new(WarningSeverity::Warning, code, message, recommendation)
    }

    /// Check if this warning is critical
    #[must_use]
    pub const fn is_critical(&self) -> bool {
        matches!(self.severity, WarningSeverity::Critical)
    }
}

impl fmt::Display for SecurityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} - {}",
            self.severity, self.code, self.message, self.recommendation
        )
    }
}

/// Validates application configuration for security issues
#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityValidator;

impl SecurityValidator {
    /// Validate configuration and return all security warnings
    ///
    /// Returns a list of warnings sorted by severity (critical first).
    #[must_use]
    pub fn validate(config: &AppConfig) -> Vec<SecurityWarning> {
        let mut warnings = Vec::new();
        let is_production = config.is_production();

        Self::check_tls_verification(config, is_production, &mut warnings);
        Self::check_cors_configuration(config, is_production, &mut warnings);
        Self::check_credentials(config, is_production, &mut warnings);
        Self::check_token_reuse(config, is_production, &mut warnings);
        Self::check_upstream_transport(config, is_production, &mut warnings);

        // Sort by severity (critical first)
        warnings.sort_by(|a, b| b.severity.cmp(&a.severity));

        warnings
    }

    /// Check if startup should be blocked due to critical security issues
    ///
    /// Returns `true` if the server should refuse to start.
    #[must_use]
    pub fn should_block_startup(config: &AppConfig, warnings: &[SecurityWarning]) -> bool {
        let allow_insecure = std::env::var(ALLOW_INSECURE_ENV)
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Self::blocks_startup(config.is_production(), warnings, allow_insecure)
    }

    fn blocks_startup(
        is_production: bool,
        warnings: &[SecurityWarning],
        allow_insecure: bool,
    ) -> bool {
        let has_critical = warnings.iter().any(SecurityWarning::is_critical);
        is_production && has_critical && !allow_insecure
    }

    /// Log all warnings using tracing
    pub fn log_warnings(warnings: &[SecurityWarning]) {
        for warning in warnings {
            match warning.severity {
                WarningSeverity::Critical => {
                    tracing::error!(
                        code = %warning.code,
                        message = %warning.message,
                        recommendation = %warning.recommendation,
                        "Security configuration issue"
                    );
                },
                WarningSeverity::Warning => {
                    tracing::warn!(
                        code = %warning.code,
                        message = %warning.message,
                        recommendation = %warning.recommendation,
                        "Security configuration warning"
                    );
                },
                WarningSeverity::Info => {
                    tracing::info!(
                        code = %warning.code,
                        message = %warning.message,
                        recommendation = %warning.recommendation,
                        "Security configuration notice"
                    );
                },
            }
        }
    }

    const fn escalate(is_production: bool, otherwise: WarningSeverity) -> WarningSeverity {
        if is_production {
            WarningSeverity::Critical
        } else {
            otherwise
        }
    }

    fn check_tls_verification(
        config: &AppConfig,
        is_production: bool,
        warnings: &mut Vec<SecurityWarning>,
    ) {
        if config.upstream.accept_invalid_certs {
            warnings.push(SecurityWarning::new(
                Self::escalate(is_production, WarningSeverity::Warning),
                "SEC001",
                "Upstream TLS certificate verification is disabled",
                "Set upstream.accept_invalid_certs = false to prevent MITM attacks",
            ));
        }
    }

    fn check_cors_configuration(
        config: &AppConfig,
        is_production: bool,
        warnings: &mut Vec<SecurityWarning>,
    ) {
        if config.server.allowed_origins.is_empty() || config.server.allows_any_origin() {
            warnings.push(SecurityWarning::new(
                Self::escalate(is_production, WarningSeverity::Info),
                "SEC002",
                "CORS accepts credentialed requests from any origin",
                "Specify server.allowed_origins in production to restrict cross-origin requests",
            ));
        }
    }

    fn check_credentials(
        config: &AppConfig,
        is_production: bool,
        warnings: &mut Vec<SecurityWarning>,
    ) {
        let credentials = &config.gateway.credentials;

        if credentials.is_empty() {
            let severity = if is_production {
                WarningSeverity::Warning
            } else {
                WarningSeverity::Info
            };

            warnings.push(SecurityWarning::new(
                severity,
                "SEC003",
                "No inbound credentials configured; every protected request will be rejected",
                "Add [[gateway.credentials]] entries (see `railmadad-cli generate-token`)",
            ));
        }

        let short = credentials
            .iter()
            .filter(|entry| entry.token.expose_secret().len() < MIN_TOKEN_LEN)
            .count();
        if short > 0 {
            warnings.push(SecurityWarning::new(
                Self::escalate(is_production, WarningSeverity::Warning),
                "SEC004",
                format!("{short} inbound token(s) shorter than {MIN_TOKEN_LEN} characters"),
                "Use long random tokens, e.g. from `railmadad-cli generate-token`",
            ));
        }
    }

    fn check_token_reuse(
        config: &AppConfig,
        is_production: bool,
        warnings: &mut Vec<SecurityWarning>,
    ) {
        let reused = config.gateway.credentials.iter().any(|entry| {
            config.gateway.targets.iter().any(|(name, target)| {
                target.token.expose_secret() == entry.token.expose_secret()
                    && !(entry.target.eq_ignore_ascii_case(name)
                        && is_self_loopback(&target.base_url, &config.server))
            })
        });

        if reused {
            warnings.push(SecurityWarning::new(
                Self::escalate(is_production, WarningSeverity::Warning),
                "SEC005",
                "An inbound token is also used as an upstream credential",
                "Give callers and upstreams distinct tokens",
            ));
        }
    }

    fn check_upstream_transport(
        config: &AppConfig,
        is_production: bool,
        warnings: &mut Vec<SecurityWarning>,
    ) {
        if !is_production {
            return;
        }
        // An invalid topology fails startup on its own
        let Ok(topology) = config.topology() else {
            return;
        };

        for target in topology.routing().iter() {
            if !target.is_https() && !is_self_loopback(target.base_url(), &config.server) {
                warnings.push(SecurityWarning::warning(
                    "SEC006",
                    format!("Upstream '{}' is reached over plain HTTP", target.name()),
                    "Use https:// for upstreams outside the local network",
                ));
            }
        }
    }
}

/// Whether `base_url` points back at this gateway's own `/mock` mount
///
/// Such a target is answered by the in-process mock, so its upstream
/// credential has to be an inbound token bound to that same target.
fn is_self_loopback(base_url: &str, server: &ServerConfig) -> bool {
    let Ok(url) = Url::parse(base_url.trim()) else {
        return false;
    };
    let local_host = matches!(
        url.host_str(),
        Some("localhost" | "127.0.0.1" | "[::1]")
    );
    local_host
        && url.port_or_known_default() == Some(server.port)
        && (url.path() == "/mock" || url.path().starts_with("/mock/"))
}
