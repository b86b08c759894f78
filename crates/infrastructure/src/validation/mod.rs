//! Configuration validation module
//!
//! Provides security validation and startup checks for the gateway configuration.

pub mod security;

pub use security::{ALLOW_INSECURE_ENV, SecurityValidator, SecurityWarning, WarningSeverity};
