//! Health check handlers

use axum::{Json, extract::State};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Gateway health response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    /// Configured default target; changes only on configuration reload
    pub active_target: String,
    /// RFC 3339 UTC timestamp
    pub timestamp: String,
}

/// Mock upstream health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockHealthResponse {
    pub status: String,
    pub timestamp: String,
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Liveness check - is the gateway running?
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        active_target: state.config.topology().default_target().to_string(),
        timestamp: now(),
    })
}

/// Health of the in-process mock upstream
pub async fn mock_health() -> Json<MockHealthResponse> {
    Json(MockHealthResponse {
        status: "ok".to_string(),
        timestamp: now(),
    })
}
