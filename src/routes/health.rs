//! Health check endpoints
//!
//! - /health, /healthz - Liveness probe
//! - /version - Build information

use hyper::{Response, StatusCode};
use serde::Serialize;

use super::{json_response, FullBody};
use crate::server::AppState;

/// Liveness response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always true while the process answers
    pub healthy: bool,
    pub status: &'static str,
    pub version: &'static str,
    /// Seconds since the server started
    pub uptime: u64,
    pub timestamp: String,
    /// "development" or "production"
    pub mode: &'static str,
    pub node_id: String,
    /// Storage backend in use ("mongodb" or "memory")
    pub store: &'static str,
    pub token_mode: &'static str,
}

fn build_health_response(state: &AppState) -> HealthResponse {
    let args = &state.args;

    HealthResponse {
        healthy: true,
        status: "online",
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        mode: if args.dev_mode {
            "development"
        } else {
            "production"
        },
        node_id: args.node_id.to_string(),
        store: state.service.store().backend(),
        token_mode: state.service.resolver().mode().as_str(),
    }
}

/// Handle liveness probe (/health, /healthz)
pub fn health_check(state: &AppState) -> Response<FullBody> {
    json_response(StatusCode::OK, &build_health_response(state))
}

/// Version information for deployment verification
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub name: &'static str,
    pub version: &'static str,
}

/// Handle version endpoint (/version)
pub fn version_info() -> Response<FullBody> {
    json_response(
        StatusCode::OK,
        &VersionResponse {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}
