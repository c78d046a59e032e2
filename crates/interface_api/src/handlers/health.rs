//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use futures::future::join_all;
use serde::Serialize;
use tracing::warn;

use core_kernel::HealthCheckResult;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<HealthCheckResult>,
}

/// Liveness probe
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: Vec::new(),
    })
}

/// Readiness probe; fails when any dependency is unhealthy
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let checks = join_all(state.probes.iter().map(|probe| probe.health_check())).await;

    let ready = checks.iter().all(HealthCheckResult::is_operational);
    if !ready {
        for check in checks.iter().filter(|c| !c.is_operational()) {
            warn!(adapter = %check.adapter_id, message = ?check.message, "Dependency unhealthy");
        }
    }

    let (status, label) = if ready {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };

    (
        status,
        Json(HealthResponse {
            status: label.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            checks,
        }),
    )
}
