//! API middleware

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn};

/// Audit logging middleware
///
/// Logs method, path, status and latency of every request. Server errors
/// are logged at `warn`.
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let duration_ms = start.elapsed().as_millis() as u64;

    if status.is_server_error() {
        warn!(method = %method, uri = %uri, status = status.as_u16(), duration_ms, "API request failed");
    } else {
        info!(method = %method, uri = %uri, status = status.as_u16(), duration_ms, "API request");
    }

    response
}
