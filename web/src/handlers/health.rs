//! Health check endpoint.
//!
//! Used by load balancers and the saga orchestrator's readiness probes.

use axum::http::StatusCode;

/// Liveness check (§6: every authority exposes `GET /health`).
///
/// Returns 200 OK without touching the database or event bus — a process
/// that can't reach Postgres still answers this so it isn't torn down by an
/// orchestrator mid-incident.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_ok() {
        let (status, body) = health_check().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }
}
