//! Health check handler

/// Liveness probe.
pub async fn health() -> &'static str {
    "OK"
}
