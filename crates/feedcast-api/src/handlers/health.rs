//! Liveness handler.

/// GET /ping - Liveness probe.
pub async fn ping() -> &'static str {
    "PONG"
}
