//! Health check endpoint for liveness probes.

/// Returns 200 OK with a plain body while the server is running.
pub async fn health_handler() -> &'static str {
    "OK"
}
