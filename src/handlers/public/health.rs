// handlers/public/health.rs - GET /health handler

/// Liveness probe. Answers without touching the store.
pub async fn health() -> &'static str {
    "healthy"
}
