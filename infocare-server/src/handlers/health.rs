use axum::response::Json;
use serde_json::{json, Value};

/// Liveness probe (GET /health)
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "infocare",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
