use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

/// GET /debug/health
///
/// Always 200; an unreachable cache marks the service `degraded`.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let (status, cache) = match &state.cache {
        None => ("ok", json!("disabled")),
        Some(cache) if cache.ping().await => (
            "ok",
            json!({ "backend": cache.backend(), "stats": cache.stats().await }),
        ),
        Some(cache) => {
            tracing::warn!("{} road cache failed health check", cache.backend());
            (
                "degraded",
                json!({ "backend": cache.backend(), "error": "unreachable" }),
            )
        }
    };

    Json(json!({ "status": status, "checks": { "cache": cache } }))
}
