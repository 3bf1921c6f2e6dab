use axum::Json;
use serde_json::{json, Value};
use tracing::instrument;

/// Handler for the API root
///
/// This function handles GET requests to `/`.
///
/// ### Returns
///
/// A welcome message as JSON
#[instrument]
pub async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "Welcome to the CulinAIry Agentic API" }))
}

/// Handler for the liveness probe
///
/// This function handles GET requests to `/health`.
#[instrument]
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
