use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Service status plus the active question source, so a glance shows
/// whether the deployment is running LLM-backed or rule-based.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let source = serde_json::to_value(state.questions.model_info()).unwrap_or(Value::Null);
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "interview-api",
        "question_source": source,
    }))
}
