use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /api/health
/// Reports service version and whether a generation model is configured.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let model = state.llm.as_ref().map(|llm| llm.model().to_string());
    Json(json!({
        "status": "healthy",
        "ai_generator_available": model.is_some(),
        "model": model,
        "version": env!("CARGO_PKG_VERSION"),
        "service": env!("CARGO_PKG_NAME")
    }))
}
