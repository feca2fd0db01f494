//! Axum route handler for insight generation.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::insights::normalizer::{normalize_results, structure_screen_answers};
use crate::insights::persist::save_insights;
use crate::insights::pipeline::generate_insights;
use crate::insights::validator::InsightsReport;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateInsightsRequest {
    #[serde(default)]
    pub test_results: Option<Map<String, Value>>,
    /// Signed so that zero and negative values reach validation instead of the extractor.
    /// Capped at the configured `INSIGHTS_MAX_ATTEMPTS`.
    #[serde(default)]
    pub max_attempts: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct GenerateInsightsResponse {
    pub success: bool,
    pub insights: InsightsReport,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/generate-insights
///
/// Structures screen answers, normalizes them and runs the retrying pipeline.
/// The latest successful report is also written to `INSIGHTS_LOG_PATH`.
pub async fn handle_generate_insights(
    State(state): State<AppState>,
    Json(request): Json<GenerateInsightsRequest>,
) -> Result<Json<GenerateInsightsResponse>, AppError> {
    let test_results = request
        .test_results
        .filter(|results| !results.is_empty())
        .ok_or_else(|| {
            AppError::Validation("testResults is required and must be a non-empty object".to_string())
        })?;

    let ceiling = state.pipeline.max_attempts.max(1);
    let options = match request.max_attempts {
        Some(n) if n < 1 => {
            return Err(AppError::Validation("maxAttempts must be at least 1".to_string()));
        }
        Some(n) if n > i64::from(ceiling) => {
            return Err(AppError::Validation(format!(
                "maxAttempts must be at most {ceiling}"
            )));
        }
        Some(n) => state.pipeline.with_max_attempts(n as u32),
        None => state.pipeline,
    };

    let llm = state.llm.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("GEMINI_API_KEY is not configured".to_string())
    })?;

    let request_id = Uuid::new_v4();
    info!(
        %request_id,
        tests = test_results.len(),
        max_attempts = options.max_attempts,
        "Generating insights"
    );

    let structured = structure_screen_answers(&test_results);
    let results = normalize_results(&structured);
    let report = generate_insights(llm.as_ref(), &results, &options).await?;

    if let Err(e) = save_insights(&state.config.insights_log_path, &report).await {
        warn!(%request_id, "Failed to persist latest insights: {e:#}");
    }

    Ok(Json(GenerateInsightsResponse {
        success: true,
        insights: report,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::insights::pipeline::tests::{ScriptedClient, VALID_MINIMAL};
    use crate::llm_client::GenerationClient;
    use crate::routes::{build_router, tests::test_state};

    fn post(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/generate-insights")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_success_returns_report_and_persists_it() {
        let dir = tempfile::tempdir().unwrap();
        let client = Arc::new(ScriptedClient::new(vec![Ok(VALID_MINIMAL.to_string())]));
        let state = test_state(Some(client.clone() as Arc<dyn GenerationClient>), dir.path());
        let log_path = state.config.insights_log_path.clone();

        let response = build_router(state)
            .oneshot(post(json!({"testResults": {"mbtiScreen": "INTJ"}})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert!(body["insights"]["roadmap"].is_object());

        let prompts = client.prompts.lock().unwrap();
        assert!(prompts[0].contains("selected_option: INTJ"));
        assert!(log_path.exists());
    }

    #[tokio::test]
    async fn test_missing_results_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let client: Arc<dyn GenerationClient> = Arc::new(ScriptedClient::always_failing());
        let app = build_router(test_state(Some(client), dir.path()));

        let response = app.oneshot(post(json!({"testResults": {}}))).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_zero_max_attempts_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let client: Arc<dyn GenerationClient> = Arc::new(ScriptedClient::always_failing());
        let app = build_router(test_state(Some(client), dir.path()));

        let response = app
            .oneshot(post(json!({"testResults": {"mbtiScreen": "INTJ"}, "maxAttempts": 0})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_max_attempts_above_ceiling_is_400_without_model_calls() {
        let dir = tempfile::tempdir().unwrap();
        let client = Arc::new(ScriptedClient::always_failing());
        let state = test_state(Some(client.clone() as Arc<dyn GenerationClient>), dir.path());
        let ceiling = state.pipeline.max_attempts;

        let response = build_router(state)
            .oneshot(post(json!({"testResults": {"mbtiScreen": "INTJ"}, "maxAttempts": 500})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(
            body["error"]["message"],
            format!("maxAttempts must be at most {ceiling}")
        );
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_max_attempts_at_ceiling_is_honoured() {
        let dir = tempfile::tempdir().unwrap();
        let client = Arc::new(ScriptedClient::always_failing());
        let state = test_state(Some(client.clone() as Arc<dyn GenerationClient>), dir.path());
        let ceiling = state.pipeline.max_attempts;

        let response = build_router(state)
            .oneshot(post(json!({"testResults": {"mbtiScreen": "INTJ"}, "maxAttempts": ceiling})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(client.calls(), ceiling);
    }

    #[tokio::test]
    async fn test_no_model_configured_is_503() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(None, dir.path()));

        let response = app
            .oneshot(post(json!({"testResults": {"mbtiScreen": "INTJ"}})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["success"], false);
    }

    #[tokio::test]
    async fn test_exhaustion_is_502_with_retry_hint() {
        let dir = tempfile::tempdir().unwrap();
        let client = Arc::new(ScriptedClient::new(vec![
            Ok("not json".to_string()),
            Ok("{}".to_string()),
        ]));
        let state = test_state(Some(client.clone() as Arc<dyn GenerationClient>), dir.path());
        let log_path = state.config.insights_log_path.clone();

        let response = build_router(state)
            .oneshot(post(json!({"testResults": {"mbtiScreen": "INTJ"}, "maxAttempts": 2})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["retry_suggested"], true);
        assert_eq!(body["attempts"], 2);
        assert_eq!(body["last_error_kind"], "SchemaViolation");
        assert_eq!(client.calls(), 2);
        assert!(!log_path.exists());
    }
}
