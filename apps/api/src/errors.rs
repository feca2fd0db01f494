use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::insights::errors::InsightGenerationFailed;
use crate::render::pdf::RenderError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("AI generator not available: {0}")]
    ServiceUnavailable(String),

    #[error(transparent)]
    InsightGeneration(#[from] InsightGenerationFailed),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "AI_UNAVAILABLE",
                msg.clone(),
            ),
            AppError::InsightGeneration(failure) => {
                tracing::error!(
                    attempts = failure.attempts,
                    kind = failure.last_error.kind(),
                    "Insight generation failed: {failure}"
                );
                (
                    StatusCode::BAD_GATEWAY,
                    "INSIGHT_GENERATION_FAILED",
                    failure.to_string(),
                )
            }
            AppError::Render(e) => {
                tracing::error!("Render error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    "Failed to render the report".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut body = json!({
            "success": false,
            "error": {
                "code": code,
                "message": message
            }
        });
        if let (AppError::InsightGeneration(failure), Value::Object(map)) = (&self, &mut body) {
            map.insert("retry_suggested".into(), json!(true));
            map.insert("attempts".into(), json!(failure.attempts));
            map.insert("last_error_kind".into(), json!(failure.last_error.kind()));
        }

        (status, Json(body)).into_response()
    }
}
