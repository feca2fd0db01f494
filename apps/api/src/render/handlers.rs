//! Axum route handlers for the report documents.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::layout::paginate;
use crate::render::document::{build_document, REPORT_TITLE};
use crate::render::markdown::render_markdown;
use crate::render::pdf::{write_pdf, RenderError};
use crate::render::sections::ReportView;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    #[serde(default)]
    pub test_results: Option<Map<String, Value>>,
    #[serde(default)]
    pub ai_insights: Option<Value>,
}

impl ReportRequest {
    fn insights_view(&self) -> Option<ReportView> {
        match &self.ai_insights {
            None | Some(Value::Null) => None,
            Some(value) => Some(ReportView::from_value(value)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MarkdownResponse {
    pub success: bool,
    pub markdown: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/generate-markdown
///
/// Missing `testResults` renders as an empty results section.
pub async fn handle_generate_markdown(
    Json(request): Json<ReportRequest>,
) -> Result<Json<MarkdownResponse>, AppError> {
    let view = request.insights_view();
    let test_results = request.test_results.unwrap_or_default();

    let blocks = build_document(&test_results, view.as_ref(), Local::now().naive_local());
    let markdown = render_markdown(&blocks);
    debug!("Rendered markdown report ({} bytes)", markdown.len());

    Ok(Json(MarkdownResponse {
        success: true,
        markdown,
    }))
}

/// POST /api/download-report
///
/// Lays out and encodes the PDF on the blocking pool; returns it as an attachment.
pub async fn handle_download_report(
    State(state): State<AppState>,
    Json(request): Json<ReportRequest>,
) -> Result<Response, AppError> {
    let view = request.insights_view();
    let test_results = request
        .test_results
        .ok_or_else(|| AppError::Validation("Invalid request. testResults required.".to_string()))?;

    let now = Local::now().naive_local();
    let filename = format!("psychological_report_{}.pdf", now.format("%Y%m%d_%H%M%S"));
    let page_config = state.page_config.clone();

    let bytes = tokio::task::spawn_blocking(move || {
        let blocks = build_document(&test_results, view.as_ref(), now);
        let pages = paginate(&blocks, &page_config);
        write_pdf(&pages, &page_config, REPORT_TITLE)
    })
    .await
    .map_err(|e| RenderError::Task(e.to_string()))??;

    info!("Generated PDF report {filename} ({} bytes)", bytes.len());

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
