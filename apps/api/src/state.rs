use std::sync::Arc;

use crate::config::Config;
use crate::insights::pipeline::PipelineOptions;
use crate::layout::PageConfig;
use crate::llm_client::GenerationClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// `None` when no API key is configured; generation then answers 503.
    pub llm: Option<Arc<dyn GenerationClient>>,
    pub config: Config,
    /// Attempt bound, per-attempt timeout and backoff for the insights pipeline.
    pub pipeline: PipelineOptions,
    /// Page geometry for the PDF report.
    pub page_config: PageConfig,
}
