mod config;
mod errors;
mod insights;
mod layout;
mod llm_client;
mod render;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::insights::pipeline::PipelineOptions;
use crate::layout::default_page_config;
use crate::llm_client::{GeminiClient, GenerationClient};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed numeric env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Insights API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the generation client; without a key the service still renders reports.
    let llm: Option<Arc<dyn GenerationClient>> = match &config.gemini_api_key {
        Some(key) => {
            let client = GeminiClient::new(
                key.clone(),
                config.gemini_base_url.clone(),
                config.gemini_model.clone(),
            )
            .context("Failed to build Gemini HTTP client")?;
            info!("LLM client initialized (model: {})", client.model());
            Some(Arc::new(client))
        }
        None => {
            warn!("GEMINI_API_KEY not set; /api/generate-insights will answer 503");
            None
        }
    };

    let pipeline = PipelineOptions {
        attempt_timeout: config.llm_timeout,
        ..PipelineOptions::default()
    }
    .with_max_attempts(config.max_attempts);
    info!(
        "Insights pipeline: {} attempts, {}s per attempt",
        pipeline.max_attempts,
        pipeline.attempt_timeout.as_secs()
    );

    let page_config = default_page_config();

    // Build app state
    let state = AppState {
        llm,
        config: config.clone(),
        pipeline,
        page_config,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
