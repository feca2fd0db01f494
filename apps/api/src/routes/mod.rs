pub mod health;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::insights::handlers as insights;
use crate::render::handlers as render;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Front-end assets; directory requests resolve to index.html.
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/api/health", get(health::health_handler))
        .route(
            "/api/generate-insights",
            post(insights::handle_generate_insights),
        )
        .route(
            "/api/generate-markdown",
            post(render::handle_generate_markdown),
        )
        .route("/api/download-report", post(render::handle_download_report))
        .fallback_service(static_files)
        .with_state(state)
}
