pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::pipeline::handlers;
use crate::state::AppState;

/// Uploaded images and audio clips must fit within the request body.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/capabilities", get(handlers::handle_capabilities))
        .route(
            "/api/v1/transcriptions",
            post(handlers::handle_transcription),
        )
        .route(
            "/api/v1/recommendations",
            post(handlers::handle_recommendations),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
