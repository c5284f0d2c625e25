use super::handlers;
use super::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Audio uploads can be large; the axum default (2 MB) is too tight.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Clip transcription and analysis
        .route("/transcribe", post(handlers::transcribe))
        // Live recognition control
        .route("/listen", post(handlers::listen))
        // Report delivery
        .route("/send_email", post(handlers::send_email))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        // Browser clients call from a different origin
        .layer(CorsLayer::permissive())
        .with_state(state)
}
