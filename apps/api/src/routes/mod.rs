pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::cv::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/cv/process", post(handlers::handle_process))
        .route("/api/v1/cv/process-text", post(handlers::handle_process_text))
        .route("/api/v1/evidence", post(handlers::handle_evidence))
        .with_state(state)
}
