pub mod health;
pub mod jobs;

use axum::{routing::get, Router};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Pipeline triggers, invoked by the external cron scheduler
        .route("/api/v1/jobs/sync", get(jobs::handle_sync))
        .route("/api/v1/jobs/match", get(jobs::handle_match))
        .with_state(state)
}
