use crate::{app_state::AppState, health, webhooks};

use axum::{
    Router,
    routing::{get, post},
};

/// Build the webhook router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/webhooks/shutdown",
            get(webhooks::shutdown).post(webhooks::shutdown),
        )
        .route(
            "/webhooks/shutdown/now",
            get(webhooks::shutdown_now).post(webhooks::shutdown_now),
        )
        .route("/webhooks/msg", post(webhooks::message))
        .route("/health", get(health::health))
        .with_state(state)
}
