//! Remote control endpoints. Each only raises a request and answers at once;
//! none waits for the server to act on it.

use crate::app_state::AppState;

use mcd_supervisor::ShutdownKind;

use axum::{extract::State, http::StatusCode};
use log::{info, warn};

/// GET|POST /webhooks/shutdown
pub async fn shutdown(State(state): State<AppState>) -> String {
    state.shutdown.raise(ShutdownKind::Graceful);
    format!(
        "Shutdown request received. Shutting down in {} seconds...\n",
        state.countdown_secs
    )
}

/// GET|POST /webhooks/shutdown/now
pub async fn shutdown_now(State(state): State<AppState>) -> &'static str {
    state.shutdown.raise(ShutdownKind::Immediate);
    "Shutdown request received. Shutting down server NOW...\n"
}

/// POST /webhooks/msg, plain text body
pub async fn message(
    State(state): State<AppState>,
    body: String,
) -> Result<&'static str, (StatusCode, &'static str)> {
    let text = body.trim();
    if text.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Message body is empty\n"));
    }

    info!("Message requested via webhook");
    state.handle.say(text).await.map_err(|e| {
        warn!("Failed to queue message: {e}");
        (StatusCode::SERVICE_UNAVAILABLE, "Supervisor is not running\n")
    })?;

    Ok("Sending message to players\n")
}
