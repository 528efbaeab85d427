use crate::app_state::AppState;

use mcd_supervisor::SupervisorState;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// GET /health - 200 while the server runs or an update restart is under way,
/// 503 otherwise. Every call is also reported to the notifier.
pub async fn health(State(state): State<AppState>) -> Response {
    let healthy = state.handle.health_check().await;
    let status = state.handle.status();

    let phase = match &status.state {
        SupervisorState::Absent => "absent",
        SupervisorState::Installing => "installing",
        SupervisorState::Running { .. } => "running",
        SupervisorState::ShuttingDown { .. } => "shutting_down",
        SupervisorState::Updating { .. } => "updating",
    };

    let body = json!({
        "status": if healthy { "healthy" } else { "unhealthy" },
        "state": phase,
        "server_version": status.version().map(|v| v.to_string()),
        "update_pending": status.update_pending,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    let code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(body)).into_response()
}
