//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{error, info};

use crate::state::{AppState, ClockSnapshot};
use super::responses::{ClockResponse, HealthResponse, StatusResponse};

/// Turn the outcome of a clock action into a response
fn respond(
    action: &str,
    message: &str,
    result: Result<ClockSnapshot, String>,
) -> Result<Json<ClockResponse>, StatusCode> {
    match result {
        Ok(clock) => {
            info!("{} endpoint called - {} ({})", action, message, clock.time_left);
            Ok(Json(ClockResponse::new(message.to_string(), clock)))
        }
        Err(e) => {
            error!("Failed to handle {}: {}", action, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /break/increment - Lengthen the break by a minute
pub async fn break_increment_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClockResponse>, StatusCode> {
    respond("break-increment", "Break length incremented", state.increment_break())
}

/// Handle POST /break/decrement - Shorten the break by a minute
pub async fn break_decrement_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClockResponse>, StatusCode> {
    respond("break-decrement", "Break length decremented", state.decrement_break())
}

/// Handle POST /session/increment - Lengthen the session by a minute
pub async fn session_increment_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClockResponse>, StatusCode> {
    respond("session-increment", "Session length incremented", state.increment_session())
}

/// Handle POST /session/decrement - Shorten the session by a minute
pub async fn session_decrement_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClockResponse>, StatusCode> {
    respond("session-decrement", "Session length decremented", state.decrement_session())
}

/// Handle POST /start_stop - Start when paused, pause when running
pub async fn start_stop_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClockResponse>, StatusCode> {
    let result = state.toggle();
    let message = match &result {
        Ok(clock) if clock.running => "Clock started",
        _ => "Clock paused",
    };
    respond("start_stop", message, result)
}

/// Handle POST /start - Start the countdown
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClockResponse>, StatusCode> {
    respond("start", "Clock started", state.start())
}

/// Handle POST /stop - Pause the countdown
pub async fn stop_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClockResponse>, StatusCode> {
    respond("stop", "Clock paused", state.stop())
}

/// Handle POST /reset - Restore the initial clock
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClockResponse>, StatusCode> {
    respond("reset", "Clock reset", state.reset())
}

/// Handle GET /status - Return the current clock and server metadata
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let clock = match state.snapshot() {
        Ok(clock) => clock,
        Err(e) => {
            error!("Failed to get clock snapshot: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        clock,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
