//! HTTP API module
//!
//! This module contains the clock's control endpoints and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/break/increment", post(break_increment_handler))
        .route("/break/decrement", post(break_decrement_handler))
        .route("/session/increment", post(session_increment_handler))
        .route("/session/decrement", post(session_decrement_handler))
        .route("/start_stop", post(start_stop_handler))
        .route("/start", post(start_handler))
        .route("/stop", post(stop_handler))
        .route("/reset", post(reset_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::services::audio::testing::RecordingSound;

    fn test_router() -> (Router, Arc<AppState>) {
        let state = Arc::new(AppState::new(
            Arc::new(RecordingSound::default()),
            20525,
            "127.0.0.1".to_string(),
        ));
        (create_router(Arc::clone(&state)), state)
    }

    async fn call(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn status_reports_initial_clock() {
        let (app, _) = test_router();
        let (status, body) = call(&app, "GET", "/status").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["clock"]["timer_label"], "Session");
        assert_eq!(body["clock"]["time_left"], "25:00");
        assert_eq!(body["clock"]["break_length"], 5);
        assert_eq!(body["clock"]["session_length"], 25);
        assert_eq!(body["clock"]["start_stop_label"], "Start");
        assert_eq!(body["clock"]["audio_error_message"], Value::Null);
        assert_eq!(body["last_action"], Value::Null);
    }

    #[tokio::test]
    async fn session_increment_moves_paused_countdown() {
        let (app, _) = test_router();
        let (status, body) = call(&app, "POST", "/session/increment").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "paused");
        assert_eq!(body["clock"]["session_length"], 26);
        assert_eq!(body["clock"]["remaining_seconds"], 1560);
        assert_eq!(body["clock"]["time_left"], "26:00");
    }

    #[tokio::test]
    async fn break_decrement_stops_at_one_minute() {
        let (app, _) = test_router();
        for _ in 0..10 {
            let (status, _) = call(&app, "POST", "/break/decrement").await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, body) = call(&app, "GET", "/status").await;
        assert_eq!(body["clock"]["break_length"], 1);
        assert_eq!(body["last_action"], "break-decrement");
    }

    #[tokio::test]
    async fn start_stop_toggles() {
        let (app, state) = test_router();

        let (_, body) = call(&app, "POST", "/start_stop").await;
        assert_eq!(body["status"], "running");
        assert_eq!(body["message"], "Clock started");
        assert_eq!(body["clock"]["start_stop_label"], "Pause");
        assert!(state.has_ticker().unwrap());

        let (_, body) = call(&app, "POST", "/start_stop").await;
        assert_eq!(body["status"], "paused");
        assert_eq!(body["clock"]["start_stop_label"], "Start");
        assert!(!state.has_ticker().unwrap());
    }

    #[tokio::test]
    async fn reset_restores_defaults() {
        let (app, state) = test_router();
        call(&app, "POST", "/break/increment").await;
        call(&app, "POST", "/session/decrement").await;
        call(&app, "POST", "/start").await;

        let (status, body) = call(&app, "POST", "/reset").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "paused");
        assert_eq!(body["clock"]["break_length"], 5);
        assert_eq!(body["clock"]["session_length"], 25);
        assert_eq!(body["clock"]["remaining_seconds"], 1500);
        assert_eq!(body["clock"]["timer_label"], "Session");
        assert!(!state.has_ticker().unwrap());
    }

    #[tokio::test]
    async fn audio_error_is_shown_until_reset() {
        let (app, state) = test_router();
        state
            .report_audio_error(&crate::services::AudioPlaybackFailure::new("no device"))
            .unwrap();

        let (_, body) = call(&app, "GET", "/status").await;
        assert_eq!(body["clock"]["audio_error"], true);
        assert_eq!(
            body["clock"]["audio_error_message"],
            "Failed to load the audio file. Please check the file or your connection."
        );

        let (_, body) = call(&app, "POST", "/reset").await;
        assert_eq!(body["clock"]["audio_error"], false);
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (app, _) = test_router();
        let (status, body) = call(&app, "GET", "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
