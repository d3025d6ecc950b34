//! Audio failure listener

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::{services::AudioPlaybackFailure, state::AppState};

/// Turn playback failures reported after the fact into the clock's audio error flag
pub async fn audio_failure_task(
    state: Arc<AppState>,
    mut failures: mpsc::UnboundedReceiver<AudioPlaybackFailure>,
) {
    info!("Starting audio failure listener");

    while let Some(failure) = failures.recv().await {
        if let Err(e) = state.report_audio_error(&failure) {
            error!("Failed to record audio error: {}", e);
        }
    }

    debug!("Audio failure channel closed, listener exiting");
}
