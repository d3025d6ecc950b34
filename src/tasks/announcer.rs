//! Display-side listener that logs what a viewer of the clock would notice

use std::sync::Arc;
use tracing::{info, warn};

use crate::state::AppState;

/// Follow clock snapshots and log phase switches, the final countdown and audio errors
pub async fn announcer_task(state: Arc<AppState>) {
    let mut updates = state.subscribe();
    let mut previous = updates.borrow_and_update().clone();

    while updates.changed().await.is_ok() {
        let current = updates.borrow_and_update().clone();

        if current.phase != previous.phase {
            info!("{} started: {}", current.timer_label, current.time_left);
        }
        if current.final_countdown && !previous.final_countdown && current.running {
            info!("{} ends in {}", current.timer_label, current.time_left);
        }
        if current.audio_error && !previous.audio_error {
            if let Some(message) = &current.audio_error_message {
                warn!("{}", message);
            }
        }

        previous = current;
    }
}
