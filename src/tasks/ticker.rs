//! Periodic tick resource that drives the countdown

use std::{sync::Arc, time::Duration};
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant},
};
use tracing::{debug, error, info};

use crate::state::AppState;

/// Time between two ticks
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Handle to the running tick task.
///
/// Only one `Ticker` is alive at a time, held by [`AppState`]. Dropping it aborts the task.
#[derive(Debug)]
pub struct Ticker {
    generation: u64,
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Spawn a tick task whose first tick fires one period from now
    pub fn spawn(state: Arc<AppState>, generation: u64) -> Self {
        let handle = tokio::spawn(tick_task(state, generation));
        Self { generation, handle }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
        debug!("Tick task {} released", self.generation);
    }
}

async fn tick_task(state: Arc<AppState>, generation: u64) {
    info!("Starting tick task {}", generation);

    let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);

    loop {
        interval.tick().await;

        match state.apply_tick(generation) {
            Ok(outcome) => {
                if let Some(phase) = outcome.switched_to {
                    // Phase switched, begin a fresh tick cycle for the new countdown
                    debug!("Restarting tick cycle for {}", phase.label());
                    interval.reset();
                }
            }
            Err(e) => {
                error!("Failed to apply tick: {}", e);
            }
        }
    }
}
