//! Main application state management

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    services::{AlertSound, AudioPlaybackFailure},
    tasks::Ticker,
};
use super::{ClockSnapshot, TickOutcome, TimerEngine};

/// Main application state that owns the clock engine and its tick resource
#[derive(Debug)]
pub struct AppState {
    /// The countdown engine; every mutation happens under this lock
    engine: Mutex<TimerEngine>,
    /// Tick resource, present only while the clock runs
    ticker: Mutex<Option<Ticker>>,
    next_generation: AtomicU64,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Channel publishing every new clock snapshot
    pub clock_update_tx: watch::Sender<ClockSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    pub _clock_update_rx: watch::Receiver<ClockSnapshot>,
}

impl AppState {
    /// Create a new AppState with a paused default clock
    pub fn new(sound: Arc<dyn AlertSound>, port: u16, host: String) -> Self {
        let engine = TimerEngine::new(sound);
        let (clock_update_tx, clock_update_rx) = watch::channel(engine.snapshot());

        Self {
            engine: Mutex::new(engine),
            ticker: Mutex::new(None),
            next_generation: AtomicU64::new(0),
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            clock_update_tx,
            _clock_update_rx: clock_update_rx,
        }
    }

    fn lock_engine(&self) -> Result<MutexGuard<'_, TimerEngine>, String> {
        self.engine
            .lock()
            .map_err(|e| format!("Failed to lock timer engine: {}", e))
    }

    fn lock_ticker(&self) -> Result<MutexGuard<'_, Option<Ticker>>, String> {
        self.ticker
            .lock()
            .map_err(|e| format!("Failed to lock ticker: {}", e))
    }

    /// Apply a user action to the engine, then record and publish the result
    pub fn update_clock<F>(&self, action: &str, updater: F) -> Result<ClockSnapshot, String>
    where
        F: FnOnce(&mut TimerEngine),
    {
        let mut engine = self.lock_engine()?;
        updater(&mut *engine);
        let snapshot = engine.snapshot();
        drop(engine); // Release the lock early

        self.record_action(action);
        self.publish(snapshot.clone());
        Ok(snapshot)
    }

    /// Start the countdown and acquire the tick resource
    pub fn start(self: &Arc<Self>) -> Result<ClockSnapshot, String> {
        let mut engine = self.lock_engine()?;
        if engine.start() {
            let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
            let mut ticker = self.lock_ticker()?;
            *ticker = Some(Ticker::spawn(Arc::clone(self), generation));
        } else {
            debug!("Start requested while already running");
        }
        let snapshot = engine.snapshot();
        drop(engine);

        self.record_action("start");
        self.publish(snapshot.clone());
        Ok(snapshot)
    }

    /// Pause the countdown and release the tick resource
    pub fn stop(&self) -> Result<ClockSnapshot, String> {
        let mut engine = self.lock_engine()?;
        if !engine.stop() {
            debug!("Stop requested while already paused");
        }
        self.release_ticker()?;
        let snapshot = engine.snapshot();
        drop(engine);

        self.record_action("stop");
        self.publish(snapshot.clone());
        Ok(snapshot)
    }

    /// Start when paused, pause when running
    pub fn toggle(self: &Arc<Self>) -> Result<ClockSnapshot, String> {
        let running = self.lock_engine()?.is_running();
        if running {
            self.stop()
        } else {
            self.start()
        }
    }

    /// Return the clock to its initial state regardless of what it was doing
    pub fn reset(&self) -> Result<ClockSnapshot, String> {
        let mut engine = self.lock_engine()?;
        self.release_ticker()?;
        engine.reset();
        let snapshot = engine.snapshot();
        drop(engine);

        self.record_action("reset");
        self.publish(snapshot.clone());
        Ok(snapshot)
    }

    pub fn increment_break(&self) -> Result<ClockSnapshot, String> {
        self.update_clock("break-increment", |engine| {
            engine.increment_break();
        })
    }

    pub fn decrement_break(&self) -> Result<ClockSnapshot, String> {
        self.update_clock("break-decrement", |engine| {
            engine.decrement_break();
        })
    }

    pub fn increment_session(&self) -> Result<ClockSnapshot, String> {
        self.update_clock("session-increment", |engine| {
            engine.increment_session();
        })
    }

    pub fn decrement_session(&self) -> Result<ClockSnapshot, String> {
        self.update_clock("session-decrement", |engine| {
            engine.decrement_session();
        })
    }

    /// Advance the countdown on behalf of the tick task holding `generation`.
    ///
    /// Ticks from a released ticker are ignored, so a tick racing a stop or restart
    /// never counts twice.
    pub fn apply_tick(&self, generation: u64) -> Result<TickOutcome, String> {
        let mut engine = self.lock_engine()?;
        let live = self.lock_ticker()?.as_ref().map(Ticker::generation);
        if live != Some(generation) {
            debug!("Ignoring stale tick from generation {}", generation);
            return Ok(TickOutcome::default());
        }

        let outcome = engine.tick();
        let snapshot = engine.snapshot();
        drop(engine);

        self.publish(snapshot);
        Ok(outcome)
    }

    /// Record that the alert sound failed to load or play
    pub fn report_audio_error(&self, failure: &AudioPlaybackFailure) -> Result<(), String> {
        let mut engine = self.lock_engine()?;
        engine.report_audio_error(failure);
        let snapshot = engine.snapshot();
        drop(engine);

        self.publish(snapshot);
        Ok(())
    }

    /// Get the current clock snapshot
    pub fn snapshot(&self) -> Result<ClockSnapshot, String> {
        self.lock_engine().map(|engine| engine.snapshot())
    }

    /// Whether a tick resource is currently held
    pub fn has_ticker(&self) -> Result<bool, String> {
        self.lock_ticker().map(|ticker| ticker.is_some())
    }

    /// Watch clock snapshots as they change
    pub fn subscribe(&self) -> watch::Receiver<ClockSnapshot> {
        self.clock_update_tx.subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    fn release_ticker(&self) -> Result<(), String> {
        if self.lock_ticker()?.take().is_some() {
            info!("Tick resource released");
        }
        Ok(())
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    fn publish(&self, snapshot: ClockSnapshot) {
        if let Err(e) = self.clock_update_tx.send(snapshot) {
            warn!("Failed to send clock update: {}", e);
        }
    }
}
