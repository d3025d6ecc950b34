//! Session/break countdown state machine

use std::{fmt, sync::Arc};
use tracing::{debug, info, warn};

use crate::services::{AlertSound, AudioPlaybackFailure};
use super::timer_state::{
    format_time, step_length, AlertState, ClockSnapshot, Lengths, Phase, AUDIO_ERROR_MESSAGE,
};

/// What a single tick did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// The one-second cue was requested from the alert sound
    pub cue_requested: bool,
    /// The countdown ran out and the engine switched to this phase
    pub switched_to: Option<Phase>,
}

/// Owns the clock configuration, countdown and phase.
///
/// The engine does no scheduling of its own: whoever holds the tick resource calls
/// [`TimerEngine::tick`] once per elapsed second while [`TimerEngine::is_running`].
pub struct TimerEngine {
    lengths: Lengths,
    phase: Phase,
    remaining_seconds: u32,
    running: bool,
    alert: AlertState,
    audio_error: bool,
    sound: Arc<dyn AlertSound>,
}

impl fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerEngine")
            .field("lengths", &self.lengths)
            .field("phase", &self.phase)
            .field("remaining_seconds", &self.remaining_seconds)
            .field("running", &self.running)
            .field("alert", &self.alert)
            .field("audio_error", &self.audio_error)
            .finish_non_exhaustive()
    }
}

impl TimerEngine {
    /// Create a paused engine at the start of a default session
    pub fn new(sound: Arc<dyn AlertSound>) -> Self {
        let lengths = Lengths::default();
        let remaining_seconds = lengths.seconds_for(Phase::Session);
        Self {
            lengths,
            phase: Phase::Session,
            remaining_seconds,
            running: false,
            alert: AlertState::for_remaining(remaining_seconds),
            audio_error: false,
            sound,
        }
    }

    pub fn lengths(&self) -> Lengths {
        self.lengths
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn alert(&self) -> AlertState {
        self.alert
    }

    pub fn audio_error(&self) -> bool {
        self.audio_error
    }

    /// Start counting down. Returns false if already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        info!(
            "{} countdown started at {}s",
            self.phase.label(),
            self.remaining_seconds
        );
        true
    }

    /// Pause the countdown. Returns false if already paused.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        info!(
            "{} countdown paused at {}s",
            self.phase.label(),
            self.remaining_seconds
        );
        true
    }

    /// Restore the initial state and rewind the alert sound
    pub fn reset(&mut self) {
        self.running = false;
        self.lengths = Lengths::default();
        self.phase = Phase::Session;
        self.set_remaining(self.lengths.seconds_for(Phase::Session));
        self.audio_error = false;
        self.sound.rewind();
        info!("Clock reset");
    }

    /// Advance the countdown by one second.
    ///
    /// The cue is requested when the countdown reads 1 before the tick. The phase only
    /// switches on the tick after the countdown reached 0, and that tick reloads the
    /// countdown instead of decrementing it.
    pub fn tick(&mut self) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if !self.running {
            return outcome;
        }

        if self.remaining_seconds == 1 {
            outcome.cue_requested = true;
            if let Err(e) = self.sound.play() {
                self.record_audio_error(&e);
            }
        }

        if self.remaining_seconds == 0 {
            self.phase = self.phase.other();
            self.set_remaining(self.lengths.seconds_for(self.phase));
            outcome.switched_to = Some(self.phase);
            info!(
                "Switched to {} for {} minutes",
                self.phase.label(),
                self.lengths.for_phase(self.phase)
            );
        } else {
            self.set_remaining(self.remaining_seconds - 1);
        }

        outcome
    }

    /// Lengthen the break by a minute. Never touches the running countdown.
    pub fn increment_break(&mut self) -> bool {
        self.adjust_break(true)
    }

    /// Shorten the break by a minute. Never touches the running countdown.
    pub fn decrement_break(&mut self) -> bool {
        self.adjust_break(false)
    }

    /// Lengthen the session by a minute, moving a paused session countdown along with it
    pub fn increment_session(&mut self) -> bool {
        self.adjust_session(true)
    }

    /// Shorten the session by a minute, moving a paused session countdown along with it
    pub fn decrement_session(&mut self) -> bool {
        self.adjust_session(false)
    }

    /// Record a load or playback failure reported by the alert sound
    pub fn report_audio_error(&mut self, failure: &AudioPlaybackFailure) {
        self.record_audio_error(failure);
    }

    /// Read-only view for the display
    pub fn snapshot(&self) -> ClockSnapshot {
        ClockSnapshot {
            phase: self.phase,
            timer_label: self.phase.label().to_string(),
            time_left: format_time(self.remaining_seconds),
            remaining_seconds: self.remaining_seconds,
            near_expiry: self.alert.near_expiry,
            final_countdown: self.alert.final_countdown,
            break_length: self.lengths.break_minutes,
            session_length: self.lengths.session_minutes,
            running: self.running,
            start_stop_label: if self.running { "Pause" } else { "Start" }.to_string(),
            audio_error: self.audio_error,
            audio_error_message: self.audio_error.then(|| AUDIO_ERROR_MESSAGE.to_string()),
        }
    }

    fn adjust_break(&mut self, increment: bool) -> bool {
        match step_length(self.lengths.break_minutes, increment) {
            Some(minutes) => {
                self.lengths.break_minutes = minutes;
                debug!("Break length set to {} minutes", minutes);
                true
            }
            None => {
                debug!(
                    "Break length {} is at its bound, edit ignored",
                    self.lengths.break_minutes
                );
                false
            }
        }
    }

    fn adjust_session(&mut self, increment: bool) -> bool {
        let Some(minutes) = step_length(self.lengths.session_minutes, increment) else {
            debug!(
                "Session length {} is at its bound, edit ignored",
                self.lengths.session_minutes
            );
            return false;
        };

        self.lengths.session_minutes = minutes;
        debug!("Session length set to {} minutes", minutes);

        // Only a paused session countdown follows the edit, shifted by the same minute
        if self.phase == Phase::Session && !self.running {
            let remaining = if increment {
                self.remaining_seconds + 60
            } else {
                self.remaining_seconds.saturating_sub(60)
            };
            self.set_remaining(remaining);
        }
        true
    }

    fn set_remaining(&mut self, seconds: u32) {
        self.remaining_seconds = seconds;
        self.alert = AlertState::for_remaining(seconds);
    }

    fn record_audio_error(&mut self, failure: &AudioPlaybackFailure) {
        if !self.audio_error {
            warn!("{}", failure);
        }
        self.audio_error = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::audio::testing::RecordingSound;

    fn engine() -> (TimerEngine, Arc<RecordingSound>) {
        let sound = Arc::new(RecordingSound::default());
        (TimerEngine::new(sound.clone()), sound)
    }

    fn tick_n(engine: &mut TimerEngine, n: u32) {
        for _ in 0..n {
            engine.tick();
        }
    }

    fn assert_initial(engine: &TimerEngine) {
        assert_eq!(engine.lengths(), Lengths { break_minutes: 5, session_minutes: 25 });
        assert_eq!(engine.phase(), Phase::Session);
        assert_eq!(engine.remaining_seconds(), 1500);
        assert!(!engine.is_running());
        assert_eq!(engine.alert(), AlertState::default());
        assert!(!engine.audio_error());
    }

    #[test]
    fn test_new_engine_is_initial() {
        let (engine, _) = engine();
        assert_initial(&engine);
    }

    #[test]
    fn test_start_is_idempotent() {
        let (mut engine, _) = engine();
        assert!(engine.start());
        assert!(!engine.start());
        assert!(engine.is_running());

        assert!(engine.stop());
        assert!(!engine.stop());
        assert!(!engine.is_running());
    }

    #[test]
    fn test_tick_ignored_while_paused() {
        let (mut engine, _) = engine();
        assert_eq!(engine.tick(), TickOutcome::default());
        assert_eq!(engine.remaining_seconds(), 1500);
    }

    #[test]
    fn test_tick_counts_down() {
        let (mut engine, _) = engine();
        engine.start();
        tick_n(&mut engine, 3);
        assert_eq!(engine.remaining_seconds(), 1497);
        assert_eq!(engine.snapshot().time_left, "24:57");
    }

    #[test]
    fn test_cue_then_switch_at_boundary() {
        let (mut engine, sound) = engine();
        engine.start();
        tick_n(&mut engine, 1499);
        assert_eq!(engine.remaining_seconds(), 1);
        assert!(engine.alert().final_countdown);

        let outcome = engine.tick();
        assert!(outcome.cue_requested);
        assert_eq!(outcome.switched_to, None);
        assert_eq!(sound.plays(), 1);
        assert_eq!(engine.remaining_seconds(), 0);
        assert_eq!(engine.phase(), Phase::Session);
        assert_eq!(engine.alert(), AlertState::default());

        let outcome = engine.tick();
        assert!(!outcome.cue_requested);
        assert_eq!(outcome.switched_to, Some(Phase::Break));
        assert_eq!(engine.phase(), Phase::Break);
        assert_eq!(engine.remaining_seconds(), 300);
        assert!(engine.is_running());
        assert_eq!(sound.plays(), 1);
    }

    #[test]
    fn test_full_cycle_returns_to_session() {
        let (mut engine, sound) = engine();
        engine.decrement_session();
        engine.increment_break();
        engine.start();

        // 24 minutes of session, then the reload tick
        tick_n(&mut engine, 24 * 60 + 1);
        assert_eq!(engine.phase(), Phase::Break);
        assert_eq!(engine.remaining_seconds(), 6 * 60);

        tick_n(&mut engine, 6 * 60 + 1);
        assert_eq!(engine.phase(), Phase::Session);
        assert_eq!(engine.remaining_seconds(), 24 * 60);
        assert_eq!(sound.plays(), 2);
    }

    #[test]
    fn test_switch_uses_lengths_edited_while_running() {
        let (mut engine, _) = engine();
        engine.start();
        engine.increment_break();
        engine.increment_break();
        // Running session edits leave the countdown alone
        engine.increment_session();
        assert_eq!(engine.remaining_seconds(), 1500);

        tick_n(&mut engine, 1501);
        assert_eq!(engine.phase(), Phase::Break);
        assert_eq!(engine.remaining_seconds(), 7 * 60);
    }

    #[test]
    fn test_audio_failure_does_not_stop_countdown() {
        let sound = Arc::new(RecordingSound::failing());
        let mut engine = TimerEngine::new(sound.clone());
        engine.start();
        tick_n(&mut engine, 1501);

        assert_eq!(sound.plays(), 1);
        assert!(engine.audio_error());
        assert!(engine.snapshot().audio_error_message.is_some());
        assert_eq!(engine.phase(), Phase::Break);
        assert!(engine.is_running());
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let (mut engine, sound) = engine();
        engine.increment_break();
        engine.decrement_session();
        engine.start();
        tick_n(&mut engine, 1500);
        engine.report_audio_error(&AudioPlaybackFailure::new("boom"));

        engine.reset();
        assert_initial(&engine);
        assert_eq!(sound.rewinds(), 1);

        // Reset from a pristine engine is still the initial state
        engine.reset();
        assert_initial(&engine);
    }

    #[test]
    fn test_session_edit_moves_paused_countdown() {
        let (mut engine, _) = engine();
        assert!(engine.increment_session());
        assert_eq!(engine.lengths().session_minutes, 26);
        assert_eq!(engine.remaining_seconds(), 1560);

        assert!(engine.decrement_session());
        assert!(engine.decrement_session());
        assert_eq!(engine.remaining_seconds(), 1440);
    }

    #[test]
    fn test_session_edit_shifts_partial_countdown() {
        let (mut engine, _) = engine();
        engine.start();
        tick_n(&mut engine, 30);
        engine.stop();
        engine.increment_session();
        assert_eq!(engine.remaining_seconds(), 1530);
    }

    #[test]
    fn test_session_decrement_saturates_at_zero() {
        let (mut engine, _) = engine();
        engine.start();
        tick_n(&mut engine, 1470);
        engine.stop();
        assert_eq!(engine.remaining_seconds(), 30);

        engine.decrement_session();
        assert_eq!(engine.remaining_seconds(), 0);
        assert_eq!(engine.alert(), AlertState::default());
    }

    #[test]
    fn test_session_edit_ignored_during_break() {
        let (mut engine, _) = engine();
        engine.start();
        tick_n(&mut engine, 1501);
        engine.stop();
        assert_eq!(engine.phase(), Phase::Break);

        assert!(engine.increment_session());
        assert_eq!(engine.lengths().session_minutes, 26);
        assert_eq!(engine.remaining_seconds(), 300);
    }

    #[test]
    fn test_break_edit_never_moves_countdown() {
        let (mut engine, _) = engine();
        engine.start();
        tick_n(&mut engine, 1501);
        engine.stop();

        assert!(engine.increment_break());
        assert_eq!(engine.lengths().break_minutes, 6);
        assert_eq!(engine.remaining_seconds(), 300);
    }

    #[test]
    fn test_lengths_clamped() {
        let (mut engine, _) = engine();
        for _ in 0..100 {
            engine.increment_break();
            engine.increment_session();
        }
        assert_eq!(engine.lengths(), Lengths { break_minutes: 60, session_minutes: 60 });
        assert_eq!(engine.remaining_seconds(), 3600);
        assert!(!engine.increment_break());
        assert!(!engine.increment_session());

        for _ in 0..100 {
            engine.decrement_break();
            engine.decrement_session();
        }
        assert_eq!(engine.lengths(), Lengths { break_minutes: 1, session_minutes: 1 });
        assert_eq!(engine.remaining_seconds(), 60);
        assert!(!engine.decrement_break());
        assert!(!engine.decrement_session());
    }

    #[test]
    fn test_snapshot_labels() {
        let (mut engine, _) = engine();
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.timer_label, "Session");
        assert_eq!(snapshot.time_left, "25:00");
        assert_eq!(snapshot.start_stop_label, "Start");
        assert_eq!(snapshot.audio_error_message, None);

        engine.start();
        assert_eq!(engine.snapshot().start_stop_label, "Pause");
    }
}
