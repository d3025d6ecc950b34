//! Timer state structures: phases, lengths, alert flags and the display snapshot

use serde::{Deserialize, Serialize};

/// Shortest allowed interval length in minutes
pub const MIN_LENGTH_MINUTES: u32 = 1;
/// Longest allowed interval length in minutes
pub const MAX_LENGTH_MINUTES: u32 = 60;
/// Break length restored by a reset
pub const DEFAULT_BREAK_MINUTES: u32 = 5;
/// Session length restored by a reset
pub const DEFAULT_SESSION_MINUTES: u32 = 25;

/// Remaining seconds at or below which the near-expiry visual is shown
pub const NEAR_EXPIRY_SECONDS: u32 = 60;
/// Remaining seconds at or below which the final countdown flashes
pub const FINAL_COUNTDOWN_SECONDS: u32 = 10;

/// Message shown to the user while the alert sound is unusable
pub const AUDIO_ERROR_MESSAGE: &str =
    "Failed to load the audio file. Please check the file or your connection.";

/// Which interval is currently counting down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Session,
    Break,
}

impl Phase {
    /// Label shown above the countdown
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Session => "Session",
            Phase::Break => "Break",
        }
    }

    /// The phase that follows this one
    pub fn other(&self) -> Self {
        match self {
            Phase::Session => Phase::Break,
            Phase::Break => Phase::Session,
        }
    }
}

/// Configured interval lengths in minutes, each kept within
/// [`MIN_LENGTH_MINUTES`, `MAX_LENGTH_MINUTES`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lengths {
    pub break_minutes: u32,
    pub session_minutes: u32,
}

impl Lengths {
    /// Configured length of `phase` in minutes
    pub fn for_phase(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Session => self.session_minutes,
            Phase::Break => self.break_minutes,
        }
    }

    /// Configured length of `phase` in seconds
    pub fn seconds_for(&self, phase: Phase) -> u32 {
        self.for_phase(phase) * 60
    }
}

impl Default for Lengths {
    fn default() -> Self {
        Self {
            break_minutes: DEFAULT_BREAK_MINUTES,
            session_minutes: DEFAULT_SESSION_MINUTES,
        }
    }
}

/// Step a length by one minute, returning `None` when the result would leave the bounds
pub fn step_length(minutes: u32, increment: bool) -> Option<u32> {
    let next = if increment {
        minutes.checked_add(1)?
    } else {
        minutes.checked_sub(1)?
    };
    (MIN_LENGTH_MINUTES..=MAX_LENGTH_MINUTES)
        .contains(&next)
        .then_some(next)
}

/// Visual warning flags derived from the remaining time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertState {
    pub near_expiry: bool,
    pub final_countdown: bool,
}

impl AlertState {
    /// Derive the flags for a countdown value
    pub fn for_remaining(remaining_seconds: u32) -> Self {
        Self {
            near_expiry: remaining_seconds > 0 && remaining_seconds <= NEAR_EXPIRY_SECONDS,
            final_countdown: remaining_seconds > 0 && remaining_seconds <= FINAL_COUNTDOWN_SECONDS,
        }
    }
}

/// Format seconds as zero-padded `mm:ss`
pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Everything the display needs to render the clock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockSnapshot {
    pub phase: Phase,
    pub timer_label: String,
    pub time_left: String,
    pub remaining_seconds: u32,
    pub near_expiry: bool,
    pub final_countdown: bool,
    pub break_length: u32,
    pub session_length: u32,
    pub running: bool,
    pub start_stop_label: String,
    pub audio_error: bool,
    pub audio_error_message: Option<String>,
}
