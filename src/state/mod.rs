//! State management module
//!
//! This module contains the clock engine, its derived state and the shared
//! application state that owns it.

pub mod app_state;
pub mod engine;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use engine::{TickOutcome, TimerEngine};
pub use timer_state::{format_time, AlertState, ClockSnapshot, Lengths, Phase};
