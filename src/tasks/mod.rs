//! Background tasks module
//!
//! This module contains the tick resource and the listeners that run alongside the
//! HTTP server.

pub mod announcer;
pub mod audio_failures;
pub mod ticker;

// Re-export main items
pub use announcer::announcer_task;
pub use audio_failures::audio_failure_task;
pub use ticker::{Ticker, TICK_PERIOD};
