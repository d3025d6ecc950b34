//! Session Clock - A 25 + 5 session/break countdown clock
//!
//! This library provides the countdown engine that alternates between a session and a
//! break, the tick resource that drives it, the alert sound adapters and an HTTP surface
//! for controlling and displaying the clock.

pub mod config;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, TimerEngine};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
