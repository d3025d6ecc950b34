//! External collaborators module
//!
//! This module contains the audio side of the clock: the alert sound trait and the
//! adapters that play it.

pub mod audio;

// Re-export main types
pub use audio::{AlertSound, AudioPlaybackFailure, CommandSound, TerminalBell};
