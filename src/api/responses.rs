//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::ClockSnapshot;

/// API response structure for clock action endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub clock: ClockSnapshot,
}

impl ClockResponse {
    /// Create a response whose status follows the clock's run state
    pub fn new(message: String, clock: ClockSnapshot) -> Self {
        let status = if clock.running { "running" } else { "paused" };
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            clock,
        }
    }
}

/// Status response with server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub clock: ClockSnapshot,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
