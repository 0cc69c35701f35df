use super::state::SessionStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Statistics about a voice session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Current state
    pub status: SessionStatus,

    /// When the controller was created
    pub started_at: DateTime<Utc>,

    /// Controller lifetime in seconds
    pub uptime_secs: f64,

    /// Successful recognizer starts, reconnects included
    pub resource_starts: usize,

    /// Final transcripts delivered to the listener
    pub transcripts_delivered: usize,

    /// Interim results seen (never delivered)
    pub interim_results: usize,

    /// Reconnect timers scheduled
    pub reconnects_scheduled: usize,

    /// Errors reported to the listener
    pub errors_reported: usize,

    /// Current reconnect attempt counter
    pub reconnect_attempts: u32,
}
