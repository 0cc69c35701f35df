use crate::recognition::RecognitionSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a voice session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier used in logs (e.g., "voice-1b4e...")
    pub session_id: String,

    /// Reconnects allowed before the session gives up
    /// Default: 5
    pub max_reconnect_attempts: u32,

    /// Delay before each reconnect attempt
    /// Default: 2000ms
    pub reconnect_delay: Duration,

    /// Delay before retrying a start the recognizer rejected
    /// Default: 100ms
    pub start_retry_delay: Duration,

    /// Restart the recognizer whenever it ends on its own.
    /// `false` gives one-shot listening.
    pub auto_restart: bool,

    /// Settings handed to the recognizer
    pub recognition: RecognitionSettings,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("voice-{}", uuid::Uuid::new_v4()),
            max_reconnect_attempts: 5,
            reconnect_delay: Duration::from_millis(2000),
            start_retry_delay: Duration::from_millis(100),
            auto_restart: true,
            recognition: RecognitionSettings::default(),
        }
    }
}
