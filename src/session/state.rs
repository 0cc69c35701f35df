use serde::{Deserialize, Serialize};
use std::fmt;

/// Session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Recognizer not running and no restart pending.
    Idle,
    /// Recognizer running and delivering results.
    Listening,
    /// Recognizer ended unexpectedly; a restart timer is pending.
    Reconnecting,
    /// Controller disposed. No further transitions.
    Terminated,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Listening => write!(f, "listening"),
            Self::Reconnecting => write!(f, "reconnecting"),
            Self::Terminated => write!(f, "terminated"),
        }
    }
}

/// Why the controller stopped an active recognizer.
///
/// Each stop is answered by one `End` event; the cause decides how that
/// `End` is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StopCause {
    /// `stop()` from the host. The `End` reaches the listener.
    Explicit,
    /// Pre-stop before a fresh start. The `End` is swallowed.
    Restart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StartAttempt {
    First,
    Retry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerKind {
    Reconnect,
    StartRetry,
}
