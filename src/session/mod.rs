//! Voice session management
//!
//! This module provides the `VoiceSessionController` that turns a fragile,
//! event-driven recognizer into a restartable, cancellable service:
//! - Session state machine (idle, listening, reconnecting, terminated)
//! - Bounded fixed-delay reconnect policy
//! - Single local retry when the recognizer rejects a start
//! - Final-transcript delivery to the host listener
//! - Session statistics

mod config;
mod listener;
mod session;
mod state;
mod stats;

pub use config::SessionConfig;
pub use listener::{ChannelListener, SessionListener, SessionNotice};
pub use session::VoiceSessionController;
pub use state::SessionStatus;
pub use stats::SessionStats;
