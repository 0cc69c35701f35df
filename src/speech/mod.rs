//! Speech output
//!
//! Wraps the host's synthesis engine:
//! - last-request-wins utterances (no queueing)
//! - instant silence on mute
//! - best-effort voice selection from a preferred-name allowlist

mod controller;
mod port;
mod voice;

pub use controller::{OutputConfig, SpeechOutputController};
pub use port::{SpeechOutputPort, UtteranceRequest, VoiceInfo};
pub use voice::select_voice;
