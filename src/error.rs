use crate::recognition::RecognitionErrorCode;
use thiserror::Error;

/// Errors surfaced to the host through `SessionListener::on_error`.
///
/// The `Display` output of each variant is the human-readable message the
/// host is expected to show.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoiceError {
    /// The host exposes no speech recognition capability.
    #[error("Speech recognition not supported in this browser")]
    CapabilityUnavailable,

    /// The recognizer rejected both the initial start and the local retry.
    #[error("Failed to start voice recognition")]
    StartFailed,

    /// A network fault that the reconnect policy is handling.
    #[error("Network connection issue. Trying to reconnect...")]
    TransientNetwork,

    /// The reconnect policy gave up.
    #[error("Failed to reconnect after {attempts} attempts. Please check your network connection.")]
    ReconnectExhausted { attempts: u32 },

    /// Any other recognizer error, reported but not auto-recovered.
    #[error("Error: {0}")]
    Recognition(RecognitionErrorCode),
}

impl VoiceError {
    /// Whether the session is left idle by this error with no recovery pending.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            VoiceError::CapabilityUnavailable
                | VoiceError::StartFailed
                | VoiceError::ReconnectExhausted { .. }
        )
    }
}
