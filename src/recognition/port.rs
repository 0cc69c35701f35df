use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;

/// Settings handed to the host when a recognizer is opened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionSettings {
    /// BCP-47 locale, the only language the session listens for
    pub locale: String,

    /// Keep the recognizer open across pauses instead of ending after one phrase
    pub continuous: bool,

    /// Ask the engine for interim (still-updating) results
    pub interim_results: bool,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            continuous: true,
            interim_results: true,
        }
    }
}

/// Error codes reported by a recognizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionErrorCode {
    Network,
    NoSpeech,
    Aborted,
    AudioCapture,
    NotAllowed,
    ServiceNotAllowed,
    LanguageNotSupported,
    Other(String),
}

impl RecognitionErrorCode {
    /// Network faults are the only class the reconnect policy treats as transient
    pub fn is_transient(&self) -> bool {
        matches!(self, RecognitionErrorCode::Network)
    }

    /// Parse the host's code string
    pub fn from_code(code: &str) -> Self {
        match code {
            "network" => Self::Network,
            "no-speech" => Self::NoSpeech,
            "aborted" => Self::Aborted,
            "audio-capture" => Self::AudioCapture,
            "not-allowed" => Self::NotAllowed,
            "service-not-allowed" => Self::ServiceNotAllowed,
            "language-not-supported" => Self::LanguageNotSupported,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RecognitionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "network"),
            Self::NoSpeech => write!(f, "no-speech"),
            Self::Aborted => write!(f, "aborted"),
            Self::AudioCapture => write!(f, "audio-capture"),
            Self::NotAllowed => write!(f, "not-allowed"),
            Self::ServiceNotAllowed => write!(f, "service-not-allowed"),
            Self::LanguageNotSupported => write!(f, "language-not-supported"),
            Self::Other(code) => write!(f, "{}", code),
        }
    }
}

/// Event pushed by a recognizer
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    /// A transcription, either interim or final
    Result {
        transcript: String,
        is_final: bool,
        confidence: Option<f32>,
    },

    /// The recognizer stopped, for any reason
    End,

    /// The recognizer hit a fault; usually followed by `End`
    Error(RecognitionErrorCode),
}

impl RecognitionEvent {
    pub fn interim(transcript: impl Into<String>) -> Self {
        Self::Result {
            transcript: transcript.into(),
            is_final: false,
            confidence: None,
        }
    }

    pub fn final_result(transcript: impl Into<String>) -> Self {
        Self::Result {
            transcript: transcript.into(),
            is_final: true,
            confidence: None,
        }
    }
}

/// Recognition engine handle
///
/// Implementations:
/// - `ConsoleRecognizer`: stdin lines as final transcripts (demo binary)
/// - test fakes that fire scripted events
///
/// Commands never block. Their effects arrive later as `RecognitionEvent`s.
/// After `stop()` on an active recognizer exactly one `End` must follow.
pub trait SpeechInputPort: Send {
    /// Activate the recognizer
    ///
    /// An `Err` means the engine rejected the call synchronously,
    /// typically because it still considers itself active.
    fn start(&mut self) -> Result<()>;

    /// Deactivate the recognizer
    fn stop(&mut self) -> Result<()>;

    /// Whether the engine is currently capturing
    fn is_active(&self) -> bool;

    /// Engine name for logging
    fn name(&self) -> &str;
}

/// An opened recognizer together with the stream of its events
pub struct RecognitionChannel {
    pub port: Box<dyn SpeechInputPort>,
    pub events: mpsc::UnboundedReceiver<RecognitionEvent>,
}
