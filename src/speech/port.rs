use anyhow::Result;
use serde::{Deserialize, Serialize};

/// A voice offered by the synthesis engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceInfo {
    /// Display name (e.g., "Google US English", "Samantha")
    pub name: String,

    /// Locale tag of the voice
    pub lang: String,

    /// Whether the engine uses this voice when none is chosen
    pub default: bool,
}

impl VoiceInfo {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
            default: false,
        }
    }
}

/// One request to vocalize a string
#[derive(Debug, Clone, PartialEq)]
pub struct UtteranceRequest {
    pub text: String,

    /// Speaking rate (1.0 = normal)
    pub rate: f32,

    /// Pitch (1.0 = normal)
    pub pitch: f32,

    /// Volume (0.0 to 1.0)
    pub volume: f32,

    /// Selected voice; `None` leaves the engine default
    pub voice: Option<VoiceInfo>,
}

/// Synthesis engine handle
///
/// `speak` returns immediately; the engine reports progress only through
/// `is_speaking`.
pub trait SpeechOutputPort: Send {
    /// Start vocalizing an utterance
    fn speak(&mut self, utterance: UtteranceRequest) -> Result<()>;

    /// Drop the in-flight utterance, if any
    fn cancel(&mut self);

    /// Point-in-time busy flag
    fn is_speaking(&self) -> bool;

    /// Voices currently offered by the engine
    fn voices(&self) -> Vec<VoiceInfo>;

    /// Engine name for logging
    fn name(&self) -> &str;
}
