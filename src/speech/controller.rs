use super::port::{SpeechOutputPort, UtteranceRequest};
use super::voice::select_voice;
use crate::capability::{self, CapabilityReport, SpeechHost};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Configuration for speech output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Speaking rate (1.0 = normal)
    pub rate: f32,

    /// Pitch (1.0 = normal)
    pub pitch: f32,

    /// Volume (0.0 to 1.0)
    pub volume: f32,

    /// Substrings of voice names to prefer, in priority-free allowlist form
    pub preferred_voices: Vec<String>,

    /// Whether the controller starts muted
    pub start_muted: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
            preferred_voices: vec![
                "Female".to_string(),
                "Google".to_string(),
                "Samantha".to_string(),
            ],
            start_muted: false,
        }
    }
}

/// Speaks confirmations back to the user
///
/// At most one utterance is active at a time: every `speak` cancels whatever
/// is in flight. Without a synthesis capability every call is a silent no-op.
pub struct SpeechOutputController {
    config: OutputConfig,

    /// Synthesis engine, `None` when the host has none
    port: Mutex<Option<Box<dyn SpeechOutputPort>>>,

    /// Mute flag
    muted: AtomicBool,

    /// Number of utterances handed to the engine
    utterances_issued: AtomicUsize,

    capabilities: CapabilityReport,
}

impl SpeechOutputController {
    /// Create a controller, probing `host` for a synthesis engine
    pub fn new(host: &dyn SpeechHost, config: OutputConfig) -> Self {
        let capabilities = capability::probe(host);
        let port = capability::open_synthesis(host, &capabilities);

        match &port {
            Some(port) => info!("Speech output ready on {}", port.name()),
            None => warn!("Speech output disabled: no synthesis engine"),
        }

        Self {
            muted: AtomicBool::new(config.start_muted),
            config,
            port: Mutex::new(port),
            utterances_issued: AtomicUsize::new(0),
            capabilities,
        }
    }

    /// Speak `text`, replacing any utterance in flight
    pub fn speak(&self, text: &str) {
        if self.is_muted() {
            debug!("Muted, not speaking: {}", text);
            return;
        }

        let mut port = self.lock_port();
        let Some(port) = port.as_mut() else {
            debug!("No synthesis engine, not speaking: {}", text);
            return;
        };

        port.cancel();

        let voices = port.voices();
        let voice = select_voice(&voices, &self.config.preferred_voices);
        if let Some(voice) = &voice {
            debug!("Using voice: {}", voice.name);
        }

        let utterance = UtteranceRequest {
            text: text.to_string(),
            rate: self.config.rate,
            pitch: self.config.pitch,
            volume: self.config.volume,
            voice,
        };

        match port.speak(utterance) {
            Ok(()) => {
                self.utterances_issued.fetch_add(1, Ordering::SeqCst);
            }
            Err(e) => warn!("Failed to speak on {}: {:#}", port.name(), e),
        }
    }

    /// Flip the mute flag and return the new state.
    ///
    /// Muting silences the current utterance immediately.
    pub fn toggle_mute(&self) -> bool {
        let muted = !self.muted.fetch_xor(true, Ordering::SeqCst);

        if muted {
            if let Some(port) = self.lock_port().as_mut() {
                port.cancel();
            }
            info!("Speech output muted");
        } else {
            info!("Speech output unmuted");
        }

        muted
    }

    /// Whether the engine is vocalizing right now
    pub fn is_speaking(&self) -> bool {
        self.lock_port()
            .as_ref()
            .map(|port| port.is_speaking())
            .unwrap_or(false)
    }

    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }

    pub fn utterances_issued(&self) -> usize {
        self.utterances_issued.load(Ordering::SeqCst)
    }

    pub fn capabilities(&self) -> CapabilityReport {
        self.capabilities
    }

    fn lock_port(&self) -> MutexGuard<'_, Option<Box<dyn SpeechOutputPort>>> {
        self.port.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
