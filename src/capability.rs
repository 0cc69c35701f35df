//! Host capability detection

use crate::recognition::{RecognitionChannel, RecognitionSettings};
use crate::speech::SpeechOutputPort;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// What the host environment can do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityReport {
    pub recognition_available: bool,
    pub synthesis_available: bool,
}

/// The environment that supplies recognition and synthesis engines.
///
/// Engines are opaque to this crate; a host only has to say whether it has
/// them and hand out one port per controller.
pub trait SpeechHost: Send + Sync {
    fn supports_recognition(&self) -> bool;

    fn supports_synthesis(&self) -> bool;

    /// Open a recognizer configured with `settings`
    fn open_recognition(&self, settings: &RecognitionSettings) -> Result<RecognitionChannel>;

    /// Open the synthesis engine
    fn open_synthesis(&self) -> Result<Box<dyn SpeechOutputPort>>;
}

/// Detect which speech capabilities the host exposes.
///
/// Absence is reported, never raised.
pub fn probe(host: &dyn SpeechHost) -> CapabilityReport {
    let report = CapabilityReport {
        recognition_available: host.supports_recognition(),
        synthesis_available: host.supports_synthesis(),
    };

    if !report.recognition_available {
        warn!("Speech recognition capability not available");
    }
    if !report.synthesis_available {
        warn!("Speech synthesis capability not available");
    }
    info!(
        "Capability probe: recognition={}, synthesis={}",
        report.recognition_available, report.synthesis_available
    );

    report
}

/// Open the recognizer if the probe found one. Open failures count as absence.
pub(crate) fn open_recognition(
    host: &dyn SpeechHost,
    report: &CapabilityReport,
    settings: &RecognitionSettings,
) -> Option<RecognitionChannel> {
    if !report.recognition_available {
        return None;
    }

    match host.open_recognition(settings) {
        Ok(channel) => Some(channel),
        Err(e) => {
            warn!("Failed to open speech recognition: {:#}", e);
            None
        }
    }
}

/// Open the synthesis engine if the probe found one. Open failures count as absence.
pub(crate) fn open_synthesis(
    host: &dyn SpeechHost,
    report: &CapabilityReport,
) -> Option<Box<dyn SpeechOutputPort>> {
    if !report.synthesis_available {
        return None;
    }

    match host.open_synthesis() {
        Ok(port) => Some(port),
        Err(e) => {
            warn!("Failed to open speech synthesis: {:#}", e);
            None
        }
    }
}
