use crate::recognition::RecognitionSettings;
use crate::session::SessionConfig;
use crate::speech::OutputConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub voice: VoiceConfig,
    pub speech: SpeechConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "voice-grocer".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub locale: String,
    pub continuous: bool,
    pub interim_results: bool,
    pub auto_restart: bool,
    pub max_reconnect_attempts: u32,
    pub reconnect_delay_ms: u64,
    pub start_retry_delay_ms: u64,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        let session = SessionConfig::default();
        Self {
            locale: session.recognition.locale,
            continuous: session.recognition.continuous,
            interim_results: session.recognition.interim_results,
            auto_restart: session.auto_restart,
            max_reconnect_attempts: session.max_reconnect_attempts,
            reconnect_delay_ms: session.reconnect_delay.as_millis() as u64,
            start_retry_delay_ms: session.start_retry_delay.as_millis() as u64,
        }
    }
}

impl VoiceConfig {
    /// Build a session config with a fresh session id
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            max_reconnect_attempts: self.max_reconnect_attempts,
            reconnect_delay: Duration::from_millis(self.reconnect_delay_ms),
            start_retry_delay: Duration::from_millis(self.start_retry_delay_ms),
            auto_restart: self.auto_restart,
            recognition: RecognitionSettings {
                locale: self.locale.clone(),
                continuous: self.continuous,
                interim_results: self.interim_results,
            },
            ..SessionConfig::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    pub preferred_voices: Vec<String>,
    pub start_muted: bool,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        let output = OutputConfig::default();
        Self {
            rate: output.rate,
            pitch: output.pitch,
            volume: output.volume,
            preferred_voices: output.preferred_voices,
            start_muted: output.start_muted,
        }
    }
}

impl SpeechConfig {
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig {
            rate: self.rate,
            pitch: self.pitch,
            volume: self.volume,
            preferred_voices: self.preferred_voices.clone(),
            start_muted: self.start_muted,
        }
    }
}

impl Config {
    /// Load configuration from an optional file, overridden by
    /// `VOICE_GROCER_<SECTION>__<KEY>` environment variables.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("VOICE_GROCER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }
}
