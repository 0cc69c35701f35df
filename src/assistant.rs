//! Host-side assistant loop
//!
//! Connects the voice core to the host's collaborators:
//! - finalized transcripts go to an `Interpreter` together with the `Catalog`
//! - the interpretation's response is spoken back
//! - the host applies the interpretation through its `CommandSink`
//!
//! Catalog filtering, cart arithmetic and intent parsing stay with the host;
//! only their interfaces live here.

use crate::error::VoiceError;
use crate::session::SessionNotice;
use crate::speech::SpeechOutputController;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Greeting spoken when the assistant comes up, and on the host's help button
pub const WELCOME_MESSAGE: &str =
    "Welcome to Voice Grocer Aid. You can say 'help' to learn what I can do.";

/// What a spoken command asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Search,
    Add,
    Remove,
    Checkout,
    Help,
    Unknown,
}

/// A catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub price: f64,
    pub category: String,
    pub description: String,
}

/// Arguments extracted from a command
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandData {
    /// Free-text search query
    pub query: Option<String>,

    /// Category id to filter by
    pub category: Option<String>,

    /// Product the command refers to
    pub product: Option<Product>,

    /// Requested quantity (add), defaults to 1 on the host side
    pub quantity: Option<u32>,
}

/// Result of interpreting a transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    pub action: Action,

    /// Confirmation to speak back to the user
    pub response: String,

    pub data: CommandData,
}

/// Read-only product catalog supplied by the host
pub trait Catalog: Send + Sync {
    fn products(&self) -> &[Product];

    fn find_by_name(&self, query: &str) -> Vec<Product>;

    fn find_by_category(&self, category_id: &str) -> Vec<Product>;
}

/// Intent parser supplied by the host. Must be a pure function of its inputs.
pub trait Interpreter: Send + Sync {
    fn interpret(&self, transcript: &str, catalog: &dyn Catalog) -> Interpretation;
}

/// Host state mutation (search filter, cart, navigation)
pub trait CommandSink: Send {
    fn apply(&mut self, interpretation: &Interpretation);

    /// A voice error the host should surface, e.g. as a transient notification
    fn report_error(&mut self, _error: &VoiceError) {}
}

/// Drives the transcript -> interpret -> confirm loop
pub struct Assistant<S: CommandSink> {
    interpreter: Box<dyn Interpreter>,
    catalog: Arc<dyn Catalog>,
    speech: Arc<SpeechOutputController>,
    sink: S,
    last_command: Option<String>,
    commands_handled: usize,
}

impl<S: CommandSink> Assistant<S> {
    pub fn new(
        interpreter: Box<dyn Interpreter>,
        catalog: Arc<dyn Catalog>,
        speech: Arc<SpeechOutputController>,
        sink: S,
    ) -> Self {
        Self {
            interpreter,
            catalog,
            speech,
            sink,
            last_command: None,
            commands_handled: 0,
        }
    }

    /// Speak the greeting
    pub fn welcome(&self) {
        self.speech.speak(WELCOME_MESSAGE);
    }

    /// Handle one session notice
    pub fn handle_notice(&mut self, notice: SessionNotice) {
        match notice {
            SessionNotice::Transcript(transcript) => {
                self.handle_transcript(&transcript);
            }
            SessionNotice::Ended => debug!("Voice session ended"),
            SessionNotice::Error(error) => {
                warn!("Voice assistant error: {}", error);
                self.sink.report_error(&error);
            }
        }
    }

    /// Interpret a final transcript, confirm it aloud, then apply it
    pub fn handle_transcript(&mut self, transcript: &str) -> Interpretation {
        info!("Voice command received: {}", transcript);
        self.last_command = Some(transcript.to_string());

        let interpretation = self.interpreter.interpret(transcript, self.catalog.as_ref());
        info!(
            "Command interpreted as {:?}: {}",
            interpretation.action, interpretation.response
        );

        self.speech.speak(&interpretation.response);
        self.sink.apply(&interpretation);
        self.commands_handled += 1;

        interpretation
    }

    /// Consume notices until the session side closes, returning the sink
    pub async fn run(mut self, mut notices: mpsc::UnboundedReceiver<SessionNotice>) -> S {
        info!("Assistant loop started");

        while let Some(notice) = notices.recv().await {
            self.handle_notice(notice);
        }

        info!(
            "Assistant loop stopped after {} commands",
            self.commands_handled
        );
        self.sink
    }

    pub fn last_command(&self) -> Option<&str> {
        self.last_command.as_deref()
    }

    pub fn commands_handled(&self) -> usize {
        self.commands_handled
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
