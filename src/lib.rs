pub mod assistant;
pub mod capability;
pub mod config;
pub mod console;
pub mod error;
pub mod recognition;
pub mod session;
pub mod speech;

pub use assistant::{
    Action, Assistant, Catalog, CommandData, CommandSink, Interpretation, Interpreter, Product,
    WELCOME_MESSAGE,
};
pub use capability::{probe, CapabilityReport, SpeechHost};
pub use config::Config;
pub use console::ConsoleHost;
pub use error::VoiceError;
pub use recognition::{
    RecognitionChannel, RecognitionErrorCode, RecognitionEvent, RecognitionSettings,
    SpeechInputPort,
};
pub use session::{
    ChannelListener, SessionConfig, SessionListener, SessionNotice, SessionStats, SessionStatus,
    VoiceSessionController,
};
pub use speech::{OutputConfig, SpeechOutputController, SpeechOutputPort, UtteranceRequest, VoiceInfo};
