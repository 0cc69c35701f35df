//! Speech input port
//!
//! The recognition engine is supplied by the host. This module defines the
//! narrow interface the session controller drives:
//! - fire-and-forget `start` / `stop` commands on a `SpeechInputPort`
//! - push-style `RecognitionEvent`s delivered over an mpsc channel

mod port;

pub use port::{
    RecognitionChannel, RecognitionErrorCode, RecognitionEvent, RecognitionSettings,
    SpeechInputPort,
};
