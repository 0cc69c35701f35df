use crate::error::VoiceError;
use tokio::sync::mpsc;
use tracing::debug;

/// Host callbacks for a voice session
///
/// Called from the controller's event task or timer tasks, never while the
/// controller's state is locked, so a listener may call back into the
/// controller.
pub trait SessionListener: Send + Sync {
    /// A final transcript
    fn on_result(&self, transcript: &str);

    /// The recognizer ended, for any reason
    fn on_end(&self);

    /// A diagnostic for the user
    fn on_error(&self, error: &VoiceError);
}

/// Notification produced by a session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionNotice {
    Transcript(String),
    Ended,
    Error(VoiceError),
}

/// Listener that forwards notices into a channel
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<SessionNotice>,
}

impl ChannelListener {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SessionNotice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn forward(&self, notice: SessionNotice) {
        if self.tx.send(notice).is_err() {
            debug!("Session notice dropped: receiver closed");
        }
    }
}

impl SessionListener for ChannelListener {
    fn on_result(&self, transcript: &str) {
        self.forward(SessionNotice::Transcript(transcript.to_string()));
    }

    fn on_end(&self) {
        self.forward(SessionNotice::Ended);
    }

    fn on_error(&self, error: &VoiceError) {
        self.forward(SessionNotice::Error(error.clone()));
    }
}
