// Deterministic fake speech engines shared by the integration tests
//
// The fakes record every command the controllers issue and let a test
// fire recognizer events by hand.

#![allow(dead_code)]

use anyhow::{bail, Result};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use voice_grocer::{
    RecognitionChannel, RecognitionErrorCode, RecognitionEvent, RecognitionSettings,
    SessionListener, SessionNotice, SpeechHost, SpeechInputPort, SpeechOutputPort,
    UtteranceRequest, VoiceError, VoiceInfo,
};

#[derive(Debug, Default)]
struct RecognizerLog {
    active: bool,
    start_calls: usize,
    starts: usize,
    stops: usize,
    reject_next_starts: usize,
    overlapping_starts: usize,
}

/// Test-side handle on the fake recognizer
#[derive(Clone)]
pub struct FakeRecognizer {
    log: Arc<Mutex<RecognizerLog>>,
    events: mpsc::UnboundedSender<RecognitionEvent>,
}

impl FakeRecognizer {
    /// Push an event; dropped silently once the controller is gone
    pub fn emit(&self, event: RecognitionEvent) {
        let _ = self.events.send(event);
    }

    pub fn interim(&self, text: &str) {
        self.emit(RecognitionEvent::interim(text));
    }

    pub fn final_result(&self, text: &str) {
        self.emit(RecognitionEvent::final_result(text));
    }

    /// The engine ends on its own (silence timeout, internal fault)
    pub fn end_naturally(&self) {
        self.log.lock().unwrap().active = false;
        self.emit(RecognitionEvent::End);
    }

    /// The engine reports a network fault and ends
    pub fn network_drop(&self) {
        self.log.lock().unwrap().active = false;
        self.emit(RecognitionEvent::Error(RecognitionErrorCode::Network));
        self.emit(RecognitionEvent::End);
    }

    pub fn reject_next_starts(&self, count: usize) {
        self.log.lock().unwrap().reject_next_starts = count;
    }

    pub fn is_active(&self) -> bool {
        self.log.lock().unwrap().active
    }

    /// Every call to `start`, rejected ones included
    pub fn start_calls(&self) -> usize {
        self.log.lock().unwrap().start_calls
    }

    /// Successful starts
    pub fn starts(&self) -> usize {
        self.log.lock().unwrap().starts
    }

    pub fn stops(&self) -> usize {
        self.log.lock().unwrap().stops
    }

    /// Starts issued while the engine was already active
    pub fn overlapping_starts(&self) -> usize {
        self.log.lock().unwrap().overlapping_starts
    }
}

struct FakeRecognizerPort {
    handle: FakeRecognizer,
}

impl SpeechInputPort for FakeRecognizerPort {
    fn start(&mut self) -> Result<()> {
        let mut log = self.handle.log.lock().unwrap();
        log.start_calls += 1;

        if log.reject_next_starts > 0 {
            log.reject_next_starts -= 1;
            bail!("recognition has already started");
        }
        if log.active {
            log.overlapping_starts += 1;
            bail!("recognition has already started");
        }

        log.active = true;
        log.starts += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let mut log = self.handle.log.lock().unwrap();
        log.stops += 1;
        if log.active {
            log.active = false;
            let _ = self.handle.events.send(RecognitionEvent::End);
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.handle.log.lock().unwrap().active
    }

    fn name(&self) -> &str {
        "fake-recognizer"
    }
}

#[derive(Debug, Default)]
struct SpeakerLog {
    current: Option<String>,
    spoken: Vec<UtteranceRequest>,
    cancelled: Vec<String>,
    completed: Vec<String>,
    voices: Vec<VoiceInfo>,
}

/// Test-side handle on the fake synthesis engine
#[derive(Clone, Default)]
pub struct FakeSpeaker {
    log: Arc<Mutex<SpeakerLog>>,
}

impl FakeSpeaker {
    pub fn with_voices(voices: Vec<VoiceInfo>) -> Self {
        let speaker = Self::default();
        speaker.log.lock().unwrap().voices = voices;
        speaker
    }

    /// Let the current utterance play to completion
    pub fn finish(&self) {
        let mut log = self.log.lock().unwrap();
        if let Some(text) = log.current.take() {
            log.completed.push(text);
        }
    }

    pub fn spoken(&self) -> Vec<UtteranceRequest> {
        self.log.lock().unwrap().spoken.clone()
    }

    pub fn spoken_texts(&self) -> Vec<String> {
        self.spoken().into_iter().map(|u| u.text).collect()
    }

    pub fn cancelled(&self) -> Vec<String> {
        self.log.lock().unwrap().cancelled.clone()
    }

    pub fn completed(&self) -> Vec<String> {
        self.log.lock().unwrap().completed.clone()
    }
}

struct FakeSpeakerPort {
    handle: FakeSpeaker,
}

impl SpeechOutputPort for FakeSpeakerPort {
    fn speak(&mut self, utterance: UtteranceRequest) -> Result<()> {
        let mut log = self.handle.log.lock().unwrap();
        log.current = Some(utterance.text.clone());
        log.spoken.push(utterance);
        Ok(())
    }

    fn cancel(&mut self) {
        let mut log = self.handle.log.lock().unwrap();
        if let Some(text) = log.current.take() {
            log.cancelled.push(text);
        }
    }

    fn is_speaking(&self) -> bool {
        self.handle.log.lock().unwrap().current.is_some()
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        self.handle.log.lock().unwrap().voices.clone()
    }

    fn name(&self) -> &str {
        "fake-speaker"
    }
}

/// Host handing out one fake recognizer and one fake speaker
pub struct FakeHost {
    recognition: Mutex<Option<RecognitionChannel>>,
    speaker: Option<FakeSpeaker>,
    opened_with: Mutex<Option<RecognitionSettings>>,
}

impl FakeHost {
    pub fn new() -> (Self, FakeRecognizer, FakeSpeaker) {
        Self::with_speaker(FakeSpeaker::default())
    }

    pub fn with_speaker(speaker: FakeSpeaker) -> (Self, FakeRecognizer, FakeSpeaker) {
        let (tx, rx) = mpsc::unbounded_channel();
        let recognizer = FakeRecognizer {
            log: Arc::new(Mutex::new(RecognizerLog::default())),
            events: tx,
        };
        let channel = RecognitionChannel {
            port: Box::new(FakeRecognizerPort {
                handle: recognizer.clone(),
            }),
            events: rx,
        };

        let host = Self {
            recognition: Mutex::new(Some(channel)),
            speaker: Some(speaker.clone()),
            opened_with: Mutex::new(None),
        };
        (host, recognizer, speaker)
    }

    /// A host with no speech capability at all
    pub fn empty() -> Self {
        Self {
            recognition: Mutex::new(None),
            speaker: None,
            opened_with: Mutex::new(None),
        }
    }

    pub fn opened_with(&self) -> Option<RecognitionSettings> {
        self.opened_with.lock().unwrap().clone()
    }
}

impl SpeechHost for FakeHost {
    fn supports_recognition(&self) -> bool {
        self.recognition.lock().unwrap().is_some()
    }

    fn supports_synthesis(&self) -> bool {
        self.speaker.is_some()
    }

    fn open_recognition(&self, settings: &RecognitionSettings) -> Result<RecognitionChannel> {
        *self.opened_with.lock().unwrap() = Some(settings.clone());
        match self.recognition.lock().unwrap().take() {
            Some(channel) => Ok(channel),
            None => bail!("recognizer already handed out"),
        }
    }

    fn open_synthesis(&self) -> Result<Box<dyn SpeechOutputPort>> {
        match &self.speaker {
            Some(speaker) => Ok(Box::new(FakeSpeakerPort {
                handle: speaker.clone(),
            })),
            None => bail!("no synthesis"),
        }
    }
}

/// Listener recording every notice in order
#[derive(Default)]
pub struct RecordingListener {
    notices: Mutex<Vec<SessionNotice>>,
}

impl RecordingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notices(&self) -> Vec<SessionNotice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn transcripts(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter_map(|n| match n {
                SessionNotice::Transcript(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<VoiceError> {
        self.notices()
            .into_iter()
            .filter_map(|n| match n {
                SessionNotice::Error(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    pub fn ends(&self) -> usize {
        self.notices()
            .iter()
            .filter(|n| matches!(n, SessionNotice::Ended))
            .count()
    }
}

impl SessionListener for RecordingListener {
    fn on_result(&self, transcript: &str) {
        self.notices
            .lock()
            .unwrap()
            .push(SessionNotice::Transcript(transcript.to_string()));
    }

    fn on_end(&self) {
        self.notices.lock().unwrap().push(SessionNotice::Ended);
    }

    fn on_error(&self, error: &VoiceError) {
        self.notices
            .lock()
            .unwrap()
            .push(SessionNotice::Error(error.clone()));
    }
}

/// Let the event task drain pending recognizer events without reaching any
/// controller timer
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

/// Sleep past the default reconnect delay
pub async fn past_reconnect_delay() {
    tokio::time::sleep(Duration::from_millis(2100)).await;
}
