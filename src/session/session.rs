use super::config::SessionConfig;
use super::listener::{SessionListener, SessionNotice};
use super::state::{SessionStatus, StartAttempt, StopCause, TimerKind};
use super::stats::SessionStats;
use crate::capability::{self, CapabilityReport, SpeechHost};
use crate::error::VoiceError;
use crate::recognition::{RecognitionErrorCode, RecognitionEvent, SpeechInputPort};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// A scheduled restart, identified so a late firing can tell it was replaced
struct PendingTimer {
    id: u64,
    handle: JoinHandle<()>,
}

/// Cancel the timer in `slot`, returning whether one was pending
fn cancel_timer(slot: &mut Option<PendingTimer>) -> bool {
    match slot.take() {
        Some(timer) => {
            timer.handle.abort();
            true
        }
        None => false,
    }
}

/// One recognizer start, answered later by exactly one `End`
struct RecognizerRun {
    /// Set when the controller stopped this run itself
    stop: Option<StopCause>,
}

/// Mutable session state, guarded by one lock
struct SessionState {
    status: SessionStatus,

    /// Recognizer, `None` when the host has no recognition capability
    port: Option<Box<dyn SpeechInputPort>>,

    /// Whether an unexpected end should trigger the reconnect policy
    auto_restart: bool,

    reconnect_attempts: u32,

    /// At most one of each kind exists at a time
    pending_reconnect: Option<PendingTimer>,
    pending_start_retry: Option<PendingTimer>,
    next_timer_id: u64,

    /// Started runs whose `End` has not arrived yet, oldest first. Only the
    /// newest can be the live one.
    runs: VecDeque<RecognizerRun>,

    /// Latest interim text, for live captioning
    interim_caption: Option<String>,

    /// Task pumping recognizer events into the controller
    event_task: Option<JoinHandle<()>>,

    resource_starts: usize,
    transcripts_delivered: usize,
    interim_results: usize,
    reconnects_scheduled: usize,
    errors_reported: usize,
}

impl SessionState {
    fn report(&mut self, notices: &mut Vec<SessionNotice>, error: VoiceError) {
        self.errors_reported += 1;
        notices.push(SessionNotice::Error(error));
    }

    fn cancel_timers(&mut self) -> bool {
        let reconnect = cancel_timer(&mut self.pending_reconnect);
        let retry = cancel_timer(&mut self.pending_start_retry);
        reconnect || retry
    }

    /// Stop the recognizer if it is running. Returns whether a stop was issued.
    fn stop_port(&mut self, cause: StopCause) -> bool {
        let Some(port) = self.port.as_mut() else {
            return false;
        };
        if !port.is_active() {
            return false;
        }

        match port.stop() {
            Ok(()) => {
                if let Some(run) = self.runs.back_mut() {
                    run.stop = Some(cause);
                }
            }
            Err(e) => warn!("Error stopping recognizer {}: {:#}", port.name(), e),
        }
        true
    }
}

/// State shared between the controller handle, the event task and timers
struct Shared {
    config: SessionConfig,
    listener: Arc<dyn SessionListener>,
    started_at: DateTime<Utc>,
    state: Mutex<SessionState>,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver notices to the listener. Must run with the state unlocked.
    fn dispatch(&self, notices: Vec<SessionNotice>) {
        for notice in notices {
            match notice {
                SessionNotice::Transcript(transcript) => self.listener.on_result(&transcript),
                SessionNotice::Ended => self.listener.on_end(),
                SessionNotice::Error(error) => self.listener.on_error(&error),
            }
        }
    }

    fn start(self: &Arc<Self>) {
        let mut notices = Vec::new();
        {
            let mut state = self.lock_state();

            if state.status == SessionStatus::Terminated {
                warn!("Session {} is disposed, ignoring start", self.config.session_id);
                return;
            }

            if state.port.is_none() {
                warn!(
                    "Cannot start session {}: speech recognition unavailable",
                    self.config.session_id
                );
                state.report(&mut notices, VoiceError::CapabilityUnavailable);
            } else {
                info!("Starting voice session: {}", self.config.session_id);
                state.auto_restart = self.config.auto_restart;
                state.reconnect_attempts = 0;
                cancel_timer(&mut state.pending_reconnect);
                self.begin_listening(&mut state, &mut notices, StartAttempt::First);
            }
        }
        self.dispatch(notices);
    }

    fn stop(&self) {
        let mut state = self.lock_state();

        if state.status == SessionStatus::Terminated {
            return;
        }

        let previous = state.status;
        state.auto_restart = false;
        let cancelled = state.cancel_timers();
        let stopped = state.stop_port(StopCause::Explicit);
        state.status = SessionStatus::Idle;

        if previous == SessionStatus::Idle && !cancelled && !stopped {
            debug!("Session {} already idle", self.config.session_id);
        } else {
            info!(
                "Voice session {} stopped (was {})",
                self.config.session_id, previous
            );
        }
    }

    fn dispose(&self) {
        let mut state = self.lock_state();

        if state.status == SessionStatus::Terminated {
            return;
        }

        state.auto_restart = false;
        state.cancel_timers();
        state.stop_port(StopCause::Explicit);
        state.status = SessionStatus::Terminated;

        if let Some(task) = state.event_task.take() {
            task.abort();
        }

        info!("Voice session {} disposed", self.config.session_id);
    }

    /// Issue a resource-level start, pre-stopping a recognizer that is still active
    fn begin_listening(
        self: &Arc<Self>,
        state: &mut SessionState,
        notices: &mut Vec<SessionNotice>,
        attempt: StartAttempt,
    ) {
        cancel_timer(&mut state.pending_start_retry);

        if state.stop_port(StopCause::Restart) {
            debug!(
                "Recognizer still active for session {}, stopped before restart",
                self.config.session_id
            );
        }

        let Some(port) = state.port.as_mut() else {
            return;
        };

        match port.start() {
            Ok(()) => {
                info!(
                    "Voice session {} listening on {}",
                    self.config.session_id,
                    port.name()
                );
                state.status = SessionStatus::Listening;
                state.resource_starts += 1;
                state.runs.push_back(RecognizerRun { stop: None });
            }
            Err(e) => match attempt {
                StartAttempt::First => {
                    warn!(
                        "Recognizer rejected start for session {}: {:#}; retrying in {:?}",
                        self.config.session_id, e, self.config.start_retry_delay
                    );
                    state.status = SessionStatus::Idle;
                    let timer =
                        self.schedule(state, TimerKind::StartRetry, self.config.start_retry_delay);
                    state.pending_start_retry = Some(timer);
                }
                StartAttempt::Retry => {
                    error!(
                        "Recognizer rejected start retry for session {}: {:#}",
                        self.config.session_id, e
                    );
                    state.status = SessionStatus::Idle;
                    state.auto_restart = false;
                    state.report(notices, VoiceError::StartFailed);
                }
            },
        }
    }

    /// Bounded, fixed-delay restart after an unexpected end or a network fault
    fn apply_reconnect_policy(
        self: &Arc<Self>,
        state: &mut SessionState,
        notices: &mut Vec<SessionNotice>,
    ) {
        cancel_timer(&mut state.pending_start_retry);

        if state.reconnect_attempts >= self.config.max_reconnect_attempts {
            let attempts = state.reconnect_attempts;
            error!(
                "Session {} giving up after {} reconnect attempts",
                self.config.session_id, attempts
            );
            state.reconnect_attempts = 0;
            state.auto_restart = false;
            cancel_timer(&mut state.pending_reconnect);
            state.stop_port(StopCause::Explicit);
            state.status = SessionStatus::Idle;
            state.report(notices, VoiceError::ReconnectExhausted { attempts });
            return;
        }

        state.reconnect_attempts += 1;
        cancel_timer(&mut state.pending_reconnect);
        state.status = SessionStatus::Reconnecting;
        state.reconnects_scheduled += 1;

        info!(
            "Session {} reconnect attempt {}/{} in {:?}",
            self.config.session_id,
            state.reconnect_attempts,
            self.config.max_reconnect_attempts,
            self.config.reconnect_delay
        );

        let timer = self.schedule(state, TimerKind::Reconnect, self.config.reconnect_delay);
        state.pending_reconnect = Some(timer);
    }

    fn schedule(
        self: &Arc<Self>,
        state: &mut SessionState,
        kind: TimerKind,
        delay: Duration,
    ) -> PendingTimer {
        state.next_timer_id += 1;
        let id = state.next_timer_id;
        let shared: Weak<Shared> = Arc::downgrade(self);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(shared) = shared.upgrade() {
                shared.fire_timer(kind, id);
            }
        });

        PendingTimer { id, handle }
    }

    fn fire_timer(self: &Arc<Self>, kind: TimerKind, id: u64) {
        let mut notices = Vec::new();
        {
            let mut state = self.lock_state();

            let pending = match kind {
                TimerKind::Reconnect => &mut state.pending_reconnect,
                TimerKind::StartRetry => &mut state.pending_start_retry,
            };
            if pending.as_ref().map(|timer| timer.id) != Some(id) {
                debug!("Ignoring superseded {:?} timer {}", kind, id);
                return;
            }
            // Running inside this timer's task; dropping the handle just detaches it
            pending.take();

            if state.status == SessionStatus::Terminated {
                return;
            }

            match kind {
                TimerKind::Reconnect if !state.auto_restart => {}
                TimerKind::Reconnect => {
                    info!(
                        "Session {} reconnecting (attempt {}/{})",
                        self.config.session_id,
                        state.reconnect_attempts,
                        self.config.max_reconnect_attempts
                    );
                    self.begin_listening(&mut state, &mut notices, StartAttempt::First);
                }
                TimerKind::StartRetry => {
                    self.begin_listening(&mut state, &mut notices, StartAttempt::Retry);
                }
            }
        }
        self.dispatch(notices);
    }

    fn handle_event(self: &Arc<Self>, event: RecognitionEvent) {
        let mut notices = Vec::new();
        {
            let mut state = self.lock_state();

            if state.status == SessionStatus::Terminated {
                return;
            }

            match event {
                RecognitionEvent::Result {
                    transcript,
                    is_final,
                    confidence,
                } => self.on_result(&mut state, &mut notices, transcript, is_final, confidence),
                RecognitionEvent::End => self.on_end(&mut state, &mut notices),
                RecognitionEvent::Error(code) => self.on_error(&mut state, &mut notices, code),
            }
        }
        self.dispatch(notices);
    }

    fn on_result(
        &self,
        state: &mut SessionState,
        notices: &mut Vec<SessionNotice>,
        transcript: String,
        is_final: bool,
        confidence: Option<f32>,
    ) {
        if !is_final {
            state.interim_results += 1;
            state.interim_caption = Some(transcript);
            return;
        }

        state.interim_caption = None;

        let text = transcript.trim();
        if text.is_empty() {
            debug!("Ignoring empty final transcript");
            return;
        }

        match confidence {
            Some(confidence) => info!("Final transcript: {} (confidence={:.2})", text, confidence),
            None => info!("Final transcript: {}", text),
        }

        // A delivered result proves the connection healthy
        state.reconnect_attempts = 0;
        state.transcripts_delivered += 1;
        notices.push(SessionNotice::Transcript(text.to_string()));
    }

    fn on_end(
        self: &Arc<Self>,
        state: &mut SessionState,
        notices: &mut Vec<SessionNotice>,
    ) {
        let run = state.runs.pop_front();
        let superseded = !state.runs.is_empty();

        match run.and_then(|run| run.stop) {
            Some(StopCause::Restart) => {
                debug!(
                    "Swallowed end of pre-stopped recognizer for session {}",
                    self.config.session_id
                );
            }
            Some(StopCause::Explicit) => {
                info!("Voice session {} ended", self.config.session_id);
                notices.push(SessionNotice::Ended);
            }
            None if superseded => {
                debug!(
                    "Ignoring end of a recognizer run already replaced in session {}",
                    self.config.session_id
                );
            }
            None => {
                notices.push(SessionNotice::Ended);

                if state.status != SessionStatus::Listening {
                    debug!(
                        "Recognizer end while {} for session {}",
                        state.status, self.config.session_id
                    );
                    return;
                }

                if state.auto_restart {
                    info!(
                        "Recognizer ended unexpectedly for session {}",
                        self.config.session_id
                    );
                    self.apply_reconnect_policy(state, notices);
                } else {
                    info!("Voice session {} ended", self.config.session_id);
                    state.status = SessionStatus::Idle;
                }
            }
        }
    }

    fn on_error(
        self: &Arc<Self>,
        state: &mut SessionState,
        notices: &mut Vec<SessionNotice>,
        code: RecognitionErrorCode,
    ) {
        if state.runs.len() > 1 {
            debug!(
                "Ignoring {} from a recognizer run already replaced in session {}",
                code, self.config.session_id
            );
            return;
        }

        if code.is_transient() && state.auto_restart {
            warn!(
                "Network error on session {}, trying to reconnect",
                self.config.session_id
            );
            if state.reconnect_attempts < self.config.max_reconnect_attempts {
                state.report(notices, VoiceError::TransientNetwork);
            }
            self.apply_reconnect_policy(state, notices);
        } else {
            warn!(
                "Recognition error on session {}: {}",
                self.config.session_id, code
            );
            state.report(notices, VoiceError::Recognition(code));
        }
    }
}

/// Continuous voice session over a host recognizer
///
/// `start` and `stop` return immediately; outcomes reach the
/// `SessionListener`. Must be created inside a Tokio runtime: recognizer
/// events are pumped by a spawned task and restarts run on Tokio timers.
/// Dropping the controller disposes it.
pub struct VoiceSessionController {
    shared: Arc<Shared>,
    capabilities: CapabilityReport,
}

impl VoiceSessionController {
    /// Create a controller, probing `host` for a recognizer.
    ///
    /// Without one the listener receives `VoiceError::CapabilityUnavailable`
    /// and the session stays idle for good.
    pub fn new(
        host: &dyn SpeechHost,
        config: SessionConfig,
        listener: Arc<dyn SessionListener>,
    ) -> Self {
        info!("Creating voice session: {}", config.session_id);

        let capabilities = capability::probe(host);
        let channel = capability::open_recognition(host, &capabilities, &config.recognition);

        let (port, events) = match channel {
            Some(channel) => (Some(channel.port), Some(channel.events)),
            None => (None, None),
        };

        let shared = Arc::new(Shared {
            config,
            listener,
            started_at: Utc::now(),
            state: Mutex::new(SessionState {
                status: SessionStatus::Idle,
                port,
                auto_restart: false,
                reconnect_attempts: 0,
                pending_reconnect: None,
                pending_start_retry: None,
                next_timer_id: 0,
                runs: VecDeque::new(),
                interim_caption: None,
                event_task: None,
                resource_starts: 0,
                transcripts_delivered: 0,
                interim_results: 0,
                reconnects_scheduled: 0,
                errors_reported: 0,
            }),
        });

        match events {
            Some(mut events) => {
                let pump = Arc::clone(&shared);
                let task = tokio::spawn(async move {
                    debug!("Recognition event task started");
                    while let Some(event) = events.recv().await {
                        pump.handle_event(event);
                    }
                    debug!("Recognition event task stopped");
                });
                shared.lock_state().event_task = Some(task);
            }
            None => {
                let mut notices = Vec::new();
                shared
                    .lock_state()
                    .report(&mut notices, VoiceError::CapabilityUnavailable);
                shared.dispatch(notices);
            }
        }

        Self {
            shared,
            capabilities,
        }
    }

    /// Start listening, restarting the recognizer if it is already running
    pub fn start(&self) {
        self.shared.start();
    }

    /// Stop listening and cancel any pending restart. No-op when idle.
    pub fn stop(&self) {
        self.shared.stop();
    }

    /// Tear the session down for good
    pub fn dispose(&self) {
        self.shared.dispose();
    }

    pub fn status(&self) -> SessionStatus {
        self.shared.lock_state().status
    }

    pub fn is_listening(&self) -> bool {
        self.status() == SessionStatus::Listening
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.shared.lock_state().reconnect_attempts
    }

    /// Latest interim transcript since the last final one
    pub fn interim_caption(&self) -> Option<String> {
        self.shared.lock_state().interim_caption.clone()
    }

    pub fn capabilities(&self) -> CapabilityReport {
        self.capabilities
    }

    pub fn session_id(&self) -> &str {
        &self.shared.config.session_id
    }

    /// Get current session statistics
    pub fn stats(&self) -> SessionStats {
        let duration = Utc::now().signed_duration_since(self.shared.started_at);
        let state = self.shared.lock_state();

        SessionStats {
            status: state.status,
            started_at: self.shared.started_at,
            uptime_secs: duration.num_milliseconds() as f64 / 1000.0,
            resource_starts: state.resource_starts,
            transcripts_delivered: state.transcripts_delivered,
            interim_results: state.interim_results,
            reconnects_scheduled: state.reconnects_scheduled,
            errors_reported: state.errors_reported,
            reconnect_attempts: state.reconnect_attempts,
        }
    }
}

impl Drop for VoiceSessionController {
    fn drop(&mut self) {
        self.shared.dispose();
    }
}
