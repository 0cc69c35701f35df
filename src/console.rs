//! Terminal speech host
//!
//! Stands in for a real speech engine so the assistant can run in a shell:
//! - each stdin line is a final transcript while the recognizer is active
//! - `:end` simulates a silence timeout, `:net` a network fault, `:quit` exits
//! - speech is printed and reported busy for roughly as long as it would take to say

use crate::capability::SpeechHost;
use crate::recognition::{
    RecognitionChannel, RecognitionErrorCode, RecognitionEvent, RecognitionSettings,
    SpeechInputPort,
};
use crate::speech::{SpeechOutputPort, UtteranceRequest, VoiceInfo};
use anyhow::{bail, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, Notify};
use tracing::{debug, info};

/// Average speaking speed at rate 1.0
const WORDS_PER_MINUTE: f32 = 160.0;

pub struct ConsoleHost {
    quit: Arc<Notify>,
}

impl ConsoleHost {
    pub fn new() -> Self {
        Self {
            quit: Arc::new(Notify::new()),
        }
    }

    /// Notified when the user types `:quit` or stdin closes
    pub fn quit_signal(&self) -> Arc<Notify> {
        Arc::clone(&self.quit)
    }
}

impl Default for ConsoleHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechHost for ConsoleHost {
    fn supports_recognition(&self) -> bool {
        true
    }

    fn supports_synthesis(&self) -> bool {
        true
    }

    fn open_recognition(&self, settings: &RecognitionSettings) -> Result<RecognitionChannel> {
        let (tx, rx) = mpsc::unbounded_channel();
        let active = Arc::new(AtomicBool::new(false));

        tokio::spawn(read_stdin(
            Arc::clone(&active),
            tx.clone(),
            settings.interim_results,
            Arc::clone(&self.quit),
        ));

        info!("Console recognizer opened ({})", settings.locale);

        Ok(RecognitionChannel {
            port: Box::new(ConsoleRecognizer { active, events: tx }),
            events: rx,
        })
    }

    fn open_synthesis(&self) -> Result<Box<dyn SpeechOutputPort>> {
        Ok(Box::new(ConsoleSpeaker {
            speaking_until: None,
        }))
    }
}

/// Feed stdin lines to the recognizer's event stream
async fn read_stdin(
    active: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<RecognitionEvent>,
    interim_results: bool,
    quit: Arc<Notify>,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();

        match line {
            "" => continue,
            ":quit" => break,
            ":end" => {
                if active.swap(false, Ordering::SeqCst) {
                    println!("(recognizer timed out)");
                    let _ = events.send(RecognitionEvent::End);
                }
            }
            ":net" => {
                if active.swap(false, Ordering::SeqCst) {
                    println!("(network dropped)");
                    let _ = events.send(RecognitionEvent::Error(RecognitionErrorCode::Network));
                    let _ = events.send(RecognitionEvent::End);
                }
            }
            _ if !active.load(Ordering::SeqCst) => {
                println!("(microphone off, ignored)");
            }
            _ => {
                let words: Vec<&str> = line.split_whitespace().collect();
                if interim_results && words.len() > 1 {
                    let partial = words[..words.len() - 1].join(" ");
                    let _ = events.send(RecognitionEvent::interim(partial));
                }
                let _ = events.send(RecognitionEvent::final_result(line));
            }
        }
    }

    debug!("Console input closed");
    quit.notify_one();
}

struct ConsoleRecognizer {
    active: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<RecognitionEvent>,
}

impl SpeechInputPort for ConsoleRecognizer {
    fn start(&mut self) -> Result<()> {
        if self.active.swap(true, Ordering::SeqCst) {
            bail!("console recognizer already started");
        }
        println!("(listening)");
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if self.active.swap(false, Ordering::SeqCst) {
            println!("(microphone off)");
            let _ = self.events.send(RecognitionEvent::End);
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "console"
    }
}

struct ConsoleSpeaker {
    speaking_until: Option<Instant>,
}

impl SpeechOutputPort for ConsoleSpeaker {
    fn speak(&mut self, utterance: UtteranceRequest) -> Result<()> {
        let voice = utterance
            .voice
            .as_ref()
            .map(|voice| voice.name.as_str())
            .unwrap_or("default");
        println!("[assistant/{}] {}", voice, utterance.text);

        let words = utterance.text.split_whitespace().count() as f32;
        let rate = utterance.rate.max(0.1);
        let secs = words * 60.0 / (WORDS_PER_MINUTE * rate);
        self.speaking_until = Some(Instant::now() + Duration::from_secs_f32(secs));
        Ok(())
    }

    fn cancel(&mut self) {
        if self.is_speaking() {
            println!("[assistant] (interrupted)");
        }
        self.speaking_until = None;
    }

    fn is_speaking(&self) -> bool {
        self.speaking_until
            .map(|until| Instant::now() < until)
            .unwrap_or(false)
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        vec![
            VoiceInfo {
                name: "Console".to_string(),
                lang: "en-US".to_string(),
                default: true,
            },
            VoiceInfo::new("Console Samantha", "en-US"),
        ]
    }

    fn name(&self) -> &str {
        "console"
    }
}
