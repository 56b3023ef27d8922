//! Shared test utilities

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use speakgenie::error::{CaptureError, PlaybackError};
use speakgenie::responder::{ChatRequest, Responder, RoleplayRequest, TranslateRequest};
use speakgenie::voice::{SpeechIo, VoiceProfile};
use speakgenie::{ConversationGateway, TurnSession};
use tokio::sync::Notify;

/// One playback observed by [`FakeSpeech`]
#[derive(Debug, Clone, PartialEq)]
pub struct Played {
    pub text: String,
    pub language: String,
}

/// Scripted speech host
///
/// Captures pop from a queue (an empty queue means silence). When `hold` is
/// set, each capture waits for a notification before answering.
#[derive(Default)]
pub struct FakeSpeech {
    captures: Mutex<VecDeque<Result<String, CaptureError>>>,
    played: Mutex<Vec<Played>>,
    playback_error: Mutex<Option<PlaybackError>>,
    hold: Mutex<Option<Arc<Notify>>>,
}

impl FakeSpeech {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a recognized transcript
    pub fn say(&self, text: &str) {
        self.captures
            .lock()
            .unwrap()
            .push_back(Ok(text.to_string()));
    }

    /// Queue a capture failure
    pub fn fail_capture(&self, error: CaptureError) {
        self.captures.lock().unwrap().push_back(Err(error));
    }

    /// Make every playback fail with `error`
    pub fn fail_playback(&self, error: PlaybackError) {
        *self.playback_error.lock().unwrap() = Some(error);
    }

    /// Hold captures until the returned notifier fires
    pub fn hold_captures(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.hold.lock().unwrap() = Some(notify.clone());
        notify
    }

    #[must_use]
    pub fn played(&self) -> Vec<Played> {
        self.played.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechIo for FakeSpeech {
    async fn capture(&self) -> Result<String, CaptureError> {
        let hold = self.hold.lock().unwrap().clone();
        if let Some(notify) = hold {
            notify.notified().await;
        }
        self.captures
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(CaptureError::NoSpeech))
    }

    async fn speak(&self, text: &str, profile: &VoiceProfile) -> Result<(), PlaybackError> {
        if let Some(error) = self.playback_error.lock().unwrap().clone() {
            return Err(error);
        }
        self.played.lock().unwrap().push(Played {
            text: text.to_string(),
            language: profile.language_tag().to_string(),
        });
        Ok(())
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Deterministic responder that echoes its input
#[derive(Default)]
pub struct EchoResponder {
    pub histories: Mutex<Vec<usize>>,
}

#[async_trait]
impl Responder for EchoResponder {
    async fn chat(&self, request: &ChatRequest) -> speakgenie::Result<String> {
        self.histories.lock().unwrap().push(request.history.len());
        Ok(format!("echo: {}", request.message))
    }

    async fn roleplay(&self, request: &RoleplayRequest) -> speakgenie::Result<String> {
        self.histories.lock().unwrap().push(request.history.len());
        Ok(format!("{}: {}", request.scenario.id, request.message))
    }

    async fn translate(&self, request: &TranslateRequest) -> speakgenie::Result<String> {
        Ok(format!("[{}] {}", request.target_language, request.text))
    }
}

/// Session over a fake speech host and an echo responder
#[must_use]
pub fn test_session(speech: &Arc<FakeSpeech>) -> (TurnSession, Arc<EchoResponder>) {
    let responder = Arc::new(EchoResponder::default());
    let gateway = ConversationGateway::new(responder.clone());
    (TurnSession::new(speech.clone(), gateway), responder)
}
