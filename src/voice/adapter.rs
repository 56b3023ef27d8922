//! `SpeechIo` over host recognition and synthesis primitives

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{Recognizer, SpeechIo, SpeechRequest, Synthesizer, VoiceProfile, select_voice};
use crate::error::{CaptureError, PlaybackError};

/// Recognition language used when none is configured
const DEFAULT_RECOGNITION_LANGUAGE: &str = "en-US";

/// Playback currently holding the output stream
struct ActivePlayback {
    id: u64,
    cancel: oneshot::Sender<()>,
}

/// Adapts a [`Recognizer`] and a [`Synthesizer`] to [`SpeechIo`]
///
/// Enforces a single pending capture and last-call-wins playback.
pub struct SpeechAdapter<R, S> {
    recognizer: R,
    synthesizer: S,
    recognition_language: String,
    listening: AtomicBool,
    next_playback: AtomicU64,
    active: Mutex<Option<ActivePlayback>>,
}

impl<R: Recognizer, S: Synthesizer> SpeechAdapter<R, S> {
    /// Create an adapter recognizing American English
    #[must_use]
    pub fn new(recognizer: R, synthesizer: S) -> Self {
        Self {
            recognizer,
            synthesizer,
            recognition_language: DEFAULT_RECOGNITION_LANGUAGE.to_string(),
            listening: AtomicBool::new(false),
            next_playback: AtomicU64::new(0),
            active: Mutex::new(None),
        }
    }

    /// Set the recognition language
    #[must_use]
    pub fn recognition_language(mut self, language: impl Into<String>) -> Self {
        self.recognition_language = language.into();
        self
    }

    /// Install a new playback as the active one, cancelling the previous
    fn preempt(&self) -> (u64, oneshot::Receiver<()>) {
        let id = self.next_playback.fetch_add(1, Ordering::Relaxed);
        let (cancel, cancelled) = oneshot::channel();

        let previous = self
            .active
            .lock()
            .map(|mut slot| slot.replace(ActivePlayback { id, cancel }))
            .unwrap_or_default();

        if let Some(previous) = previous {
            tracing::debug!(preempted = previous.id, by = id, "cancelling current playback");
            let _ = previous.cancel.send(());
        }

        (id, cancelled)
    }

    /// Release the output stream if `id` still holds it
    fn release(&self, id: u64) {
        if let Ok(mut slot) = self.active.lock() {
            if slot.as_ref().is_some_and(|active| active.id == id) {
                slot.take();
            }
        }
    }
}

/// Clears the listening flag even if the capture future is dropped
struct ListeningGuard<'a>(&'a AtomicBool);

impl Drop for ListeningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[async_trait]
impl<R: Recognizer, S: Synthesizer> SpeechIo for SpeechAdapter<R, S> {
    async fn capture(&self) -> Result<String, CaptureError> {
        if !self.recognizer.is_available() {
            return Err(CaptureError::Unsupported);
        }

        if self
            .listening
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CaptureError::Busy);
        }
        let _guard = ListeningGuard(&self.listening);

        tracing::debug!(language = %self.recognition_language, "listening");
        let transcript = self
            .recognizer
            .recognize(&self.recognition_language)
            .await?;

        let text = transcript.trim();
        if text.is_empty() {
            return Err(CaptureError::NoSpeech);
        }

        tracing::debug!(transcript = %text, "speech recognized");
        Ok(text.to_string())
    }

    async fn speak(&self, text: &str, profile: &VoiceProfile) -> Result<(), PlaybackError> {
        if text.trim().is_empty() {
            return Ok(());
        }

        if !self.synthesizer.is_available() {
            return Err(PlaybackError::Unsupported);
        }

        let (id, cancelled) = self.preempt();

        let voices = self.synthesizer.voices();
        let request = SpeechRequest {
            text: text.to_string(),
            voice: select_voice(&voices, profile).cloned(),
            language: profile.language_tag().to_string(),
            rate: profile.rate(),
            pitch: profile.pitch(),
        };

        tracing::debug!(
            playback = id,
            voice = request.voice.as_ref().map_or("default", |v| v.name.as_str()),
            language = %request.language,
            "speaking"
        );

        let result = tokio::select! {
            result = self.synthesizer.play(&request) => result,
            Ok(()) = cancelled => Err(PlaybackError::Interrupted),
        };

        self.release(id);
        result
    }

    fn is_available(&self) -> bool {
        self.recognizer.is_available() && self.synthesizer.is_available()
    }
}
