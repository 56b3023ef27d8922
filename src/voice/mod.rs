//! Voice input/output
//!
//! The session talks to speech through [`SpeechIo`]: capture one utterance,
//! speak one utterance. [`SpeechAdapter`] implements it over the host's
//! recognition and synthesis primitives ([`Recognizer`], [`Synthesizer`]).

mod adapter;
mod console;
mod profile;

use async_trait::async_trait;

pub use adapter::SpeechAdapter;
pub use console::{ConsoleRecognizer, ConsoleSynthesizer};
pub use profile::{Voice, VoiceProfile, select_voice};

use crate::error::{CaptureError, PlaybackError};

/// Capture and playback of single utterances
#[async_trait]
pub trait SpeechIo: Send + Sync {
    /// Listen until one utterance is recognized
    ///
    /// # Errors
    ///
    /// Returns `CaptureError::Busy` if a capture is already pending, or the
    /// recognizer's failure reason
    async fn capture(&self) -> Result<String, CaptureError>;

    /// Speak `text` and wait for playback to finish
    ///
    /// # Errors
    ///
    /// Returns the synthesizer failure, or `PlaybackError::Interrupted` when a
    /// newer call preempted this one
    async fn speak(&self, text: &str, profile: &VoiceProfile) -> Result<(), PlaybackError>;

    /// Whether both capture and playback exist on this host
    fn is_available(&self) -> bool;
}

/// One utterance handed to the synthesizer
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub text: String,
    /// Resolved voice, `None` means the platform default
    pub voice: Option<Voice>,
    pub language: String,
    pub rate: f32,
    pub pitch: f32,
}

/// Host speech-to-text primitive
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Whether recognition exists on this host
    fn is_available(&self) -> bool {
        true
    }

    /// Recognize a single utterance in `language`
    ///
    /// # Errors
    ///
    /// Returns the platform's failure reason
    async fn recognize(&self, language: &str) -> Result<String, CaptureError>;
}

/// Host text-to-speech primitive
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Whether synthesis exists on this host
    fn is_available(&self) -> bool {
        true
    }

    /// Voices installed on the host
    fn voices(&self) -> Vec<Voice>;

    /// Play one utterance to completion
    ///
    /// Dropping the returned future must stop playback.
    ///
    /// # Errors
    ///
    /// Returns the platform's failure reason
    async fn play(&self, request: &SpeechRequest) -> Result<(), PlaybackError>;
}
