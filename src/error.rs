//! Error types for SpeakGenie

use thiserror::Error;

/// Result type alias for SpeakGenie operations
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a speech capture can fail
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// Another capture is already pending
    #[error("already listening")]
    Busy,

    /// The recognizer finished without hearing any speech
    #[error("no speech detected")]
    NoSpeech,

    /// Microphone access was refused or the input was closed
    #[error("microphone access denied")]
    Denied,

    /// The host has no speech recognition primitive
    #[error("speech recognition not supported")]
    Unsupported,

    /// The recognizer did not settle within the capture timeout
    #[error("speech capture timed out")]
    Timeout,

    /// Any other recognizer failure
    #[error("speech recognition error: {0}")]
    Failed(String),
}

/// Reasons a speech playback can fail
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// The host has no speech synthesis primitive
    #[error("speech synthesis not supported")]
    Unsupported,

    /// The synthesizer reported an error
    #[error("speech synthesis error: {0}")]
    SynthesisFailed(String),

    /// A newer `speak` call preempted this one
    #[error("playback interrupted by a newer utterance")]
    Interrupted,

    /// Playback did not finish within the playback timeout
    #[error("speech playback timed out")]
    Timeout,
}

/// Errors that can occur in SpeakGenie
#[derive(Debug, Error)]
pub enum Error {
    /// A turn was requested while another one is in progress
    #[error("a turn is already in progress")]
    TurnBusy,

    /// Operation not allowed in the current turn state
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// No agent utterance with the given id exists in the transcript
    #[error("utterance not found: {0}")]
    UtteranceNotFound(String),

    /// The session was reset while this turn was in flight
    #[error("turn abandoned by session reset")]
    TurnAbandoned,

    /// Unknown roleplay scenario
    #[error("scenario not found: {0}")]
    ScenarioNotFound(String),

    /// Speech capture error
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),

    /// Speech playback error
    #[error("playback error: {0}")]
    Playback(#[from] PlaybackError),

    /// Responder backend error
    #[error("responder error: {0}")]
    Responder(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Child-friendly message for the host to show or speak
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::TurnBusy => "Wait a moment, I'm still thinking!",
            Self::Capture(CaptureError::Unsupported) | Self::Playback(PlaybackError::Unsupported) => {
                "Voice is not supported here. Please try another device."
            }
            Self::Capture(CaptureError::Denied) => {
                "I can't hear you. Please allow the microphone and try again!"
            }
            Self::Capture(_) => "Sorry, I couldn't hear you clearly. Please try again!",
            Self::Playback(_) => "Oops, I couldn't say that out loud. Tap the speaker to hear it again!",
            _ => "Something went wrong. Let's try again!",
        }
    }

    /// Whether the user can simply retry the same action
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::TurnBusy | Self::Capture(_) | Self::Playback(_) | Self::TurnAbandoned
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_errors_map_to_hearing_message() {
        let err = Error::from(CaptureError::NoSpeech);
        assert_eq!(
            err.user_message(),
            "Sorry, I couldn't hear you clearly. Please try again!"
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn unsupported_voice_has_dedicated_message() {
        let err = Error::from(PlaybackError::Unsupported);
        assert!(err.user_message().contains("not supported"));
    }

    #[test]
    fn config_errors_are_not_retryable() {
        assert!(!Error::Config("bad".to_string()).is_retryable());
    }
}
