//! Turn session coordinator
//!
//! Runs one listen → reply → speak cycle at a time and owns the turn state
//! and transcript for the session's lifetime.
//!
//! ```text
//! Idle ──► Listening ──► AwaitingReply ──► Speaking ──► Idle
//!              │
//!              └── capture failed / no speech ──► Idle
//! ```
//!
//! The state lock is never held across an await. Every in-flight operation
//! carries the session epoch it started in; [`TurnSession::reset`] bumps the
//! epoch so stale turns can no longer touch state or transcript.

mod roleplay;
mod transcript;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;

pub use roleplay::{RoleplaySession, RoleplayTurn};
pub use transcript::{Speaker, Utterance};

use crate::error::{CaptureError, PlaybackError};
use crate::gateway::ConversationGateway;
use crate::scenario::ScenarioScript;
use crate::voice::{SpeechIo, VoiceProfile};
use crate::{Error, Result};

/// Default bound on a single capture
pub const DEFAULT_CAPTURE_TIMEOUT: Duration = Duration::from_secs(30);

/// Default bound on a single playback
pub const DEFAULT_PLAYBACK_TIMEOUT: Duration = Duration::from_secs(60);

/// Session-wide turn state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    Idle,
    Listening,
    AwaitingReply,
    Speaking,
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Listening => "listening",
            Self::AwaitingReply => "awaiting_reply",
            Self::Speaking => "speaking",
        };
        f.write_str(name)
    }
}

/// Which backend call a turn makes
#[derive(Debug, Clone, Default)]
pub enum ConversationMode {
    /// Open conversation with the tutor
    #[default]
    FreeChat,
    /// Guided roleplay in a scenario
    Scenario(Arc<ScenarioScript>),
}

/// An agent utterance and how its playback went
#[derive(Debug, Clone)]
pub struct SpokenUtterance {
    pub utterance: Utterance,
    /// Set when the utterance was added to the transcript but could not be played
    pub playback_error: Option<PlaybackError>,
}

/// Result of a settled turn
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// The user spoke and the agent replied
    Completed {
        user: Utterance,
        reply: SpokenUtterance,
    },
    /// Nothing was heard; the transcript is unchanged
    NoSpeech,
}

struct Inner {
    transcript: Vec<Utterance>,
    mode: ConversationMode,
    profile: VoiceProfile,
    epoch: u64,
}

/// Coordinates speech capture, the conversation gateway and playback
pub struct TurnSession {
    speech: Arc<dyn SpeechIo>,
    gateway: ConversationGateway,
    capture_timeout: Duration,
    playback_timeout: Duration,
    state: watch::Sender<TurnState>,
    inner: Mutex<Inner>,
}

impl TurnSession {
    /// Create an idle free-chat session with an empty transcript
    #[must_use]
    pub fn new(speech: Arc<dyn SpeechIo>, gateway: ConversationGateway) -> Self {
        let (state, _) = watch::channel(TurnState::Idle);
        Self {
            speech,
            gateway,
            capture_timeout: DEFAULT_CAPTURE_TIMEOUT,
            playback_timeout: DEFAULT_PLAYBACK_TIMEOUT,
            state,
            inner: Mutex::new(Inner {
                transcript: Vec::new(),
                mode: ConversationMode::FreeChat,
                profile: VoiceProfile::default(),
                epoch: 0,
            }),
        }
    }

    /// Set the voice used for agent playback
    #[must_use]
    pub fn with_voice_profile(self, profile: VoiceProfile) -> Self {
        self.lock().profile = profile;
        self
    }

    /// Set the capture and playback bounds
    #[must_use]
    pub const fn with_timeouts(mut self, capture: Duration, playback: Duration) -> Self {
        self.capture_timeout = capture;
        self.playback_timeout = playback;
        self
    }

    /// Current turn state
    #[must_use]
    pub fn state(&self) -> TurnState {
        *self.state.borrow()
    }

    /// Observe turn state changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TurnState> {
        self.state.subscribe()
    }

    /// Snapshot of the transcript in chronological order
    #[must_use]
    pub fn transcript(&self) -> Vec<Utterance> {
        self.lock().transcript.clone()
    }

    /// Voice applied to the next playback
    #[must_use]
    pub fn voice_profile(&self) -> VoiceProfile {
        self.lock().profile.clone()
    }

    /// Replace the voice profile; in-flight playback keeps its profile
    pub fn set_voice_profile(&self, profile: VoiceProfile) {
        self.lock().profile = profile;
    }

    /// Whether the host can offer voice controls
    #[must_use]
    pub fn voice_available(&self) -> bool {
        self.speech.is_available()
    }

    /// Gateway used by this session
    #[must_use]
    pub const fn gateway(&self) -> &ConversationGateway {
        &self.gateway
    }

    /// Run one full turn: listen, ask the gateway, speak the reply
    ///
    /// # Errors
    ///
    /// - `TurnBusy` if a turn is already running (transcript unchanged)
    /// - `Capture` if the recognizer failed for a reason other than silence
    /// - `TurnAbandoned` if the session was reset while this turn was in flight
    pub async fn request_turn(&self) -> Result<TurnOutcome> {
        let turn = self.begin(TurnState::Listening)?;

        let captured = tokio::time::timeout(self.capture_timeout, self.speech.capture())
            .await
            .unwrap_or(Err(CaptureError::Timeout));

        let text = match captured {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) | Err(CaptureError::NoSpeech) => {
                turn.ensure_current()?;
                tracing::debug!("no speech captured");
                return Ok(TurnOutcome::NoSpeech);
            }
            Err(e) => {
                turn.ensure_current()?;
                tracing::warn!(error = %e, "capture failed");
                return Err(e.into());
            }
        };

        let user = Utterance::user(text);
        let (history, mode, profile) = turn.record_user(user.clone())?;

        let reply_text = match &mode {
            ConversationMode::FreeChat => self.gateway.respond(&user.text, &history).await,
            ConversationMode::Scenario(script) => {
                self.gateway
                    .respond_in_scenario(script, &user.text, &history)
                    .await
            }
        };

        let reply = Utterance::agent(reply_text);
        turn.record_agent(reply.clone())?;

        let playback_error = self.play(&reply.text, &profile).await.err();
        turn.ensure_current()?;

        tracing::debug!(user = %user.text, reply = %reply.text, "turn completed");
        Ok(TurnOutcome::Completed {
            user,
            reply: SpokenUtterance {
                utterance: reply,
                playback_error,
            },
        })
    }

    /// Add an agent utterance without listening first and speak it
    ///
    /// Used for greetings and scripted prompts.
    ///
    /// # Errors
    ///
    /// Returns `TurnBusy` if a turn is running, `TurnAbandoned` on reset
    pub async fn announce(&self, text: impl Into<String>) -> Result<SpokenUtterance> {
        let turn = self.begin(TurnState::Speaking)?;
        let utterance = Utterance::agent(text);
        let profile = turn.record_agent(utterance.clone())?;

        let playback_error = self.play(&utterance.text, &profile).await.err();
        turn.ensure_current()?;

        Ok(SpokenUtterance {
            utterance,
            playback_error,
        })
    }

    /// Speak an existing agent utterance again
    ///
    /// # Errors
    ///
    /// - `InvalidState` unless the session is idle
    /// - `UtteranceNotFound` if `utterance_id` is not an agent utterance
    /// - `Playback` if playback fails
    pub async fn replay(&self, utterance_id: &str) -> Result<()> {
        let (turn, text, profile) = self.begin_replay(utterance_id)?;
        self.play(&text, &profile).await?;
        turn.ensure_current()
    }

    /// Speak an existing agent utterance translated into `native_language`
    ///
    /// # Errors
    ///
    /// Same as [`TurnSession::replay`]
    pub async fn replay_translated(&self, utterance_id: &str, native_language: &str) -> Result<()> {
        let (turn, text, profile) = self.begin_replay(utterance_id)?;

        let translated = self.gateway.translate(&text, native_language).await;
        turn.ensure_current()?;

        self.play(&translated, &profile.with_language(native_language))
            .await?;
        turn.ensure_current()
    }

    /// Clear the transcript and force the session back to idle
    pub fn reset(&self) {
        let mut inner = self.lock();
        self.reset_locked(&mut inner);
    }

    /// Reset and switch to another conversation mode
    ///
    /// The mode changes under the same lock as the reset, so no turn can
    /// start in between and run in the previous mode.
    pub fn enter_mode(&self, mode: ConversationMode) {
        let mut inner = self.lock();
        self.reset_locked(&mut inner);
        inner.mode = mode;
    }

    fn reset_locked(&self, inner: &mut Inner) {
        inner.transcript.clear();
        inner.epoch += 1;
        self.transition(TurnState::Idle);
        tracing::debug!(epoch = inner.epoch, "session reset");
    }

    async fn play(
        &self,
        text: &str,
        profile: &VoiceProfile,
    ) -> std::result::Result<(), PlaybackError> {
        tokio::time::timeout(self.playback_timeout, self.speech.speak(text, profile))
            .await
            .unwrap_or(Err(PlaybackError::Timeout))
            .inspect_err(|e| tracing::warn!(error = %e, "playback failed"))
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Leave `Idle` for `to`, failing if a turn is already running
    fn begin(&self, to: TurnState) -> Result<Turn<'_>> {
        let inner = self.lock();
        if !self.claim(to) {
            return Err(Error::TurnBusy);
        }
        tracing::debug!(state = %to, "turn started");
        Ok(Turn {
            session: self,
            epoch: inner.epoch,
        })
    }

    fn begin_replay(&self, utterance_id: &str) -> Result<(Turn<'_>, String, VoiceProfile)> {
        let inner = self.lock();

        let state = self.state();
        if state != TurnState::Idle {
            return Err(Error::InvalidState(format!("cannot replay while {state}")));
        }

        let text = inner
            .transcript
            .iter()
            .find(|u| u.id == utterance_id && u.speaker == Speaker::Agent)
            .map(|u| u.text.clone())
            .ok_or_else(|| Error::UtteranceNotFound(utterance_id.to_string()))?;

        if !self.claim(TurnState::Speaking) {
            return Err(Error::InvalidState("session became busy".to_string()));
        }

        let turn = Turn {
            session: self,
            epoch: inner.epoch,
        };
        Ok((turn, text, inner.profile.clone()))
    }

    /// Atomically move `Idle` to `to`
    fn claim(&self, to: TurnState) -> bool {
        let claimed = self.state.send_if_modified(|state| {
            if *state == TurnState::Idle {
                *state = to;
                true
            } else {
                false
            }
        });
        if claimed {
            tracing::debug!(from = %TurnState::Idle, %to, "turn state");
        }
        claimed
    }

    fn transition(&self, to: TurnState) {
        let from = self.state.send_replace(to);
        if from != to {
            tracing::debug!(%from, %to, "turn state");
        }
    }
}

/// An operation holding the session out of `Idle`
///
/// Dropping it returns the session to `Idle` unless a reset happened since
/// it began, so a cancelled turn never leaves the session stuck.
struct Turn<'a> {
    session: &'a TurnSession,
    epoch: u64,
}

impl Turn<'_> {
    fn current<'s>(&'s self) -> Result<MutexGuard<'s, Inner>> {
        let inner = self.session.lock();
        if inner.epoch == self.epoch {
            Ok(inner)
        } else {
            Err(Error::TurnAbandoned)
        }
    }

    fn ensure_current(&self) -> Result<()> {
        self.current().map(drop)
    }

    /// Append the user's utterance and move to `AwaitingReply`
    ///
    /// Returns the prior transcript, the mode and the voice for this turn.
    fn record_user(
        &self,
        utterance: Utterance,
    ) -> Result<(Vec<Utterance>, ConversationMode, VoiceProfile)> {
        let mut inner = self.current()?;
        let history = inner.transcript.clone();
        inner.transcript.push(utterance);
        self.session.transition(TurnState::AwaitingReply);
        Ok((history, inner.mode.clone(), inner.profile.clone()))
    }

    /// Append an agent utterance and move to `Speaking`
    fn record_agent(&self, utterance: Utterance) -> Result<VoiceProfile> {
        let mut inner = self.current()?;
        inner.transcript.push(utterance);
        self.session.transition(TurnState::Speaking);
        Ok(inner.profile.clone())
    }
}

impl Drop for Turn<'_> {
    fn drop(&mut self) {
        let inner = self.session.lock();
        if inner.epoch == self.epoch {
            self.session.transition(TurnState::Idle);
        }
    }
}
