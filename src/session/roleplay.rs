//! Guided roleplay on top of a turn session

use std::sync::Arc;

use super::{ConversationMode, SpokenUtterance, TurnOutcome, TurnSession};
use crate::scenario::{Advance, ScenarioProgress, ScenarioScript, ScenarioTracker};
use crate::{Error, Result};

/// One learner exchange in a scenario
#[derive(Debug, Clone)]
pub struct RoleplayTurn {
    pub outcome: TurnOutcome,
    /// Next prompt or the completion message, when the script moved on
    pub next: Option<SpokenUtterance>,
    pub progress: ScenarioProgress,
}

/// Drives a [`TurnSession`] through a scenario script
///
/// Each completed exchange awards points and announces the next prompt.
/// Turns with no speech leave the script where it was.
pub struct RoleplaySession {
    session: TurnSession,
    tracker: ScenarioTracker,
}

impl RoleplaySession {
    /// Put `session` into scenario mode for `script`
    ///
    /// The session is reset; call [`RoleplaySession::start`] to speak the
    /// opening prompt.
    #[must_use]
    pub fn new(session: TurnSession, script: ScenarioScript) -> Self {
        session.enter_mode(ConversationMode::Scenario(Arc::new(script.clone())));
        let (tracker, _) = ScenarioTracker::start(script);
        Self { session, tracker }
    }

    /// Restart the script from its first prompt and announce it
    ///
    /// Returns `None` for a script with no prompts.
    ///
    /// # Errors
    ///
    /// Returns `TurnBusy` if the session is not idle
    pub async fn start(&mut self) -> Result<Option<SpokenUtterance>> {
        let script = self.tracker.script().clone();
        self.session
            .enter_mode(ConversationMode::Scenario(Arc::new(script.clone())));

        let (tracker, first) = ScenarioTracker::start(script);
        self.tracker = tracker;

        match first {
            Some(prompt) => Ok(Some(self.session.announce(prompt.agent_message).await?)),
            None => Ok(None),
        }
    }

    /// Listen for the learner's answer, reply, then move the script on
    ///
    /// # Errors
    ///
    /// - `InvalidState` once the script is completed
    /// - any error from [`TurnSession::request_turn`]
    pub async fn take_turn(&mut self) -> Result<RoleplayTurn> {
        if self.tracker.is_completed() {
            return Err(Error::InvalidState("scenario already completed".to_string()));
        }

        let outcome = self.session.request_turn().await?;

        let next = match &outcome {
            TurnOutcome::NoSpeech => None,
            TurnOutcome::Completed { .. } => {
                let advance = self.tracker.advance();
                self.announce_next(advance).await
            }
        };

        Ok(RoleplayTurn {
            outcome,
            next,
            progress: self.tracker.progress().clone(),
        })
    }

    /// Speak what the tracker moved on to
    ///
    /// The score is already updated at this point, so a failed announcement
    /// yields `None` and the exchange is still reported.
    async fn announce_next(&self, advance: Advance) -> Option<SpokenUtterance> {
        let text = match advance {
            Advance::Next(prompt) => prompt.agent_message,
            Advance::Completed(message) => message.to_string(),
            Advance::AlreadyCompleted => return None,
        };

        match self.session.announce(text).await {
            Ok(spoken) => Some(spoken),
            Err(e) => {
                tracing::warn!(error = %e, "could not announce next prompt");
                None
            }
        }
    }

    #[must_use]
    pub const fn progress(&self) -> &ScenarioProgress {
        self.tracker.progress()
    }

    /// Hints for the prompt the learner is answering
    #[must_use]
    pub fn hints(&self) -> &[String] {
        self.tracker.hints()
    }

    #[must_use]
    pub const fn script(&self) -> &ScenarioScript {
        self.tracker.script()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.tracker.is_completed()
    }

    /// Underlying session, for state subscription and replay
    #[must_use]
    pub const fn session(&self) -> &TurnSession {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::{CaptureError, PlaybackError};
    use crate::gateway::ConversationGateway;
    use crate::responder::CannedResponder;
    use crate::session::TurnState;
    use crate::voice::{SpeechIo, VoiceProfile};

    struct Quiet;

    #[async_trait]
    impl SpeechIo for Quiet {
        async fn capture(&self) -> std::result::Result<String, CaptureError> {
            Err(CaptureError::NoSpeech)
        }

        async fn speak(
            &self,
            _text: &str,
            _profile: &VoiceProfile,
        ) -> std::result::Result<(), PlaybackError> {
            Ok(())
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    fn roleplay() -> RoleplaySession {
        let gateway = ConversationGateway::new(Arc::new(CannedResponder::seeded(3)));
        let session = TurnSession::new(Arc::new(Quiet), gateway);
        let script = crate::scenario::find("home").unwrap().clone();
        RoleplaySession::new(session, script)
    }

    #[tokio::test]
    async fn blocked_announcement_keeps_progress() {
        let mut roleplay = roleplay();
        roleplay.start().await.unwrap();

        let advance = roleplay.tracker.advance();
        let busy = roleplay.session.begin(TurnState::Speaking).unwrap();

        assert!(roleplay.announce_next(advance).await.is_none());
        drop(busy);

        assert_eq!(roleplay.progress().score, 10);
        assert_eq!(roleplay.session().transcript().len(), 1);
        assert_eq!(roleplay.session().state(), TurnState::Idle);
    }

    #[tokio::test]
    async fn announces_next_prompt() {
        let mut roleplay = roleplay();
        roleplay.start().await.unwrap();

        let advance = roleplay.tracker.advance();
        let expected = roleplay.tracker.current_prompt().unwrap().agent_message.clone();

        let spoken = roleplay.announce_next(advance).await.unwrap();
        assert_eq!(spoken.utterance.text, expected);
        assert_eq!(roleplay.session().transcript().len(), 2);
    }
}
