//! Conversation gateway
//!
//! Sends an utterance plus a bounded history window to a [`Responder`] and
//! always returns a reply string: failures are absorbed into fixed fallback
//! text so the conversation never dead-ends.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::responder::{
    ChatRequest, HistoryEntry, Responder, RoleplayRequest, ScenarioRef, TranslateRequest,
};
use crate::scenario::ScenarioScript;
use crate::session::Utterance;

/// Prior turns sent with free-chat requests
pub const CHAT_HISTORY_WINDOW: usize = 10;

/// Prior turns sent with roleplay requests
pub const SCENARIO_HISTORY_WINDOW: usize = 5;

/// Reply used when the free-chat responder fails
pub const CHAT_FALLBACK: &str =
    "I'm sorry, I'm having trouble understanding right now. Can you try again?";

/// Reply used when the roleplay responder fails
pub const SCENARIO_FALLBACK: &str = "Let's try that again! What would you like to say?";

/// Default bound on a single responder call
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(15);

/// Stateless front door to the conversational backend
#[derive(Clone)]
pub struct ConversationGateway {
    responder: Arc<dyn Responder>,
    reply_timeout: Duration,
}

impl ConversationGateway {
    #[must_use]
    pub fn new(responder: Arc<dyn Responder>) -> Self {
        Self {
            responder,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
        }
    }

    /// Bound every responder call by `timeout`
    #[must_use]
    pub const fn reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    /// Free-chat reply to `utterance`
    pub async fn respond(&self, utterance: &str, history: &[Utterance]) -> String {
        let request = ChatRequest {
            message: utterance.to_string(),
            history: window(history, CHAT_HISTORY_WINDOW),
        };

        self.bounded("chat", self.responder.chat(&request))
            .await
            .unwrap_or_else(|| CHAT_FALLBACK.to_string())
    }

    /// Reply to `utterance` inside a roleplay scenario
    pub async fn respond_in_scenario(
        &self,
        scenario: &ScenarioScript,
        utterance: &str,
        history: &[Utterance],
    ) -> String {
        let request = RoleplayRequest {
            scenario: ScenarioRef::from(scenario),
            message: utterance.to_string(),
            history: window(history, SCENARIO_HISTORY_WINDOW),
        };

        self.bounded("roleplay", self.responder.roleplay(&request))
            .await
            .unwrap_or_else(|| SCENARIO_FALLBACK.to_string())
    }

    /// Best-effort translation; returns `text` unchanged on any failure
    pub async fn translate(&self, text: &str, target_language: &str) -> String {
        let request = TranslateRequest {
            text: text.to_string(),
            target_language: target_language.to_string(),
        };

        self.bounded("translate", self.responder.translate(&request))
            .await
            .unwrap_or_else(|| text.to_string())
    }

    /// Run a responder call under the reply timeout, logging failures
    async fn bounded<F>(&self, operation: &'static str, call: F) -> Option<String>
    where
        F: Future<Output = crate::Result<String>>,
    {
        match tokio::time::timeout(self.reply_timeout, call).await {
            Ok(Ok(reply)) => Some(reply),
            Ok(Err(e)) => {
                tracing::warn!(operation, error = %e, "responder failed, using fallback");
                None
            }
            Err(_) => {
                tracing::warn!(
                    operation,
                    timeout_ms = self.reply_timeout.as_millis(),
                    "responder timed out, using fallback"
                );
                None
            }
        }
    }
}

/// Trailing `size` entries of `history` in wire form
fn window(history: &[Utterance], size: usize) -> Vec<HistoryEntry> {
    let start = history.len().saturating_sub(size);
    history[start..].iter().map(HistoryEntry::from).collect()
}
