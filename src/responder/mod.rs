//! Conversational backends
//!
//! A [`Responder`] turns one request into one reply string. The gateway
//! owns fallback policy; responders just report errors.

mod canned;
mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use canned::CannedResponder;
pub use http::HttpResponder;

use crate::Result;
use crate::scenario::ScenarioScript;

/// One prior turn as sent over the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub text: String,
    pub is_user: bool,
}

/// Free-form chat request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// Scenario identity sent with roleplay requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
}

impl From<&ScenarioScript> for ScenarioRef {
    fn from(script: &ScenarioScript) -> Self {
        Self {
            id: script.id.clone(),
            title: script.title.clone(),
        }
    }
}

/// Roleplay request within a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleplayRequest {
    pub scenario: ScenarioRef,
    pub message: String,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// Translation request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    pub text: String,
    pub target_language: String,
}

/// Produces replies for the conversation gateway
#[async_trait]
pub trait Responder: Send + Sync {
    /// Reply to a free-form chat message
    ///
    /// # Errors
    ///
    /// Returns error if the backend is unreachable or rejects the request
    async fn chat(&self, request: &ChatRequest) -> Result<String>;

    /// Reply within a roleplay scenario
    ///
    /// # Errors
    ///
    /// Returns error if the backend is unreachable or rejects the request
    async fn roleplay(&self, request: &RoleplayRequest) -> Result<String>;

    /// Translate text into the target language
    ///
    /// # Errors
    ///
    /// Returns error if the backend is unreachable or rejects the request
    async fn translate(&self, request: &TranslateRequest) -> Result<String>;
}
