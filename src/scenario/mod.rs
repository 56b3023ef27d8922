//! Roleplay scenario scripts
//!
//! Scripts are read-only reference data. The built-in catalog is embedded
//! at compile time and parsed once on first use.

mod progress;

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

pub use progress::{
    Advance, COMPLETION_BONUS, COMPLETION_MESSAGE, SCORE_PER_EXCHANGE, ScenarioProgress,
    ScenarioStatus, ScenarioTracker,
};

use crate::{Error, Result};

/// Embedded built-in scenarios
const CATALOG_JSON: &str = include_str!("catalog.json");

static CATALOG: OnceLock<Vec<ScenarioScript>> = OnceLock::new();

/// How hard a scenario is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// One agent line in a script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: String,
    pub agent_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_response: Option<String>,
    #[serde(default)]
    pub hints: Vec<String>,
}

/// Fixed ordered list of prompts for guided practice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioScript {
    pub id: String,
    pub title: String,
    pub description: String,
    pub emoji: String,
    pub difficulty: Difficulty,
    pub prompts: Vec<Prompt>,
}

impl ScenarioScript {
    /// Number of prompts in the script
    #[must_use]
    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}

/// Built-in scenarios, in display order
pub fn catalog() -> &'static [ScenarioScript] {
    CATALOG.get_or_init(|| {
        serde_json::from_str(CATALOG_JSON).unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to parse embedded scenario catalog");
            Vec::new()
        })
    })
}

/// Look up a built-in scenario by id
///
/// # Errors
///
/// Returns `ScenarioNotFound` if no scenario has this id
pub fn find(id: &str) -> Result<&'static ScenarioScript> {
    catalog()
        .iter()
        .find(|s| s.id == id)
        .ok_or_else(|| Error::ScenarioNotFound(id.to_string()))
}
