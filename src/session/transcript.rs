//! Session transcript entries

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::responder::HistoryEntry;

/// Who produced an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Agent,
}

/// One spoken or transcribed unit of dialogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Utterance {
    pub id: String,
    pub text: String,
    pub speaker: Speaker,
    pub created_at: DateTime<Utc>,
}

impl Utterance {
    #[must_use]
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            speaker,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Speaker::User, text)
    }

    #[must_use]
    pub fn agent(text: impl Into<String>) -> Self {
        Self::new(Speaker::Agent, text)
    }

    #[must_use]
    pub fn is_user(&self) -> bool {
        self.speaker == Speaker::User
    }
}

impl From<&Utterance> for HistoryEntry {
    fn from(utterance: &Utterance) -> Self {
        Self {
            text: utterance.text.clone(),
            is_user: utterance.is_user(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = Utterance::user("hi");
        let b = Utterance::user("hi");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn history_entry_marks_speaker() {
        let entry = HistoryEntry::from(&Utterance::agent("Hello!"));
        assert!(!entry.is_user);
        assert_eq!(entry.text, "Hello!");
    }
}
