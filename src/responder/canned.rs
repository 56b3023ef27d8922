//! In-process responder backed by static reply tables

use std::sync::Mutex;

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::{ChatRequest, Responder, RoleplayRequest, TranslateRequest};
use crate::Result;

const NOUN_EXPLANATION: &str = "A noun is a word that names a person, place, or thing! For example: 'cat', 'school', or 'happiness'. Can you think of a noun? 🤔";

const VERB_EXPLANATION: &str = "A verb is an action word! It tells us what someone or something does. Like 'run', 'jump', or 'sing'. What's your favorite action to do? 🏃‍♂️";

const GREETING_REPLY: &str = "Hello there! It's wonderful to meet you! I'm so excited to help you learn English today! What would you like to explore? 👋✨";

const ENCOURAGEMENTS: [&str; 5] = [
    "That's a great question! Let me help you understand that better. 😊",
    "Wonderful! You're doing so well with your English practice! 🌟",
    "I love how curious you are! Learning English is exciting, isn't it? 🎉",
    "That's perfect! Keep practicing and you'll become even better! 💪",
    "Amazing work! Your English is improving every day! 🚀",
];

const SCHOOL_REPLIES: [&str; 3] = [
    "That's wonderful! What's your favorite subject in school? 📚",
    "Great! Do you have many friends at school? 👫",
    "Excellent! Learning is so much fun, isn't it? 🎓",
];

const STORE_REPLIES: [&str; 3] = [
    "Perfect! That costs 10 rupees. Do you have the money? 💰",
    "Great choice! Would you like anything else? 🛒",
    "Wonderful! Here's your item. Have a great day! 😊",
];

const HOME_REPLIES: [&str; 3] = [
    "That sounds lovely! What's your favorite thing to do with your family? 👨‍👩‍👧‍👦",
    "Wonderful! Helping at home is very important! 🏠",
    "Great! Family time is the best time, isn't it? ❤️",
];

const RESTAURANT_REPLIES: [&str; 3] = [
    "Excellent choice! That will be ready in 10 minutes. 🍽️",
    "Perfect! Would you like anything else to drink? 🥤",
    "Great! Your food is coming right up! 😋",
];

/// Replies for a scenario id; unknown scenarios use the school table
fn scenario_replies(scenario_id: &str) -> &'static [&'static str] {
    match scenario_id {
        "store" => &STORE_REPLIES,
        "home" => &HOME_REPLIES,
        "restaurant" => &RESTAURANT_REPLIES,
        _ => &SCHOOL_REPLIES,
    }
}

/// Look up a phrase in the translation table
fn lookup_translation(target_language: &str, text: &str) -> Option<&'static str> {
    let translated = match (target_language, text) {
        ("hi-IN", "Hello") => "नमस्ते",
        ("hi-IN", "Thank you") => "धन्यवाद",
        ("hi-IN", "Good morning") => "सुप्रभात",
        ("hi-IN", "How are you?") => "आप कैसे हैं?",
        ("mr-IN", "Hello") => "नमस्कार",
        ("mr-IN", "Thank you") => "धन्यवाद",
        ("mr-IN", "Good morning") => "सुप्रभात",
        ("mr-IN", "How are you?") => "तुम्ही कसे आहात?",
        _ => return None,
    };
    Some(translated)
}

/// Whether the message greets the tutor
fn is_greeting(lower: &str) -> bool {
    lower.contains("hello") || lower.contains("hi")
}

/// Responder serving the canned mock tables
///
/// Keyword matches are deterministic; everything else is a random pick
/// from the matching table.
pub struct CannedResponder {
    rng: Mutex<StdRng>,
}

impl CannedResponder {
    /// Responder seeded from OS entropy
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Responder with reproducible random picks
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn pick(&self, table: &'static [&'static str]) -> &'static str {
        let choice = self
            .rng
            .lock()
            .ok()
            .and_then(|mut rng| table.choose(&mut *rng).copied());
        choice.unwrap_or(table[0])
    }

    /// Reply to a free-form chat message
    #[must_use]
    pub fn chat_reply(&self, message: &str) -> &'static str {
        let lower = message.to_lowercase();

        if lower.contains("noun") {
            NOUN_EXPLANATION
        } else if lower.contains("verb") {
            VERB_EXPLANATION
        } else if is_greeting(&lower) {
            GREETING_REPLY
        } else {
            self.pick(&ENCOURAGEMENTS)
        }
    }

    /// Reply within a roleplay scenario
    #[must_use]
    pub fn roleplay_reply(&self, scenario_id: &str) -> &'static str {
        self.pick(scenario_replies(scenario_id))
    }
}

impl Default for CannedResponder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Responder for CannedResponder {
    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        Ok(self.chat_reply(&request.message).to_string())
    }

    async fn roleplay(&self, request: &RoleplayRequest) -> Result<String> {
        Ok(self.roleplay_reply(&request.scenario.id).to_string())
    }

    async fn translate(&self, request: &TranslateRequest) -> Result<String> {
        Ok(lookup_translation(&request.target_language, &request.text)
            .map_or_else(|| request.text.clone(), str::to_string))
    }
}
