//! SpeakGenie - spoken English practice for children
//!
//! This library provides the core functionality for SpeakGenie:
//! - Turn-taking voice sessions (listen, reply, speak)
//! - Scripted roleplay scenarios with scoring
//! - The mock tutoring backend and its HTTP API
//! - Persisted learner and voice settings
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                      Hosts                          │
//! │        genie CLI (console speech)  │  web client    │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │          TurnSession / RoleplaySession              │
//! │    SpeechIo  │  ConversationGateway  │  Tracker     │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                  Responders                         │
//! │   CannedResponder (in-process)  │  HttpResponder    │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod responder;
pub mod scenario;
pub mod session;
pub mod settings;
pub mod setup;
pub mod voice;

pub use config::Config;
pub use error::{CaptureError, Error, PlaybackError, Result};
pub use gateway::ConversationGateway;
pub use responder::{CannedResponder, HttpResponder, Responder};
pub use scenario::{ScenarioScript, ScenarioTracker};
pub use session::{RoleplaySession, TurnOutcome, TurnSession, TurnState, Utterance};
pub use settings::{SettingsStore, User, VoiceSettings};
pub use voice::{SpeechAdapter, SpeechIo, VoiceProfile};
