//! Voice profile and voice selection

use serde::{Deserialize, Serialize};

/// Voice installed on the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    /// BCP 47 language tag (e.g. "en-US")
    pub language: String,
}

impl Voice {
    #[must_use]
    pub fn new(name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
        }
    }
}

/// Validated voice settings applied to a single `speak` call
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceProfile {
    language_tag: String,
    voice_name: String,
    rate: f32,
    pitch: f32,
}

impl VoiceProfile {
    pub const MIN_RATE: f32 = 0.5;
    pub const MAX_RATE: f32 = 2.0;
    pub const MIN_PITCH: f32 = 0.0;
    pub const MAX_PITCH: f32 = 2.0;

    /// Build a profile, clamping rate and pitch into their valid ranges
    ///
    /// Non-finite values fall back to the neutral 1.0.
    #[must_use]
    pub fn new(
        language_tag: impl Into<String>,
        voice_name: impl Into<String>,
        rate: f32,
        pitch: f32,
    ) -> Self {
        Self {
            language_tag: language_tag.into(),
            voice_name: voice_name.into(),
            rate: clamp_or_neutral(rate, Self::MIN_RATE, Self::MAX_RATE),
            pitch: clamp_or_neutral(pitch, Self::MIN_PITCH, Self::MAX_PITCH),
        }
    }

    #[must_use]
    pub fn language_tag(&self) -> &str {
        &self.language_tag
    }

    #[must_use]
    pub fn voice_name(&self) -> &str {
        &self.voice_name
    }

    #[must_use]
    pub const fn rate(&self) -> f32 {
        self.rate
    }

    #[must_use]
    pub const fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Same profile speaking another language with its default voice
    #[must_use]
    pub fn with_language(&self, language_tag: impl Into<String>) -> Self {
        Self {
            language_tag: language_tag.into(),
            voice_name: String::new(),
            rate: self.rate,
            pitch: self.pitch,
        }
    }
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self::new("en-US", "", 1.0, 1.0)
    }
}

fn clamp_or_neutral(value: f32, min: f32, max: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        1.0
    }
}

/// Pick the voice for `profile` from the host's `voices`
///
/// Exact name match wins, then the first voice whose language starts with
/// the profile's language tag. `None` means the platform default voice.
#[must_use]
pub fn select_voice<'a>(voices: &'a [Voice], profile: &VoiceProfile) -> Option<&'a Voice> {
    let by_name = (!profile.voice_name.is_empty())
        .then(|| voices.iter().find(|v| v.name == profile.voice_name))
        .flatten();

    by_name.or_else(|| {
        let tag = profile.language_tag.to_ascii_lowercase();
        if tag.is_empty() {
            return None;
        }
        voices
            .iter()
            .find(|v| v.language.to_ascii_lowercase().starts_with(&tag))
    })
}
