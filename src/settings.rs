//! Persisted learner settings
//!
//! Two JSON blobs under fixed keys, stored as `<key>.json` in the data
//! directory. Reads fall back to defaults on a missing or corrupt blob;
//! every save rewrites the whole blob.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::voice::VoiceProfile;

/// Storage key of the learner profile
pub const USER_KEY: &str = "speakgenie-user";

/// Storage key of the voice settings
pub const VOICE_SETTINGS_KEY: &str = "speakgenie-voice-settings";

/// Languages offered for speech and translation, as `(tag, name)`
pub const LANGUAGES: &[(&str, &str)] = &[
    ("en-US", "English (US)"),
    ("hi-IN", "Hindi"),
    ("mr-IN", "Marathi"),
    ("bn-IN", "Bengali"),
    ("gu-IN", "Gujarati"),
    ("ta-IN", "Tamil"),
    ("te-IN", "Telugu"),
    ("kn-IN", "Kannada"),
    ("ml-IN", "Malayalam"),
    ("pa-IN", "Punjabi"),
    ("or-IN", "Odia"),
];

/// Learner profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub name: String,
    pub age: u8,
    /// Language tag used for "listen in my language"
    pub native_language: String,
}

impl Default for User {
    fn default() -> Self {
        Self {
            name: String::new(),
            age: 10,
            native_language: "hi-IN".to_string(),
        }
    }
}

impl User {
    /// Whether translated replay makes sense for this learner
    #[must_use]
    pub fn wants_translation(&self) -> bool {
        let tag = self.native_language.to_ascii_lowercase();
        !tag.is_empty() && tag != "en" && !tag.starts_with("en-")
    }
}

/// Speech output preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoiceSettings {
    pub language: String,
    /// Preferred voice name, empty for the platform default
    pub voice: String,
    pub rate: f32,
    pub pitch: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            voice: String::new(),
            rate: 1.0,
            pitch: 1.0,
        }
    }
}

impl From<&VoiceSettings> for VoiceProfile {
    fn from(settings: &VoiceSettings) -> Self {
        Self::new(
            settings.language.clone(),
            settings.voice.clone(),
            settings.rate,
            settings.pitch,
        )
    }
}

/// File-backed key/value store for the settings blobs
#[derive(Debug, Clone)]
pub struct SettingsStore {
    dir: PathBuf,
}

impl SettingsStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stored learner profile, or the default
    #[must_use]
    pub fn load_user(&self) -> User {
        self.load(USER_KEY)
    }

    /// Overwrite the learner profile
    ///
    /// # Errors
    ///
    /// Returns error if the blob cannot be written
    pub fn save_user(&self, user: &User) -> Result<()> {
        self.save(USER_KEY, user)
    }

    /// Stored voice settings, or the default
    #[must_use]
    pub fn load_voice_settings(&self) -> VoiceSettings {
        self.load(VOICE_SETTINGS_KEY)
    }

    /// Overwrite the voice settings
    ///
    /// # Errors
    ///
    /// Returns error if the blob cannot be written
    pub fn save_voice_settings(&self, settings: &VoiceSettings) -> Result<()> {
        self.save(VOICE_SETTINGS_KEY, settings)
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn load<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let path = self.path(key);

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return T::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read settings");
                return T::default();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "corrupt settings, using defaults"
            );
            T::default()
        })
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path(key);
        let content = serde_json::to_string_pretty(value)?;
        std::fs::write(&path, content)?;
        tracing::debug!(path = %path.display(), "settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_blobs_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());

        assert_eq!(store.load_user(), User::default());
        assert_eq!(store.load_voice_settings(), VoiceSettings::default());
        assert_eq!(store.load_user().native_language, "hi-IN");
    }

    #[test]
    fn saved_settings_are_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("nested"));

        let user = User {
            name: "Asha".to_string(),
            age: 8,
            native_language: "mr-IN".to_string(),
        };
        let voice = VoiceSettings {
            language: "en-GB".to_string(),
            voice: "Genie (UK)".to_string(),
            rate: 0.8,
            pitch: 1.2,
        };
        store.save_user(&user).unwrap();
        store.save_voice_settings(&voice).unwrap();

        assert_eq!(store.load_user(), user);
        assert_eq!(store.load_voice_settings(), voice);
    }

    #[test]
    fn corrupt_blob_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("speakgenie-user.json"), "{not json").unwrap();

        let store = SettingsStore::new(dir.path());
        assert_eq!(store.load_user(), User::default());
    }

    #[test]
    fn blobs_use_camel_case_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        store.save_user(&User::default()).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("speakgenie-user.json")).unwrap();
        assert!(raw.contains("\"nativeLanguage\""));
    }

    #[test]
    fn partial_blob_fills_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("speakgenie-voice-settings.json"),
            r#"{"rate": 1.5}"#,
        )
        .unwrap();

        let settings = SettingsStore::new(dir.path()).load_voice_settings();
        assert!((settings.rate - 1.5).abs() < f32::EPSILON);
        assert_eq!(settings.language, "en-US");
    }

    #[test]
    fn english_speakers_skip_translation() {
        let mut user = User::default();
        assert!(user.wants_translation());
        user.native_language = "en".to_string();
        assert!(!user.wants_translation());
        user.native_language = "en-GB".to_string();
        assert!(!user.wants_translation());
    }

    #[test]
    fn voice_settings_become_clamped_profile() {
        let settings = VoiceSettings {
            rate: 9.0,
            ..VoiceSettings::default()
        };
        let profile = VoiceProfile::from(&settings);
        assert!((profile.rate() - 2.0).abs() < f32::EPSILON);
        assert_eq!(profile.language_tag(), "en-US");
    }
}
