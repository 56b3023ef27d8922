//! Interactive setup wizard (`genie setup`)

use std::path::Path;

use dialoguer::{Confirm, Input, Select};

use crate::config::file::{self, GenieConfigFile};
use crate::settings::{LANGUAGES, SettingsStore, User, VoiceSettings};
use crate::voice::{ConsoleSynthesizer, Synthesizer, VoiceProfile};

/// Run the interactive setup wizard
///
/// Edits both settings blobs and optionally the backend section of the
/// config file.
///
/// # Errors
///
/// Returns error if user input fails or settings cannot be written
pub fn run_setup(store: &SettingsStore) -> anyhow::Result<()> {
    println!("🧞 SpeakGenie Setup\n");

    let user = prompt_user(&store.load_user())?;
    let voice = prompt_voice(&store.load_voice_settings())?;

    store.save_user(&user)?;
    store.save_voice_settings(&voice)?;
    println!("\nSettings saved to {}", store.dir().display());

    let edit_backend = Confirm::new()
        .with_prompt("Configure the backend URL?")
        .default(false)
        .interact()?;

    if edit_backend {
        let Some(config_path) = file::config_file_path() else {
            anyhow::bail!("no config directory available on this system");
        };
        let mut existing = file::load_config_file();

        let api_url: String = Input::new()
            .with_prompt("Backend API URL")
            .default(
                existing
                    .gateway
                    .api_url
                    .clone()
                    .unwrap_or_else(|| crate::config::DEFAULT_API_URL.to_string()),
            )
            .interact_text()?;
        existing.gateway.api_url = Some(api_url);

        write_config(&config_path, &existing)?;
        println!("Config written to {}", config_path.display());
    }

    let name = if user.name.is_empty() { "friend" } else { &user.name };
    println!("\nAll set, {name}! Run `genie chat` to start talking.");

    Ok(())
}

fn prompt_user(existing: &User) -> anyhow::Result<User> {
    let name: String = Input::new()
        .with_prompt("What's your name?")
        .default(existing.name.clone())
        .allow_empty(true)
        .interact_text()?;

    let age: u8 = Input::new()
        .with_prompt("How old are you?")
        .default(existing.age)
        .validate_with(|age: &u8| {
            if (3..=18).contains(age) {
                Ok(())
            } else {
                Err("age must be between 3 and 18")
            }
        })
        .interact_text()?;

    // English is the target language, not a native-language choice
    let natives: Vec<_> = LANGUAGES.iter().filter(|(tag, _)| *tag != "en-US").collect();
    let native_idx = Select::new()
        .with_prompt("Your native language")
        .items(&natives.iter().map(|(_, name)| *name).collect::<Vec<_>>())
        .default(
            natives
                .iter()
                .position(|(tag, _)| *tag == existing.native_language)
                .unwrap_or(0),
        )
        .interact()?;

    Ok(User {
        name: name.trim().to_string(),
        age,
        native_language: natives[native_idx].0.to_string(),
    })
}

fn prompt_voice(existing: &VoiceSettings) -> anyhow::Result<VoiceSettings> {
    let language_idx = Select::new()
        .with_prompt("Genie speaks in")
        .items(&LANGUAGES.iter().map(|(_, name)| *name).collect::<Vec<_>>())
        .default(
            LANGUAGES
                .iter()
                .position(|(tag, _)| *tag == existing.language)
                .unwrap_or(0),
        )
        .interact()?;
    let language = LANGUAGES[language_idx].0.to_string();

    let voices = ConsoleSynthesizer::stdout().voices();
    let mut labels = vec!["(default for language)".to_string()];
    labels.extend(voices.iter().map(|v| format!("{} ({})", v.name, v.language)));

    let voice_idx = Select::new()
        .with_prompt("Voice")
        .items(&labels)
        .default(
            voices
                .iter()
                .position(|v| v.name == existing.voice)
                .map_or(0, |i| i + 1),
        )
        .interact()?;
    let voice = voice_idx
        .checked_sub(1)
        .and_then(|i| voices.get(i))
        .map(|v| v.name.clone())
        .unwrap_or_default();

    let rate: f32 = Input::new()
        .with_prompt(format!(
            "Speech rate ({}-{})",
            VoiceProfile::MIN_RATE,
            VoiceProfile::MAX_RATE
        ))
        .default(existing.rate)
        .validate_with(|rate: &f32| {
            if (VoiceProfile::MIN_RATE..=VoiceProfile::MAX_RATE).contains(rate) {
                Ok(())
            } else {
                Err("rate out of range")
            }
        })
        .interact_text()?;

    let pitch: f32 = Input::new()
        .with_prompt(format!(
            "Pitch ({}-{})",
            VoiceProfile::MIN_PITCH,
            VoiceProfile::MAX_PITCH
        ))
        .default(existing.pitch)
        .validate_with(|pitch: &f32| {
            if (VoiceProfile::MIN_PITCH..=VoiceProfile::MAX_PITCH).contains(pitch) {
                Ok(())
            } else {
                Err("pitch out of range")
            }
        })
        .interact_text()?;

    Ok(VoiceSettings {
        language,
        voice,
        rate,
        pitch,
    })
}

/// Serialize and write the config file
fn write_config(path: &Path, config: &GenieConfigFile) -> anyhow::Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, serialize_config(config))?;

    Ok(())
}

/// Serialize config to a readable TOML string
fn serialize_config(config: &GenieConfigFile) -> String {
    let mut out = String::new();

    if let Some(ref dir) = config.data_dir {
        out.push_str(&format!("data_dir = \"{dir}\"\n\n"));
    }

    // [server]
    let sv = &config.server;
    if sv.port.is_some() || sv.static_dir.is_some() {
        out.push_str("[server]\n");
        if let Some(port) = sv.port {
            out.push_str(&format!("port = {port}\n"));
        }
        if let Some(ref dir) = sv.static_dir {
            out.push_str(&format!("static_dir = \"{dir}\"\n"));
        }
        out.push('\n');
    }

    // [gateway]
    let gw = &config.gateway;
    if gw.api_url.is_some() || gw.reply_timeout_secs.is_some() {
        out.push_str("[gateway]\n");
        if let Some(ref url) = gw.api_url {
            out.push_str(&format!("api_url = \"{url}\"\n"));
        }
        if let Some(secs) = gw.reply_timeout_secs {
            out.push_str(&format!("reply_timeout_secs = {secs}\n"));
        }
        out.push('\n');
    }

    // [voice]
    if let Some(ms) = config.voice.word_pace_ms {
        out.push_str(&format!("[voice]\nword_pace_ms = {ms}\n\n"));
    }

    // [session]
    let ss = &config.session;
    if ss.capture_timeout_secs.is_some() || ss.playback_timeout_secs.is_some() {
        out.push_str("[session]\n");
        if let Some(secs) = ss.capture_timeout_secs {
            out.push_str(&format!("capture_timeout_secs = {secs}\n"));
        }
        if let Some(secs) = ss.playback_timeout_secs {
            out.push_str(&format!("playback_timeout_secs = {secs}\n"));
        }
        out.push('\n');
    }

    out
}
