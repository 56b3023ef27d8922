//! TOML configuration file loading
//!
//! Supports `~/.config/speakgenie/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct GenieConfigFile {
    /// Mock API server
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Conversation backend
    #[serde(default)]
    pub gateway: GatewayFileConfig,

    /// Console speech host
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Turn timing
    #[serde(default)]
    pub session: SessionFileConfig,

    /// Where settings blobs live
    pub data_dir: Option<String>,
}

/// Server configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// API server port
    pub port: Option<u16>,

    /// Directory of static files served next to the API
    pub static_dir: Option<String>,
}

/// Conversation backend configuration
#[derive(Debug, Default, Deserialize)]
pub struct GatewayFileConfig {
    /// Base URL of the mock API (e.g. "http://localhost:3001/api")
    pub api_url: Option<String>,

    /// Seconds to wait for a reply before falling back
    pub reply_timeout_secs: Option<u64>,
}

/// Console speech configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Delay between printed words while "speaking"
    pub word_pace_ms: Option<u64>,
}

/// Turn timing configuration
#[derive(Debug, Default, Deserialize)]
pub struct SessionFileConfig {
    pub capture_timeout_secs: Option<u64>,
    pub playback_timeout_secs: Option<u64>,
}

/// Load the TOML config file from the standard path
///
/// Returns `GenieConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> GenieConfigFile {
    let Some(path) = config_file_path() else {
        return GenieConfigFile::default();
    };

    if !path.exists() {
        return GenieConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                GenieConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            GenieConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/speakgenie/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("speakgenie").join("config.toml"))
}
