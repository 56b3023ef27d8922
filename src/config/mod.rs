//! Configuration management for SpeakGenie
//!
//! Values resolve env > TOML file > default.

pub mod file;

use std::path::PathBuf;
use std::time::Duration;

use crate::gateway::DEFAULT_REPLY_TIMEOUT;
use crate::session::{DEFAULT_CAPTURE_TIMEOUT, DEFAULT_PLAYBACK_TIMEOUT};

use self::file::GenieConfigFile;

/// Default API server port
pub const DEFAULT_PORT: u16 = 3001;

/// Default base URL of the mock API
pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";

/// Default delay between words printed by the console synthesizer
pub const DEFAULT_WORD_PACE: Duration = Duration::from_millis(120);

/// SpeakGenie configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the settings blobs
    pub data_dir: PathBuf,

    /// HTTP API server configuration
    pub api_server: ApiServerConfig,

    /// Conversation backend configuration
    pub gateway: GatewayConfig,

    /// Turn timing
    pub session: SessionConfig,

    /// Console speech configuration
    pub voice: VoiceConfig,
}

/// HTTP API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Path to static files directory (web client build)
    pub static_dir: Option<PathBuf>,
}

/// Conversation backend configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL the HTTP responder posts to
    pub api_url: String,

    /// Bound on each backend call
    pub reply_timeout: Duration,
}

/// Turn timing configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub capture_timeout: Duration,
    pub playback_timeout: Duration,
}

/// Console speech configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Delay between printed words
    pub word_pace: Duration,
}

impl Config {
    /// Load configuration from the environment and the config file
    #[must_use]
    pub fn load() -> Self {
        let fc = file::load_config_file();
        let config = Self::resolve(&fc, |key| std::env::var(key).ok());

        // Ensure data dir exists
        if let Err(e) = std::fs::create_dir_all(&config.data_dir) {
            tracing::warn!(
                path = %config.data_dir.display(),
                error = %e,
                "failed to create data directory"
            );
        }

        config
    }

    /// Merge `env` over the parsed file over defaults
    pub fn resolve(fc: &GenieConfigFile, env: impl Fn(&str) -> Option<String>) -> Self {
        let secs = |key: &str, file: Option<u64>, default: Duration| {
            env(key)
                .and_then(|s| s.parse::<u64>().ok())
                .or(file)
                .filter(|secs| *secs > 0)
                .map_or(default, Duration::from_secs)
        };

        // API server config (env > toml > default)
        let api_server = ApiServerConfig {
            port: env("GENIE_PORT")
                .or_else(|| env("PORT"))
                .and_then(|s| s.parse().ok())
                .or(fc.server.port)
                .unwrap_or(DEFAULT_PORT),
            static_dir: env("GENIE_STATIC_DIR")
                .or_else(|| fc.server.static_dir.clone())
                .map(PathBuf::from),
        };

        let gateway = GatewayConfig {
            api_url: env("GENIE_API_URL")
                .or_else(|| fc.gateway.api_url.clone())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            reply_timeout: secs(
                "GENIE_REPLY_TIMEOUT_SECS",
                fc.gateway.reply_timeout_secs,
                DEFAULT_REPLY_TIMEOUT,
            ),
        };

        let session = SessionConfig {
            capture_timeout: secs(
                "GENIE_CAPTURE_TIMEOUT_SECS",
                fc.session.capture_timeout_secs,
                DEFAULT_CAPTURE_TIMEOUT,
            ),
            playback_timeout: secs(
                "GENIE_PLAYBACK_TIMEOUT_SECS",
                fc.session.playback_timeout_secs,
                DEFAULT_PLAYBACK_TIMEOUT,
            ),
        };

        let voice = VoiceConfig {
            word_pace: env("GENIE_WORD_PACE_MS")
                .and_then(|s| s.parse().ok())
                .or(fc.voice.word_pace_ms)
                .map_or(DEFAULT_WORD_PACE, Duration::from_millis),
        };

        // Data directory (~/.local/share/speakgenie on Linux)
        let data_dir = env("GENIE_DATA_DIR")
            .or_else(|| fc.data_dir.clone())
            .map_or_else(default_data_dir, PathBuf::from);

        Self {
            data_dir,
            api_server,
            gateway,
            session,
            voice,
        }
    }
}

fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".speakgenie"),
        |d| d.data_dir().join("speakgenie"),
    )
}
