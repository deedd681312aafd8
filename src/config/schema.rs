use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/riff/config.toml` or `~/.config/riff/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `RIFF__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub playback: PlaybackSettings,
    pub audio: AudioSettings,
    pub controls: ControlsSettings,
    pub ui: UiSettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Base URL of the music backend, without a trailing path.
    pub base_url: String,
    /// Per-request timeout in seconds. Downloads in `download` mode can be slow.
    pub timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// How the backend should prepare audio: stream directly or download first.
    pub mode: PlayMode,
    /// Initial volume in `[0, 1]`.
    pub volume: f32,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            mode: PlayMode::Stream,
            volume: 1.0,
        }
    }
}

/// Source preparation mode sent with every `/play-audio` request.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayMode {
    #[default]
    #[serde(alias = "streaming")]
    Stream,
    #[serde(alias = "dl")]
    Download,
}

impl PlayMode {
    /// Wire name used by the backend.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stream => "stream",
            Self::Download => "download",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Stream => Self::Download,
            Self::Download => Self::Stream,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            quit_fade_out_ms: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
    /// Volume change per `+` / `-` press.
    pub volume_step: f32,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            scrub_seconds: 5,
            volume_step: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered next to the greeting in the header box.
    pub header_text: String,
    /// How long a notification stays visible (milliseconds).
    pub notification_ms: u64,
    /// How many recent tracks the home view shows.
    pub home_recent_count: usize,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: "Discover and stream your favorite music".to_string(),
            notification_ms: 4000,
            home_recent_count: 6,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Where the recent/liked caches and the log live.
    /// Defaults to `$XDG_DATA_HOME/riff`.
    pub data_dir: Option<PathBuf>,
    /// Where downloaded tracks are written. Defaults to the user's download directory.
    pub downloads_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `env_logger` filter used when `RUST_LOG` is not set.
    pub level: String,
    /// Log file path. Defaults to `<data_dir>/riff.log`.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
