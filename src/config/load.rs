use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, then applies environment
/// variables (prefix `RIFF__`) on top, and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("RIFF")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if let Err(e) = reqwest::Url::parse(&self.server.base_url) {
            return Err(format!("server.base_url is not a valid URL: {e}"));
        }
        if !(0.0..=1.0).contains(&self.playback.volume) {
            return Err("playback.volume must be between 0 and 1".to_string());
        }
        if self.controls.volume_step <= 0.0 {
            return Err("controls.volume_step must be > 0".to_string());
        }
        Ok(())
    }

    /// Directory holding the local track caches and the log file.
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("riff")))
            .unwrap_or_else(|| PathBuf::from(".riff"))
    }

    /// Directory downloaded tracks are written into.
    pub fn downloads_dir(&self) -> PathBuf {
        self.storage
            .downloads_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| self.data_dir().join("downloads"))
    }

    pub fn log_file(&self) -> PathBuf {
        self.logging
            .file
            .clone()
            .unwrap_or_else(|| self.data_dir().join("riff.log"))
    }
}

/// Resolve the config path from `RIFF_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("RIFF_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/riff/config.toml`
/// or `~/.config/riff/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("riff").join("config.toml"))
}
