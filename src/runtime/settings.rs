use crate::config;

/// Load settings, falling back to defaults on any problem. Config is
/// optional, so failures never stop the app from starting.
///
/// Runs before logging is set up (logging is configured from these
/// settings), so the problem is handed back for the caller to log.
pub fn load_settings() -> (config::Settings, Option<String>) {
    match config::Settings::load() {
        Ok(s) => match s.validate() {
            Ok(()) => (s, None),
            Err(msg) => (
                config::Settings::default(),
                Some(format!("invalid config, using defaults: {msg}")),
            ),
        },
        Err(e) => (
            config::Settings::default(),
            Some(format!("failed to load config, using defaults: {e}")),
        ),
    }
}
