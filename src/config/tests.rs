use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Mutex;

/// Serialises tests that touch process environment variables.
static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Run `f` with `vars` applied (`None` unsets), restoring the previous values
/// afterwards.
fn with_env<R>(vars: &[(&str, Option<&str>)], f: impl FnOnce() -> R) -> R {
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let saved: Vec<(String, Option<OsString>)> = vars
        .iter()
        .map(|(k, _)| (k.to_string(), env::var_os(k)))
        .collect();

    for (key, value) in vars {
        // SAFETY: every env-mutating test holds ENV_LOCK.
        unsafe {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }

    let out = f();

    for (key, old) in saved {
        unsafe {
            match old {
                Some(v) => env::set_var(&key, v),
                None => env::remove_var(&key),
            }
        }
    }
    out
}

#[test]
fn explicit_config_path_env_wins() {
    let path = with_env(&[("RIFF_CONFIG_PATH", Some("/tmp/riff-explicit.toml"))], || {
        resolve_config_path().unwrap()
    });
    assert_eq!(path, PathBuf::from("/tmp/riff-explicit.toml"));
}

#[test]
fn default_path_uses_xdg_config_home_before_home() {
    let path = with_env(
        &[
            ("XDG_CONFIG_HOME", Some("/tmp/xdg")),
            ("HOME", Some("/tmp/ignored-home")),
        ],
        || default_config_path().unwrap(),
    );
    assert_eq!(path, PathBuf::from("/tmp/xdg/riff/config.toml"));
}

#[test]
fn default_path_without_xdg_lands_under_dot_config() {
    let path = with_env(
        &[("XDG_CONFIG_HOME", None), ("HOME", Some("/tmp/someone"))],
        || default_config_path().unwrap(),
    );
    assert_eq!(path, PathBuf::from("/tmp/someone/.config/riff/config.toml"));
}

const FULL_CONFIG: &str = r#"
[server]
base_url = "http://music.local:8080"
timeout_secs = 10

[playback]
mode = "download"
volume = 0.4

[audio]
quit_fade_out_ms = 0

[controls]
scrub_seconds = 9
volume_step = 0.1

[ui]
header_text = "hello"
notification_ms = 1500
home_recent_count = 3

[storage]
data_dir = "/tmp/riff-data"

[logging]
level = "debug"
"#;

#[test]
fn every_section_is_read_from_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    std::fs::write(&file, FULL_CONFIG).unwrap();

    let s = with_env(
        &[
            ("RIFF_CONFIG_PATH", file.to_str()),
            ("RIFF__SERVER__BASE_URL", None),
        ],
        || Settings::load().unwrap(),
    );

    assert_eq!(s.server.base_url, "http://music.local:8080");
    assert_eq!(s.server.timeout_secs, 10);
    assert_eq!(s.playback.mode, PlayMode::Download);
    assert!((s.playback.volume - 0.4).abs() < f32::EPSILON);
    assert_eq!(s.audio.quit_fade_out_ms, 0);
    assert_eq!(s.controls.scrub_seconds, 9);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.ui.notification_ms, 1500);
    assert_eq!(s.ui.home_recent_count, 3);
    assert_eq!(s.logging.level, "debug");
    assert_eq!(s.data_dir(), PathBuf::from("/tmp/riff-data"));
    assert_eq!(s.log_file(), PathBuf::from("/tmp/riff-data/riff.log"));
    assert!(s.validate().is_ok());
}

#[test]
fn double_underscore_env_beats_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    std::fs::write(&file, "[server]\nbase_url = \"http://from-file:5000\"\n").unwrap();

    let s = with_env(
        &[
            ("RIFF_CONFIG_PATH", file.to_str()),
            ("RIFF__SERVER__BASE_URL", Some("http://from-env:5000")),
        ],
        || Settings::load().unwrap(),
    );
    assert_eq!(s.server.base_url, "http://from-env:5000");
}

#[test]
fn validate_rejects_bad_values() {
    let mut s = Settings::default();
    assert!(s.validate().is_ok());

    s.server.base_url = "not a url".to_string();
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.playback.volume = 1.5;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.controls.volume_step = 0.0;
    assert!(s.validate().is_err());
}

#[test]
fn play_mode_toggles_and_has_wire_names() {
    assert_eq!(PlayMode::Stream.as_str(), "stream");
    assert_eq!(PlayMode::Download.as_str(), "download");
    assert_eq!(PlayMode::Stream.toggled(), PlayMode::Download);
    assert_eq!(PlayMode::Download.toggled(), PlayMode::Stream);
}
