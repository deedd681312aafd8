//! Audio-related small types.
//!
//! Commands understood by the audio thread, the decoded-source container and
//! the error type for the audio subsystem.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug)]
pub enum AudioCmd {
    /// Replace the current source with the audio at the given URL.
    Load(String),
    /// Start or resume playback. Deferred until a pending load finishes.
    Play,
    /// Pause playback.
    Pause,
    /// Jump to an absolute position in the current source.
    Seek(Duration),
    /// Set the output volume (`0.0..=1.0`).
    SetVolume(f32),
    /// Stop playback and drop the current source.
    Clear,
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
    /// Sent by a loader thread once the bytes for load `generation` are in.
    Loaded {
        generation: u64,
        result: Result<LoadedSource, String>,
    },
}

/// Fully downloaded audio, ready to be decoded as often as seeking needs.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub data: Arc<[u8]>,
    pub duration: Option<Duration>,
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device: {0}")]
    NoOutputDevice(String),
    #[error("failed to fetch audio: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("failed to read audio: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to decode audio: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),
    #[error("audio thread exited during startup")]
    ThreadGone,
}
