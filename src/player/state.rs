use crate::api::SourceKind;
use crate::library::Track;

/// Everything the player shows about the current track.
///
/// Owned by `PlaybackController`; `current_time` and `duration` are seconds
/// and only meaningful while a track is loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub current_track: Option<Track>,
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: f64,
    pub volume: f32,
}

impl PlaybackState {
    pub fn new(volume: f32) -> Self {
        Self {
            current_track: None,
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    pub fn transport(&self) -> Transport {
        match (&self.current_track, self.is_playing) {
            (None, _) => Transport::Stopped,
            (Some(_), true) => Transport::Playing,
            (Some(_), false) => Transport::Paused,
        }
    }

    pub fn volume_level(&self) -> VolumeLevel {
        VolumeLevel::from_volume(self.volume)
    }
}

/// Coarse transport state, as media-key integrations understand it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Transport {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Which volume icon to show.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VolumeLevel {
    Muted,
    Low,
    High,
}

impl VolumeLevel {
    pub fn from_volume(volume: f32) -> Self {
        if volume <= 0.0 {
            Self::Muted
        } else if volume < 0.5 {
            Self::Low
        } else {
            Self::High
        }
    }
}

/// The status line under the track title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PlayerStatus {
    #[default]
    Idle,
    Loading,
    Ready(SourceKind),
    Error(String),
}

impl PlayerStatus {
    pub fn label(&self) -> &str {
        match self {
            Self::Idle => "",
            Self::Loading => "Loading...",
            Self::Ready(SourceKind::Stream) => "Streaming",
            Self::Ready(SourceKind::Cached) => "Playing from cache",
            Self::Ready(SourceKind::Download) => "Downloaded",
            Self::Error(_) => "Error",
        }
    }
}
