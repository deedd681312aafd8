//! HTTP access to the music backend.
//!
//! `Backend` is the seam the rest of the app talks to; `ApiClient` is the
//! real implementation over blocking `reqwest`.

mod client;
mod error;
mod types;

pub use client::ApiClient;
pub use error::ApiError;
pub use types::{PlayAudioResponse, ResolvedSource, SourceKind};

use crate::config::PlayMode;
use crate::library::{Playlist, Track};

/// Operations offered by the backend. Calls block; run them on a worker.
pub trait Backend: Send + Sync {
    /// `POST /search`
    fn search(&self, query: &str) -> Result<Vec<Track>, ApiError>;
    /// `POST /play-audio`, resolved to a playable URL.
    fn play_audio(&self, url: &str, mode: PlayMode) -> Result<ResolvedSource, ApiError>;
    /// `GET /play/:file`
    fn fetch_file(&self, file: &str) -> Result<Vec<u8>, ApiError>;
    /// `GET /liked-songs`
    fn liked_songs(&self) -> Result<Vec<Track>, ApiError>;
    /// `POST /liked-songs`
    fn add_liked(&self, track: &Track) -> Result<(), ApiError>;
    /// `DELETE /liked-songs`
    fn remove_liked(&self, id: &str) -> Result<(), ApiError>;
    /// `GET /recent-tracks`
    fn recent_tracks(&self) -> Result<Vec<Track>, ApiError>;
    /// `POST /recent-tracks`
    fn add_recent(&self, track: &Track) -> Result<(), ApiError>;
    /// `GET /playlists`
    fn playlists(&self) -> Result<Vec<Playlist>, ApiError>;
    /// `POST /playlists`
    fn create_playlist(&self, name: &str) -> Result<(), ApiError>;
}
