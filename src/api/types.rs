//! Request and response bodies of the backend's JSON API.

use serde::{Deserialize, Serialize};

use crate::library::{Playlist, Track};

use super::error::ApiError;

#[derive(Debug, Serialize)]
pub(super) struct SearchRequest<'a> {
    pub query: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchResponse {
    #[serde(default)]
    pub results: Vec<Track>,
}

#[derive(Debug, Serialize)]
pub(super) struct PlayAudioRequest<'a> {
    pub url: &'a str,
    pub mode: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct LikeRequest<'a> {
    pub song: &'a Track,
}

#[derive(Debug, Serialize)]
pub(super) struct UnlikeRequest<'a> {
    pub id: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct RecentRequest<'a> {
    pub track: &'a Track,
}

#[derive(Debug, Serialize)]
pub(super) struct CreatePlaylistRequest<'a> {
    pub name: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct SongsResponse {
    #[serde(default)]
    pub songs: Vec<Track>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TracksResponse {
    #[serde(default)]
    pub tracks: Vec<Track>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PlaylistsResponse {
    #[serde(default)]
    pub playlists: Vec<Playlist>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct SuccessResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of a non-2xx response, when the backend explains itself.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    pub error: Option<String>,
}

/// How the backend prepared a track for playback.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// A direct upstream stream URL.
    Stream,
    /// A file the backend already had on disk.
    Cached,
    /// A file the backend downloaded for this request.
    Download,
}

/// A playable URL for a track plus how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub kind: SourceKind,
    pub url: String,
    /// Backend file name for `Cached` and `Download` sources.
    pub file: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlayAudioResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub stream_url: Option<String>,
    pub file: Option<String>,
    pub error: Option<String>,
}

impl PlayAudioResponse {
    /// Turn the response into a playable URL. File based sources are served
    /// by the backend's `/play/<file>` route, built with `file_url`.
    pub fn into_source(
        self,
        file_url: impl Fn(&str) -> String,
    ) -> Result<ResolvedSource, ApiError> {
        if !self.success {
            return Err(ApiError::Rejected(
                self.error
                    .unwrap_or_else(|| "Failed to play audio".to_string()),
            ));
        }

        match self.kind.as_deref() {
            Some("stream") => match self.stream_url {
                Some(url) if !url.is_empty() => Ok(ResolvedSource {
                    kind: SourceKind::Stream,
                    url,
                    file: None,
                }),
                _ => Err(ApiError::Rejected(
                    "stream response without stream_url".to_string(),
                )),
            },
            Some(kind @ ("cached" | "download")) => match self.file {
                Some(file) if !file.is_empty() => Ok(ResolvedSource {
                    kind: if kind == "cached" {
                        SourceKind::Cached
                    } else {
                        SourceKind::Download
                    },
                    url: file_url(&file),
                    file: Some(file),
                }),
                _ => Err(ApiError::Rejected(format!("{kind} response without file"))),
            },
            other => Err(ApiError::Rejected(format!(
                "unknown source type: {}",
                other.unwrap_or("<missing>")
            ))),
        }
    }
}
