use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::{PlayMode, ServerSettings};
use crate::library::{Playlist, Track};

use super::Backend;
use super::error::ApiError;
use super::types::*;

/// Blocking HTTP client for the music backend.
///
/// Every method performs one request; callers run them off the UI thread.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(settings: &ServerSettings) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .user_agent(concat!("riff/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// URL of a backend-side audio file.
    pub fn file_url(&self, file: &str) -> String {
        self.endpoint(&format!("play/{}", urlencoding::encode(file)))
    }

    fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> RequestBuilder {
        self.http.post(self.endpoint(path)).json(body)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http.get(self.endpoint(path))
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        log::warn!("backend answered {status} for {}", response.url());
        let message = response
            .json::<ErrorBody>()
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.trim().is_empty());
        Err(match message {
            Some(m) => ApiError::Rejected(m),
            None => ApiError::Status(status),
        })
    }

    fn send_json<R: DeserializeOwned>(&self, request: RequestBuilder) -> Result<R, ApiError> {
        Ok(self.send(request)?.json::<R>()?)
    }

    fn send_success(&self, request: RequestBuilder, failure: &str) -> Result<(), ApiError> {
        let body: SuccessResponse = self.send_json(request)?;
        if body.success {
            Ok(())
        } else {
            Err(ApiError::Rejected(
                body.error.unwrap_or_else(|| failure.to_string()),
            ))
        }
    }
}

impl Backend for ApiClient {
    fn search(&self, query: &str) -> Result<Vec<Track>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ApiError::InvalidInput("No search query provided"));
        }
        log::info!("searching for {query:?}");
        let body: SearchResponse = self.send_json(self.post("search", &SearchRequest { query }))?;
        Ok(body.results)
    }

    fn play_audio(&self, url: &str, mode: PlayMode) -> Result<ResolvedSource, ApiError> {
        log::info!("resolving source for {url} ({})", mode.as_str());
        let request = self.post(
            "play-audio",
            &PlayAudioRequest {
                url,
                mode: mode.as_str(),
            },
        );
        let body: PlayAudioResponse = self.send_json(request)?;
        body.into_source(|file| self.file_url(file))
    }

    fn fetch_file(&self, file: &str) -> Result<Vec<u8>, ApiError> {
        let response = self.send(self.http.get(self.file_url(file)))?;
        Ok(response.bytes()?.to_vec())
    }

    fn liked_songs(&self) -> Result<Vec<Track>, ApiError> {
        let body: SongsResponse = self.send_json(self.get("liked-songs"))?;
        Ok(body.songs)
    }

    fn add_liked(&self, track: &Track) -> Result<(), ApiError> {
        self.send_success(
            self.post("liked-songs", &LikeRequest { song: track }),
            "Failed to add to liked songs",
        )
    }

    fn remove_liked(&self, id: &str) -> Result<(), ApiError> {
        let request = self
            .http
            .delete(self.endpoint("liked-songs"))
            .json(&UnlikeRequest { id });
        self.send(request).map(|_| ())
    }

    fn recent_tracks(&self) -> Result<Vec<Track>, ApiError> {
        let body: TracksResponse = self.send_json(self.get("recent-tracks"))?;
        Ok(body.tracks)
    }

    fn add_recent(&self, track: &Track) -> Result<(), ApiError> {
        self.send(self.post("recent-tracks", &RecentRequest { track }))
            .map(|_| ())
    }

    fn playlists(&self) -> Result<Vec<Playlist>, ApiError> {
        let body: PlaylistsResponse = self.send_json(self.get("playlists"))?;
        Ok(body.playlists)
    }

    fn create_playlist(&self, name: &str) -> Result<(), ApiError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidInput("Please enter a playlist name"));
        }
        self.send_success(
            self.post("playlists", &CreatePlaylistRequest { name }),
            "Failed to create playlist",
        )
    }
}
