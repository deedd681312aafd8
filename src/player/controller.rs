use crate::api::{ApiError, ResolvedSource, SourceKind};
use crate::config::PlayMode;
use crate::library::{
    LikeAction, LikeSettlement, LikeTicket, LikedSet, LocalCache, RecentList, Track,
};

use super::media::{MediaElement, MediaEvent};
use super::progress::ProgressView;
use super::state::{PlaybackState, PlayerStatus};

/// Identifies one source resolution. A completion is applied only if its
/// ticket is still the pending one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub seq: u64,
    pub track_id: String,
}

/// A `/play-audio` call the caller must perform and report back through
/// `complete_load`.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub ticket: LoadTicket,
    pub url: String,
    pub mode: PlayMode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The source is on the element and playback was requested.
    Started { track: Track, kind: SourceKind },
    /// Resolution failed; the message is user-facing.
    Failed(String),
    /// The user moved on before the response arrived.
    Stale,
}

/// A liked-songs call the caller must perform and report back through
/// `complete_like`.
#[derive(Debug, Clone, PartialEq)]
pub struct LikeRequest {
    pub ticket: LikeTicket,
    pub action: LikeAction,
    pub track: Track,
}

/// Drives one media element from user intent and keeps `PlaybackState`
/// in step with what the element reports.
///
/// Network calls are not made here: operations that need the backend return a
/// request, and the matching `complete_*` method applies the response.
pub struct PlaybackController<M: MediaElement> {
    media: M,
    state: PlaybackState,
    status: PlayerStatus,
    recent: RecentList,
    liked: LikedSet,
    cache: Option<LocalCache>,
    next_load_seq: u64,
    pending_load: Option<LoadTicket>,
    /// The element has reported `Emptied` since the current source was set.
    /// Errors before that belong to the source it replaced.
    source_taken: bool,
}

impl<M: MediaElement> PlaybackController<M> {
    pub fn new(mut media: M, volume: f32) -> Self {
        let state = PlaybackState::new(volume);
        media.set_volume(state.volume);
        Self {
            media,
            state,
            status: PlayerStatus::Idle,
            recent: RecentList::default(),
            liked: LikedSet::default(),
            cache: None,
            next_load_seq: 0,
            pending_load: None,
            source_taken: false,
        }
    }

    /// Seed the recent and liked lists from the local cache and keep
    /// mirroring changes into it.
    pub fn with_cache(mut self, cache: LocalCache) -> Self {
        match cache.load_recent() {
            Ok(tracks) => self.recent = RecentList::from_tracks(tracks),
            Err(e) => log::warn!("ignoring recent-tracks cache: {e}"),
        }
        match cache.load_liked() {
            Ok(tracks) => self.liked = LikedSet::from_tracks(tracks),
            Err(e) => log::warn!("ignoring liked-tracks cache: {e}"),
        }
        self.cache = Some(cache);
        self
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn status(&self) -> &PlayerStatus {
        &self.status
    }

    pub fn recent(&self) -> &RecentList {
        &self.recent
    }

    pub fn liked(&self) -> &LikedSet {
        &self.liked
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.state.current_track.as_ref()
    }

    pub fn is_liked(&self, id: &str) -> bool {
        self.liked.contains(id)
    }

    pub fn progress(&self) -> ProgressView {
        ProgressView::project(self.state.current_time, self.state.duration)
    }

    /// Make `track` current and ask for a playable source.
    ///
    /// Whatever was playing stops now; any earlier pending load is superseded.
    pub fn load_and_play(&mut self, track: Track, mode: PlayMode) -> LoadRequest {
        self.media.clear();
        self.next_load_seq += 1;

        let ticket = LoadTicket {
            seq: self.next_load_seq,
            track_id: track.id.clone(),
        };
        let request = LoadRequest {
            ticket: ticket.clone(),
            url: track.url.clone(),
            mode,
        };

        log::info!("loading {:?} ({})", track.title, mode.as_str());
        self.state.current_track = Some(track);
        self.state.is_playing = false;
        self.state.current_time = 0.0;
        self.state.duration = 0.0;
        self.status = PlayerStatus::Loading;
        self.pending_load = Some(ticket);
        request
    }

    /// Apply the backend's answer to a `load_and_play` request.
    pub fn complete_load(
        &mut self,
        ticket: &LoadTicket,
        result: Result<ResolvedSource, ApiError>,
    ) -> LoadOutcome {
        let current = self
            .state
            .current_track
            .as_ref()
            .is_some_and(|t| t.id == ticket.track_id);
        if self.pending_load.as_ref() != Some(ticket) || !current {
            log::debug!("discarding stale source for {}", ticket.track_id);
            return LoadOutcome::Stale;
        }
        self.pending_load = None;

        let source = match result {
            Ok(s) => s,
            Err(e) => {
                log::warn!("could not resolve {}: {e}", ticket.track_id);
                let message = e.to_string();
                self.status = PlayerStatus::Error(message.clone());
                return LoadOutcome::Failed(message);
            }
        };

        self.media.set_source(&source.url);
        self.source_taken = false;
        self.media.play();
        self.status = PlayerStatus::Ready(source.kind);

        let Some(track) = self.state.current_track.clone() else {
            return LoadOutcome::Stale;
        };
        self.recent.push(track.clone());
        self.save_recent();

        LoadOutcome::Started {
            track,
            kind: source.kind,
        }
    }

    /// Ask the element to flip play/pause. `is_playing` follows later, from
    /// the element's own events. Returns false when nothing is loaded.
    pub fn toggle_play_pause(&mut self) -> bool {
        if !self.media.has_source() {
            return false;
        }
        if self.state.is_playing {
            self.media.pause();
        } else {
            self.media.play();
        }
        true
    }

    pub fn play(&mut self) {
        if self.media.has_source() && !self.state.is_playing {
            self.media.play();
        }
    }

    pub fn pause(&mut self) {
        if self.media.has_source() && self.state.is_playing {
            self.media.pause();
        }
    }

    /// Seek to `fraction` of the track. Returns the requested position, or
    /// `None` when the duration is not known yet.
    pub fn seek(&mut self, fraction: f64) -> Option<f64> {
        if !fraction.is_finite() {
            return None;
        }
        self.seek_to(fraction.clamp(0.0, 1.0) * self.state.duration)
    }

    /// Seek relative to the current position.
    pub fn seek_by(&mut self, delta_secs: f64) -> Option<f64> {
        if !delta_secs.is_finite() {
            return None;
        }
        self.seek_to(self.state.current_time + delta_secs)
    }

    fn seek_to(&mut self, position: f64) -> Option<f64> {
        let duration = self.state.duration;
        if !self.media.has_source() || !(duration > 0.0) {
            return None;
        }
        let position = position.clamp(0.0, duration);
        self.media.seek(position);
        Some(position)
    }

    pub fn set_volume(&mut self, fraction: f32) {
        let volume = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.state.volume = volume;
        self.media.set_volume(volume);
    }

    /// Mute, or restore half volume when already muted.
    pub fn toggle_mute(&mut self) {
        if self.state.volume > 0.0 {
            self.set_volume(0.0);
        } else {
            self.set_volume(0.5);
        }
    }

    /// Start a like/unlike for `track`. `None` while an earlier toggle for the
    /// same track is still waiting on the server.
    pub fn toggle_like(&mut self, track: &Track) -> Option<LikeRequest> {
        let (ticket, action) = self.liked.begin(track)?;
        Some(LikeRequest {
            ticket,
            action,
            track: track.clone(),
        })
    }

    /// Apply the server's answer to a like/unlike. The liked set changes only
    /// when the server confirmed.
    pub fn complete_like(
        &mut self,
        ticket: &LikeTicket,
        result: Result<(), ApiError>,
    ) -> LikeSettlement {
        if let Err(e) = &result {
            log::warn!("liked-songs update for {} failed: {e}", ticket.track_id);
        }
        let settlement = self.liked.settle(ticket, result.is_ok());
        if matches!(settlement, LikeSettlement::Committed(_)) {
            self.save_liked();
        }
        settlement
    }

    /// Adopt the server's liked list, fetched when the set was at revision
    /// `since`. Returns false, keeping the local set, when a like was
    /// committed after the fetch was sent.
    pub fn replace_liked(&mut self, since: u64, tracks: Vec<Track>) -> bool {
        if self.liked.revision() != since {
            log::debug!("liked songs changed since revision {since}; keeping local set");
            return false;
        }
        self.liked.replace(tracks);
        self.save_liked();
        true
    }

    /// Adopt the server's recent list, fetched when the list was at revision
    /// `since`. Returns false, keeping the local list, when a track was
    /// played after the fetch was sent.
    pub fn replace_recent(&mut self, since: u64, tracks: Vec<Track>) -> bool {
        if self.recent.revision() != since {
            log::debug!("recent tracks changed since revision {since}; keeping local list");
            return false;
        }
        self.recent.replace(tracks);
        self.save_recent();
        true
    }

    fn save_recent(&self) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.save_recent(self.recent.tracks()) {
                log::warn!("failed to save recent tracks: {e}");
            }
        }
    }

    fn save_liked(&self) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.save_liked(self.liked.tracks()) {
                log::warn!("failed to save liked tracks: {e}");
            }
        }
    }

    /// Stop, drop the source and forget the current track.
    pub fn close(&mut self) {
        self.media.pause();
        self.media.clear();
        self.pending_load = None;
        self.state = PlaybackState::new(self.state.volume);
        self.status = PlayerStatus::Idle;
    }

    /// Fold an element event into the state. Returns a message worth showing
    /// to the user, if any.
    pub fn handle_media_event(&mut self, event: MediaEvent) -> Option<String> {
        // Events still in flight from a source we already dropped.
        if !self.media.has_source() && event != MediaEvent::Emptied {
            return None;
        }

        match event {
            MediaEvent::Playing => self.state.is_playing = true,
            MediaEvent::Paused | MediaEvent::Ended => self.state.is_playing = false,
            MediaEvent::TimeUpdate { position, duration } => {
                self.state.current_time = position.as_secs_f64();
                self.state.duration = self.resolve_duration(duration.map(|d| d.as_secs_f64()));
            }
            MediaEvent::LoadedMetadata { duration } => {
                self.state.duration = self.resolve_duration(duration.map(|d| d.as_secs_f64()));
            }
            MediaEvent::Emptied => {
                if self.media.has_source() {
                    self.source_taken = true;
                }
                self.state.is_playing = false;
                self.state.current_time = 0.0;
                self.state.duration = 0.0;
            }
            MediaEvent::Error(msg) if !self.source_taken => {
                log::debug!("ignoring error from a replaced source: {msg}");
            }
            MediaEvent::Error(msg) => {
                self.state.is_playing = false;
                self.status = PlayerStatus::Error(msg.clone());
                return Some(format!("Playback failed: {msg}"));
            }
        }
        None
    }

    /// The element's duration wins; the catalogue's length fills in for
    /// streams without a header.
    fn resolve_duration(&self, reported: Option<f64>) -> f64 {
        reported
            .filter(|d| d.is_finite() && *d > 0.0)
            .or_else(|| self.state.current_track.as_ref().and_then(|t| t.duration))
            .unwrap_or(0.0)
    }
}
