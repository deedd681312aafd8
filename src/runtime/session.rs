//! One running client: the app model, the playback controller and the
//! backend jobs they ask for.
//!
//! Every user action and every completion goes through `Session`. Actions
//! that need the backend queue a `Job`; the event loop drains them with
//! `take_jobs` and feeds the results back through `complete`.

use std::time::{Duration, Instant};

use crate::app::{
    App, Entry, InputMode, ListView, NotificationKind, Remote, View, ViewContext, greeting_now,
    validate_playlist_name, validate_query,
};
use crate::config::Settings;
use crate::library::{LikeAction, LikeSettlement, Track};
use crate::mpris::ControlCmd;
use crate::player::{LoadOutcome, MediaElement, MediaEvent, PlaybackController};

use super::jobs::{Completion, Job};

/// The settings a session consults after startup.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub scrub_seconds: u64,
    pub volume_step: f32,
    pub home_recent_count: usize,
    pub notification_ttl: Duration,
}

impl From<&Settings> for SessionSettings {
    fn from(s: &Settings) -> Self {
        Self {
            scrub_seconds: s.controls.scrub_seconds,
            volume_step: s.controls.volume_step,
            home_recent_count: s.ui.home_recent_count,
            notification_ttl: Duration::from_millis(s.ui.notification_ms),
        }
    }
}

pub struct Session<M: MediaElement> {
    pub app: App,
    pub controller: PlaybackController<M>,
    settings: SessionSettings,
    outbox: Vec<Job>,
}

impl<M: MediaElement> Session<M> {
    pub fn new(app: App, controller: PlaybackController<M>, settings: SessionSettings) -> Self {
        Self {
            app,
            controller,
            settings,
            outbox: Vec::new(),
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Jobs queued since the last call.
    pub fn take_jobs(&mut self) -> Vec<Job> {
        std::mem::take(&mut self.outbox)
    }

    pub fn list_view(&self) -> ListView {
        let cx = ViewContext {
            recent: self.controller.recent().tracks(),
            liked: self.controller.liked(),
            now_playing: self.controller.current_track().map(|t| t.id.as_str()),
            home_recent_count: self.settings.home_recent_count,
            greeting: greeting_now(),
        };
        ListView::build(&self.app, &cx)
    }

    fn selected_track(&self) -> Option<Track> {
        match self.list_view().get(self.app.selected) {
            Some(Entry::Track(card)) => Some(card.track.clone()),
            _ => None,
        }
    }

    /// The playing track, else the track under the cursor.
    fn target_track(&self) -> Option<Track> {
        self.controller
            .current_track()
            .cloned()
            .or_else(|| self.selected_track())
    }

    fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.app.notify(kind, message);
    }

    /// Switch to `view` and fetch what it shows from the backend.
    pub fn open_view(&mut self, view: View) {
        self.app.show(view);
        self.fetch_for(view);
    }

    fn fetch_for(&mut self, view: View) {
        match view {
            View::Liked => {
                self.app.liked_sync = Remote::Loading;
                let since = self.controller.liked().revision();
                self.outbox.push(Job::FetchLiked { since });
            }
            View::Recent => {
                self.app.recent_sync = Remote::Loading;
                let since = self.controller.recent().revision();
                self.outbox.push(Job::FetchRecent { since });
            }
            View::Library => {
                self.app.playlists = Remote::Loading;
                self.outbox.push(Job::FetchPlaylists);
            }
            View::Home | View::Search | View::Playlist(_) => {}
        }
    }

    /// Pull liked and recent tracks from the backend without leaving the
    /// current view.
    pub fn sync_library(&mut self) {
        self.fetch_for(View::Liked);
        self.fetch_for(View::Recent);
    }

    pub fn next_view(&mut self) {
        self.open_view(self.app.view.next_tab());
    }

    pub fn prev_view(&mut self) {
        self.open_view(self.app.view.prev_tab());
    }

    /// Re-fetch whatever the current view shows.
    pub fn refresh(&mut self) {
        match self.app.view {
            View::Search => {
                let query = self.app.search.query.clone();
                if !query.is_empty() {
                    self.search(&query);
                }
            }
            View::Home => self.sync_library(),
            View::Playlist(_) => self.fetch_for(View::Library),
            view => self.fetch_for(view),
        }
    }

    pub fn move_down(&mut self) {
        let len = self.list_view().len();
        self.app.next(len);
    }

    pub fn move_up(&mut self) {
        self.app.prev();
    }

    pub fn move_top(&mut self) {
        self.app.selected = 0;
    }

    pub fn move_bottom(&mut self) {
        let len = self.list_view().len();
        self.app.select_last(len);
    }

    /// Act on the entry under the cursor.
    pub fn activate(&mut self) {
        match self.list_view().get(self.app.selected).cloned() {
            Some(Entry::QuickPick { query, .. }) => self.search(query),
            Some(Entry::Track(card)) => self.play(card.track),
            Some(Entry::Playlist(card)) => self.app.show(View::Playlist(card.index)),
            None => {}
        }
    }

    pub fn begin_search(&mut self) {
        self.app.show(View::Search);
        self.app.begin_input(InputMode::Search);
    }

    pub fn begin_new_playlist(&mut self) {
        self.app.begin_input(InputMode::PlaylistName);
    }

    /// Submit the input line for the current input mode.
    pub fn submit_input(&mut self) {
        match self.app.input_mode {
            InputMode::Normal => {}
            InputMode::Search => {
                let raw = std::mem::take(&mut self.app.input);
                self.app.cancel_input();
                self.search(&raw);
            }
            InputMode::PlaylistName => match validate_playlist_name(&self.app.input) {
                Ok(name) => {
                    self.app.cancel_input();
                    self.outbox.push(Job::CreatePlaylist { name });
                }
                Err(msg) => self.notify(NotificationKind::Error, msg),
            },
        }
    }

    /// Run a search. Blank queries never reach the backend.
    pub fn search(&mut self, raw: &str) {
        let Some(query) = validate_query(raw) else {
            self.notify(NotificationKind::Info, "Please enter a search term");
            return;
        };
        self.app.show(View::Search);
        self.app.selected = 0;
        self.app.search.query = query.clone();
        self.app.search.results = Remote::Loading;
        self.outbox.push(Job::Search { query });
    }

    pub fn play(&mut self, track: Track) {
        let req = self.controller.load_and_play(track, self.app.mode);
        self.outbox.push(Job::Resolve {
            ticket: req.ticket,
            url: req.url,
            mode: req.mode,
        });
    }

    pub fn toggle_play_pause(&mut self) {
        if !self.controller.toggle_play_pause() && self.controller.current_track().is_none() {
            // Nothing loaded yet: start the track under the cursor.
            if let Some(track) = self.selected_track() {
                self.play(track);
            }
        }
    }

    pub fn close_player(&mut self) {
        self.controller.close();
    }

    pub fn seek_fraction(&mut self, fraction: f64) {
        self.controller.seek(fraction);
    }

    /// Jump to `tenth` tenths of the track (0 is the start).
    pub fn seek_tenth(&mut self, tenth: u32) {
        self.controller.seek(f64::from(tenth.min(9)) / 10.0);
    }

    pub fn scrub(&mut self, forward: bool) {
        let secs = self.settings.scrub_seconds as f64;
        self.controller.seek_by(if forward { secs } else { -secs });
    }

    pub fn volume_up(&mut self) {
        let v = self.controller.state().volume + self.settings.volume_step;
        self.controller.set_volume(v);
    }

    pub fn volume_down(&mut self) {
        let v = self.controller.state().volume - self.settings.volume_step;
        self.controller.set_volume(v);
    }

    pub fn toggle_mute(&mut self) {
        self.controller.toggle_mute();
    }

    pub fn toggle_like(&mut self) {
        let Some(track) = self.target_track() else {
            return;
        };
        match self.controller.toggle_like(&track) {
            Some(req) => self.outbox.push(Job::Like(req)),
            None => self.notify(NotificationKind::Info, "Still saving your last change"),
        }
    }

    pub fn toggle_mode(&mut self) {
        let msg = self.app.toggle_mode();
        self.notify(NotificationKind::Info, msg);
    }

    pub fn download(&mut self) {
        if self.app.downloading {
            self.notify(NotificationKind::Info, "A download is already running");
            return;
        }
        let Some(track) = self.target_track() else {
            return;
        };
        self.app.downloading = true;
        self.notify(
            NotificationKind::Info,
            format!("Downloading \"{}\"...", track.title),
        );
        self.outbox.push(Job::Download(track));
    }

    /// Apply a media-session command. Returns true when the app should quit.
    pub fn control(&mut self, cmd: ControlCmd) -> bool {
        match cmd {
            ControlCmd::Quit => return true,
            ControlCmd::Play => self.controller.play(),
            ControlCmd::Pause => self.controller.pause(),
            ControlCmd::PlayPause => {
                self.controller.toggle_play_pause();
            }
            ControlCmd::Stop => self.controller.close(),
            ControlCmd::Seek(offset_micros) => {
                self.controller.seek_by(offset_micros as f64 / 1_000_000.0);
            }
        }
        false
    }

    pub fn media_event(&mut self, event: MediaEvent) {
        if let Some(msg) = self.controller.handle_media_event(event) {
            self.notify(NotificationKind::Error, msg);
        }
    }

    pub fn tick(&mut self, now: Instant) {
        self.app
            .expire_notification(now, self.settings.notification_ttl);
    }

    /// Apply the result of a finished job.
    pub fn complete(&mut self, completion: Completion) {
        match completion {
            Completion::Search { query, result } => {
                if query != self.app.search.query {
                    log::debug!("dropping results for superseded query {query:?}");
                    return;
                }
                match result {
                    Ok(tracks) => {
                        let n = tracks.len();
                        self.app.search.results = Remote::Ready(tracks);
                        self.notify(
                            NotificationKind::Success,
                            format!("Found {n} result{}", if n == 1 { "" } else { "s" }),
                        );
                    }
                    Err(e) => {
                        log::warn!("search {query:?} failed: {e}");
                        self.app.search.results = Remote::Failed(e.to_string());
                        self.notify(NotificationKind::Error, format!("Search failed: {e}"));
                    }
                }
            }
            Completion::Resolved { ticket, result } => {
                match self.controller.complete_load(&ticket, result) {
                    LoadOutcome::Started { track, .. } => self.outbox.push(Job::AddRecent(track)),
                    LoadOutcome::Failed(msg) => {
                        self.notify(NotificationKind::Error, format!("Playback failed: {msg}"))
                    }
                    LoadOutcome::Stale => {}
                }
            }
            Completion::RecentSaved(result) => {
                if let Err(e) = result {
                    log::warn!("could not save recent track on the server: {e}");
                }
            }
            Completion::Liked {
                ticket,
                action,
                result,
            } => match self.controller.complete_like(&ticket, result) {
                LikeSettlement::Committed(LikeAction::Add) => {
                    self.notify(NotificationKind::Success, "Added to liked songs")
                }
                LikeSettlement::Committed(LikeAction::Remove) => {
                    self.notify(NotificationKind::Success, "Removed from liked songs")
                }
                LikeSettlement::Failed(_) => {
                    let msg = match action {
                        LikeAction::Add => "Failed to like song",
                        LikeAction::Remove => "Failed to unlike song",
                    };
                    self.notify(NotificationKind::Error, msg);
                }
                LikeSettlement::Unknown => {}
            },
            Completion::LikedFetched { since, result } => match result {
                Ok(tracks) => {
                    // A like committed meanwhile is newer than this answer.
                    self.controller.replace_liked(since, tracks);
                    self.app.liked_sync = Remote::Ready(());
                }
                Err(e) => {
                    log::warn!("fetching liked songs failed: {e}");
                    self.app.liked_sync = Remote::Failed(e.to_string());
                    self.notify(NotificationKind::Error, "Failed to load liked songs");
                }
            },
            Completion::RecentFetched { since, result } => match result {
                Ok(tracks) => {
                    self.controller.replace_recent(since, tracks);
                    self.app.recent_sync = Remote::Ready(());
                }
                Err(e) => {
                    log::warn!("fetching recent tracks failed: {e}");
                    self.app.recent_sync = Remote::Failed(e.to_string());
                    self.notify(NotificationKind::Error, "Failed to load recent tracks");
                }
            },
            Completion::Playlists(result) => match result {
                Ok(playlists) => self.app.playlists = Remote::Ready(playlists),
                Err(e) => {
                    log::warn!("fetching playlists failed: {e}");
                    self.app.playlists = Remote::Failed(e.to_string());
                    self.notify(NotificationKind::Error, "Failed to load playlists");
                }
            },
            Completion::PlaylistCreated { name, result } => match result {
                Ok(()) => {
                    self.notify(
                        NotificationKind::Success,
                        format!("Playlist \"{name}\" created"),
                    );
                    self.open_view(View::Library);
                }
                Err(e) => self.notify(
                    NotificationKind::Error,
                    format!("Failed to create playlist: {e}"),
                ),
            },
            Completion::Downloaded { title, result } => {
                self.app.downloading = false;
                match result {
                    Ok(path) => self.notify(
                        NotificationKind::Success,
                        format!("Downloaded \"{title}\" to {}", path.display()),
                    ),
                    Err(e) => {
                        log::warn!("download of {title:?} failed: {e}");
                        self.notify(NotificationKind::Error, format!("Download failed: {e}"));
                    }
                }
            }
        }

        let len = self.list_view().len();
        self.app.clamp_selection(len);
    }
}
