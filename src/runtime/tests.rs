use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use super::jobs::{Completion, Job};
use super::session::{Session, SessionSettings};
use crate::api::{ApiError, Backend, PlayAudioResponse, ResolvedSource};
use crate::app::{App, Entry, InputMode, NotificationKind, Remote, View};
use crate::config::PlayMode;
use crate::library::{Playlist, Track};
use crate::mpris::ControlCmd;
use crate::player::testing::{FakeMedia, MediaCall};
use crate::player::{MediaEvent, PlaybackController, PlayerStatus};

fn track(id: &str, title: &str) -> Track {
    Track {
        id: id.to_string(),
        url: format!("https://www.youtube.com/watch?v={id}"),
        title: title.to_string(),
        thumbnail: format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg"),
        duration: Some(180.0),
    }
}

/// In-memory backend that records every call.
struct FakeBackend {
    results: Vec<Track>,
    play_audio_json: String,
    fail_likes: bool,
    fail_search: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    fn new() -> Self {
        Self {
            results: vec![track("a1", "Lofi Beats"), track("b2", "Lofi Rain")],
            play_audio_json: r#"{"success": true, "type": "stream", "stream_url": "X"}"#
                .to_string(),
            fail_likes: false,
            fail_search: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Backend for FakeBackend {
    fn search(&self, query: &str) -> Result<Vec<Track>, ApiError> {
        self.record(format!("search {query}"));
        if self.fail_search {
            return Err(ApiError::Rejected("backend down".to_string()));
        }
        Ok(self.results.clone())
    }

    fn play_audio(&self, url: &str, mode: PlayMode) -> Result<ResolvedSource, ApiError> {
        self.record(format!("play-audio {url} {}", mode.as_str()));
        let response: PlayAudioResponse =
            serde_json::from_str(&self.play_audio_json).map_err(|e| ApiError::Rejected(e.to_string()))?;
        response.into_source(|file| format!("http://backend/play/{file}"))
    }

    fn fetch_file(&self, file: &str) -> Result<Vec<u8>, ApiError> {
        self.record(format!("fetch {file}"));
        Ok(b"ID3fake-audio".to_vec())
    }

    fn liked_songs(&self) -> Result<Vec<Track>, ApiError> {
        self.record("liked-songs".to_string());
        Ok(vec![track("z9", "Liked Elsewhere")])
    }

    fn add_liked(&self, t: &Track) -> Result<(), ApiError> {
        self.record(format!("like {}", t.id));
        if self.fail_likes {
            return Err(ApiError::Rejected("Failed to like song".to_string()));
        }
        Ok(())
    }

    fn remove_liked(&self, id: &str) -> Result<(), ApiError> {
        self.record(format!("unlike {id}"));
        if self.fail_likes {
            return Err(ApiError::Rejected("nope".to_string()));
        }
        Ok(())
    }

    fn recent_tracks(&self) -> Result<Vec<Track>, ApiError> {
        self.record("recent-tracks".to_string());
        Ok(Vec::new())
    }

    fn add_recent(&self, t: &Track) -> Result<(), ApiError> {
        self.record(format!("recent {}", t.id));
        Ok(())
    }

    fn playlists(&self) -> Result<Vec<Playlist>, ApiError> {
        self.record("playlists".to_string());
        Ok(vec![Playlist {
            id: "p1".to_string(),
            name: "Study".to_string(),
            songs: vec![track("a1", "Lofi Beats")],
        }])
    }

    fn create_playlist(&self, name: &str) -> Result<(), ApiError> {
        self.record(format!("create-playlist {name}"));
        Ok(())
    }
}

fn settings() -> SessionSettings {
    SessionSettings {
        scrub_seconds: 5,
        volume_step: 0.1,
        home_recent_count: 6,
        notification_ttl: Duration::from_secs(4),
    }
}

fn session() -> Session<FakeMedia> {
    Session::new(
        App::new(PlayMode::Stream),
        PlaybackController::new(FakeMedia::default(), 1.0),
        settings(),
    )
}

/// Run queued jobs (and the jobs their completions queue) to exhaustion.
fn drain(session: &mut Session<FakeMedia>, backend: &FakeBackend, dir: &Path) {
    loop {
        let jobs = session.take_jobs();
        if jobs.is_empty() {
            return;
        }
        for job in jobs {
            let done = job.run(backend, dir);
            session.complete(done);
        }
    }
}

fn notification(session: &Session<FakeMedia>) -> Option<(NotificationKind, String)> {
    session
        .app
        .notification
        .as_ref()
        .map(|n| (n.kind, n.message.clone()))
}

#[test]
fn searching_lofi_then_playing_first_result() {
    let backend = FakeBackend::new();
    let dir = tempfile::tempdir().unwrap();
    let mut s = session();

    s.search("lofi");
    drain(&mut s, &backend, dir.path());

    let list = s.list_view();
    assert_eq!(s.app.view, View::Search);
    assert_eq!(list.len(), 2);
    assert!(list.entries.iter().all(|e| matches!(e, Entry::Track(_))));
    assert_eq!(
        notification(&s),
        Some((NotificationKind::Success, "Found 2 results".to_string()))
    );

    s.activate();
    let jobs = s.take_jobs();
    assert_eq!(jobs.len(), 1);
    assert!(matches!(
        &jobs[0],
        Job::Resolve { url, mode: PlayMode::Stream, .. }
            if url == "https://www.youtube.com/watch?v=a1"
    ));
    for job in jobs {
        let done = job.run(&backend, dir.path());
        s.complete(done);
    }

    let media = s.controller.media();
    assert_eq!(media.source.as_deref(), Some("X"));
    assert_eq!(media.count(&MediaCall::Play), 1);
    assert_eq!(s.controller.status().label(), "Streaming");

    // The element confirms playback.
    s.media_event(MediaEvent::Playing);
    assert!(s.controller.state().is_playing);

    drain(&mut s, &backend, dir.path());
    assert_eq!(
        backend.calls(),
        vec![
            "search lofi".to_string(),
            "play-audio https://www.youtube.com/watch?v=a1 stream".to_string(),
            "recent a1".to_string(),
        ]
    );
    assert_eq!(s.controller.recent().tracks()[0].id, "a1");
}

#[test]
fn blank_search_never_reaches_backend() {
    let mut s = session();
    s.search("   ");
    assert!(s.take_jobs().is_empty());
    assert_eq!(s.app.search.results, Remote::Idle);
    assert!(notification(&s).is_some());
}

#[test]
fn failed_search_shows_notification() {
    let mut backend = FakeBackend::new();
    backend.fail_search = true;
    let dir = tempfile::tempdir().unwrap();
    let mut s = session();

    s.search("lofi");
    drain(&mut s, &backend, dir.path());

    assert_eq!(
        notification(&s),
        Some((NotificationKind::Error, "Search failed: backend down".to_string()))
    );
    assert!(matches!(s.app.search.results, Remote::Failed(_)));
}

#[test]
fn superseded_search_results_are_dropped() {
    let backend = FakeBackend::new();
    let dir = tempfile::tempdir().unwrap();
    let mut s = session();

    s.search("lofi");
    let first = s.take_jobs();
    s.search("jazz");
    let second = s.take_jobs();

    for job in second {
        let done = job.run(&backend, dir.path());
        s.complete(done);
    }
    s.complete(Completion::Search {
        query: "lofi".to_string(),
        result: Ok(Vec::new()),
    });
    drop(first);

    assert_eq!(s.app.search.query, "jazz");
    assert_eq!(s.list_view().len(), 2);
}

#[test]
fn rapid_reselection_plays_only_the_last_track() {
    let backend = FakeBackend::new();
    let dir = tempfile::tempdir().unwrap();
    let mut s = session();
    s.search("lofi");
    drain(&mut s, &backend, dir.path());

    s.activate();
    let first = s.take_jobs();
    s.move_down();
    s.activate();
    let second = s.take_jobs();

    // Completions arrive out of order.
    for job in second.into_iter().chain(first) {
        let done = job.run(&backend, dir.path());
        s.complete(done);
    }

    assert_eq!(
        s.controller.current_track().map(|t| t.id.as_str()),
        Some("b2")
    );
    assert_eq!(s.controller.media().count(&MediaCall::SetSource("X".into())), 1);
    assert_eq!(s.controller.recent().len(), 1);
}

#[test]
fn playback_failure_is_reported() {
    let mut backend = FakeBackend::new();
    backend.play_audio_json = r#"{"success": false, "error": "Invalid YouTube URL"}"#.to_string();
    let dir = tempfile::tempdir().unwrap();
    let mut s = session();

    s.play(track("a1", "Lofi Beats"));
    drain(&mut s, &backend, dir.path());

    assert_eq!(
        s.controller.status(),
        &PlayerStatus::Error("Invalid YouTube URL".to_string())
    );
    assert!(!s.controller.state().is_playing);
    assert_eq!(
        notification(&s),
        Some((
            NotificationKind::Error,
            "Playback failed: Invalid YouTube URL".to_string()
        ))
    );
    assert!(s.controller.recent().is_empty());
}

#[test]
fn download_mode_is_sent_and_cached_source_plays_from_backend() {
    let mut backend = FakeBackend::new();
    backend.play_audio_json = r#"{"success": true, "type": "cached", "file": "a1.mp3"}"#.to_string();
    let dir = tempfile::tempdir().unwrap();
    let mut s = session();

    s.toggle_mode();
    assert_eq!(
        notification(&s),
        Some((NotificationKind::Info, "Download mode enabled".to_string()))
    );
    s.play(track("a1", "Lofi Beats"));
    drain(&mut s, &backend, dir.path());

    assert!(backend.calls().contains(&"play-audio https://www.youtube.com/watch?v=a1 download".to_string()));
    assert_eq!(
        s.controller.media().source.as_deref(),
        Some("http://backend/play/a1.mp3")
    );
    assert_eq!(s.controller.status().label(), "Playing from cache");
}

#[test]
fn like_commits_after_confirmation() {
    let backend = FakeBackend::new();
    let dir = tempfile::tempdir().unwrap();
    let mut s = session();
    s.play(track("a1", "Lofi Beats"));
    drain(&mut s, &backend, dir.path());

    s.toggle_like();
    assert!(!s.controller.is_liked("a1"));
    drain(&mut s, &backend, dir.path());
    assert!(s.controller.is_liked("a1"));
    assert_eq!(
        notification(&s),
        Some((NotificationKind::Success, "Added to liked songs".to_string()))
    );

    s.toggle_like();
    drain(&mut s, &backend, dir.path());
    assert!(!s.controller.is_liked("a1"));
}

#[test]
fn failed_like_leaves_set_unchanged() {
    let mut backend = FakeBackend::new();
    backend.fail_likes = true;
    let dir = tempfile::tempdir().unwrap();
    let mut s = session();
    s.play(track("a1", "Lofi Beats"));
    drain(&mut s, &backend, dir.path());

    s.toggle_like();
    drain(&mut s, &backend, dir.path());

    assert!(!s.controller.is_liked("a1"));
    assert_eq!(
        notification(&s),
        Some((NotificationKind::Error, "Failed to like song".to_string()))
    );
}

#[test]
fn opening_liked_view_syncs_from_server() {
    let backend = FakeBackend::new();
    let dir = tempfile::tempdir().unwrap();
    let mut s = session();

    s.open_view(View::Liked);
    assert!(s.app.liked_sync.is_loading());
    drain(&mut s, &backend, dir.path());

    assert!(s.controller.is_liked("z9"));
    assert_eq!(s.app.liked_sync, Remote::Ready(()));
    assert_eq!(s.list_view().len(), 1);
}

#[test]
fn playlist_creation_validates_then_reloads_library() {
    let backend = FakeBackend::new();
    let dir = tempfile::tempdir().unwrap();
    let mut s = session();

    s.begin_new_playlist();
    s.submit_input();
    assert!(s.take_jobs().is_empty());
    assert_eq!(s.app.input_mode, InputMode::PlaylistName);
    assert_eq!(
        notification(&s),
        Some((NotificationKind::Error, "Please enter a playlist name".to_string()))
    );

    for c in "  Study  ".chars() {
        s.app.push_input_char(c);
    }
    s.submit_input();
    drain(&mut s, &backend, dir.path());

    assert_eq!(s.app.input_mode, InputMode::Normal);
    assert_eq!(s.app.view, View::Library);
    assert_eq!(
        backend.calls(),
        vec!["create-playlist Study".to_string(), "playlists".to_string()]
    );
    assert_eq!(s.list_view().len(), 1);

    s.activate();
    assert_eq!(s.app.view, View::Playlist(0));
    assert_eq!(s.list_view().title, "Study");
}

#[test]
fn download_writes_file_into_downloads_dir() {
    let mut backend = FakeBackend::new();
    backend.play_audio_json =
        r#"{"success": true, "type": "download", "file": "Lofi Beats.mp3"}"#.to_string();
    let dir = tempfile::tempdir().unwrap();
    let mut s = session();
    s.search("lofi");
    drain(&mut s, &backend, dir.path());

    s.download();
    assert!(s.app.downloading);
    drain(&mut s, &backend, dir.path());

    assert!(!s.app.downloading);
    let written = std::fs::read(dir.path().join("Lofi Beats.mp3")).unwrap();
    assert_eq!(written, b"ID3fake-audio");
    assert!(matches!(notification(&s), Some((NotificationKind::Success, _))));
}

#[test]
fn media_controls_drive_the_controller() {
    let backend = FakeBackend::new();
    let dir = tempfile::tempdir().unwrap();
    let mut s = session();
    s.play(track("a1", "Lofi Beats"));
    drain(&mut s, &backend, dir.path());
    s.media_event(MediaEvent::Playing);
    s.media_event(MediaEvent::TimeUpdate {
        position: Duration::from_secs(20),
        duration: Some(Duration::from_secs(200)),
    });

    s.seek_tenth(5);
    assert_eq!(s.controller.media().seeks(), vec![100.0]);

    assert!(!s.control(ControlCmd::Seek(10_000_000)));
    assert_eq!(s.controller.media().seeks(), vec![100.0, 30.0]);

    s.control(ControlCmd::PlayPause);
    assert_eq!(s.controller.media().count(&MediaCall::Pause), 1);

    s.control(ControlCmd::Stop);
    assert!(s.controller.current_track().is_none());
    assert!(s.control(ControlCmd::Quit));
}

#[test]
fn volume_steps_clamp() {
    let mut s = session();
    s.volume_up();
    assert_eq!(s.controller.state().volume, 1.0);
    s.toggle_mute();
    assert_eq!(s.controller.state().volume, 0.0);
    s.volume_down();
    assert_eq!(s.controller.state().volume, 0.0);
    s.toggle_mute();
    assert_eq!(s.controller.state().volume, 0.5);
}

#[test]
fn recent_fetch_sent_before_a_play_does_not_drop_it() {
    let backend = FakeBackend::new();
    let dir = tempfile::tempdir().unwrap();
    let mut s = session();

    s.sync_library();
    let startup = s.take_jobs();

    s.play(track("a1", "Lofi Beats"));
    drain(&mut s, &backend, dir.path());
    assert_eq!(s.controller.recent().len(), 1);

    // The server's (empty) list was read before the play reached it.
    for job in startup {
        let done = job.run(&backend, dir.path());
        s.complete(done);
    }

    assert_eq!(s.controller.recent().tracks()[0].id, "a1");
    assert_eq!(s.app.recent_sync, Remote::Ready(()));
}

#[test]
fn liked_fetch_sent_before_a_confirmed_like_does_not_drop_it() {
    let backend = FakeBackend::new();
    let dir = tempfile::tempdir().unwrap();
    let mut s = session();
    s.play(track("a1", "Lofi Beats"));
    drain(&mut s, &backend, dir.path());

    s.open_view(View::Liked);
    let fetch = s.take_jobs();

    s.toggle_like();
    drain(&mut s, &backend, dir.path());
    assert!(s.controller.is_liked("a1"));

    for job in fetch {
        let done = job.run(&backend, dir.path());
        s.complete(done);
    }

    assert!(s.controller.is_liked("a1"));
    assert!(!s.controller.is_liked("z9"));
    assert_eq!(s.app.liked_sync, Remote::Ready(()));
}

#[test]
fn later_fetch_still_replaces_the_lists() {
    let backend = FakeBackend::new();
    let dir = tempfile::tempdir().unwrap();
    let mut s = session();
    s.play(track("a1", "Lofi Beats"));
    drain(&mut s, &backend, dir.path());

    s.sync_library();
    drain(&mut s, &backend, dir.path());

    assert!(s.controller.recent().is_empty());
    assert!(s.controller.is_liked("z9"));
}

#[test]
fn refreshing_home_syncs_liked_and_recent() {
    let mut s = session();
    assert_eq!(s.app.view, View::Home);

    s.refresh();
    let jobs = s.take_jobs();

    assert_eq!(jobs.len(), 2);
    assert!(jobs.iter().any(|j| matches!(j, Job::FetchLiked { .. })));
    assert!(jobs.iter().any(|j| matches!(j, Job::FetchRecent { .. })));
}
