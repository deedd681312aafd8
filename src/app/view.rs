//! Typed view models: plain data built from the app state, rendered by `ui`.

use crate::config::PlayMode;
use crate::library::{LikedSet, Playlist, Track};
use crate::player::{
    MediaElement, PlaybackController, PlayerStatus, ProgressView, Transport, VolumeLevel,
    format_duration,
};

use super::model::{App, QUICK_PICKS, Remote, View};

/// One playable row.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackCard {
    pub track: Track,
    pub duration: String,
    pub liked: bool,
    pub now_playing: bool,
}

impl TrackCard {
    pub fn new(track: &Track, liked: &LikedSet, now_playing: Option<&str>) -> Self {
        Self {
            duration: format_duration(track.duration),
            liked: liked.contains(&track.id),
            now_playing: now_playing == Some(track.id.as_str()),
            track: track.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistCard {
    pub index: usize,
    pub name: String,
    pub songs: String,
}

impl PlaylistCard {
    pub fn new(index: usize, playlist: &Playlist) -> Self {
        Self {
            index,
            name: playlist.name.clone(),
            songs: count_label(playlist.songs.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    QuickPick { label: &'static str, query: &'static str },
    Track(TrackCard),
    Playlist(PlaylistCard),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmptyState {
    pub message: String,
}

impl EmptyState {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The main list area for the current view.
#[derive(Debug, Clone, PartialEq)]
pub struct ListView {
    pub title: String,
    pub subtitle: Option<String>,
    pub entries: Vec<Entry>,
    /// Shown instead of the entries when there are none.
    pub empty: Option<EmptyState>,
    pub loading: bool,
}

/// Data the list needs that the app model does not own.
pub struct ViewContext<'a> {
    pub recent: &'a [Track],
    pub liked: &'a LikedSet,
    pub now_playing: Option<&'a str>,
    pub home_recent_count: usize,
    pub greeting: &'a str,
}

impl ListView {
    pub fn build(app: &App, cx: &ViewContext<'_>) -> Self {
        let cards = |tracks: &[Track]| -> Vec<Entry> {
            tracks
                .iter()
                .map(|t| Entry::Track(TrackCard::new(t, cx.liked, cx.now_playing)))
                .collect()
        };

        let mut view = match app.view {
            View::Home => {
                let mut entries: Vec<Entry> = QUICK_PICKS
                    .iter()
                    .map(|&(label, query)| Entry::QuickPick { label, query })
                    .collect();
                let recent = &cx.recent[..cx.recent.len().min(cx.home_recent_count)];
                entries.extend(cards(recent));
                ListView {
                    title: cx.greeting.to_string(),
                    subtitle: Some("Quick picks and recently played".to_string()),
                    entries,
                    empty: None,
                    loading: false,
                }
            }
            View::Search => {
                let q = &app.search.query;
                let (entries, empty, subtitle) = match &app.search.results {
                    Remote::Idle => (
                        Vec::new(),
                        Some(EmptyState::new("Search for music to get started")),
                        None,
                    ),
                    Remote::Loading => (Vec::new(), None, Some(format!("Searching for \"{q}\"..."))),
                    Remote::Ready(results) => (
                        cards(results.as_slice()),
                        Some(EmptyState::new(format!("No results found for \"{q}\""))),
                        Some(format!("Results for \"{q}\"")),
                    ),
                    Remote::Failed(msg) => (
                        Vec::new(),
                        Some(EmptyState::new(format!("Search failed: {msg}"))),
                        None,
                    ),
                };
                ListView {
                    title: View::Search.title().to_string(),
                    subtitle,
                    entries,
                    empty,
                    loading: app.search.results.is_loading(),
                }
            }
            View::Liked => ListView {
                title: View::Liked.title().to_string(),
                subtitle: Some(count_label(cx.liked.tracks().len())),
                entries: cards(cx.liked.tracks()),
                empty: Some(EmptyState::new("No liked songs yet")),
                loading: app.liked_sync.is_loading(),
            },
            View::Recent => ListView {
                title: View::Recent.title().to_string(),
                subtitle: None,
                entries: cards(cx.recent),
                empty: Some(EmptyState::new("No recently played tracks")),
                loading: app.recent_sync.is_loading(),
            },
            View::Library => {
                let entries = app
                    .playlists
                    .ready()
                    .map(|p| {
                        p.iter()
                            .enumerate()
                            .map(|(i, pl)| Entry::Playlist(PlaylistCard::new(i, pl)))
                            .collect()
                    })
                    .unwrap_or_default();
                let empty = match &app.playlists {
                    Remote::Failed(_) => "Failed to load playlists",
                    _ => "No playlists yet. Press n to create one",
                };
                ListView {
                    title: View::Library.title().to_string(),
                    subtitle: None,
                    entries,
                    empty: Some(EmptyState::new(empty)),
                    loading: app.playlists.is_loading(),
                }
            }
            View::Playlist(index) => match app.playlist(index) {
                Some(pl) => ListView {
                    title: pl.name.clone(),
                    subtitle: Some(count_label(pl.songs.len())),
                    entries: cards(pl.songs.as_slice()),
                    empty: Some(EmptyState::new("This playlist is empty")),
                    loading: false,
                },
                None => ListView {
                    title: View::Playlist(index).title().to_string(),
                    subtitle: None,
                    entries: Vec::new(),
                    empty: Some(EmptyState::new("Playlist not found")),
                    loading: false,
                },
            },
        };

        if !view.entries.is_empty() || view.loading {
            view.empty = None;
        }
        view
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }
}

fn count_label(n: usize) -> String {
    format!("{n} song{}", if n == 1 { "" } else { "s" })
}

/// The now-playing panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub title: String,
    pub status: String,
    pub transport: Transport,
    pub progress: ProgressView,
    pub volume_percent: u16,
    pub volume_level: VolumeLevel,
    pub liked: bool,
    pub mode: &'static str,
}

impl PlayerView {
    /// `None` while no track is current; the panel is hidden then.
    pub fn build<M: MediaElement>(
        controller: &PlaybackController<M>,
        mode: PlayMode,
    ) -> Option<Self> {
        let state = controller.state();
        let track = state.current_track.as_ref()?;
        let status = match controller.status() {
            PlayerStatus::Error(msg) => format!("Error: {msg}"),
            other => other.label().to_string(),
        };
        Some(Self {
            title: track.title.clone(),
            status,
            transport: state.transport(),
            progress: controller.progress(),
            volume_percent: (state.volume * 100.0).round() as u16,
            volume_level: state.volume_level(),
            liked: controller.is_liked(&track.id),
            mode: mode.as_str(),
        })
    }
}
