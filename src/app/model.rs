//! Application model: everything the UI shows that is not playback.
//!
//! `App` holds the current view, the text input, the results of the last
//! search, playlists, the list cursor and the transient notification. Player
//! state lives in `PlaybackController`.

use std::time::{Duration, Instant};

use chrono::Timelike;

use crate::config::PlayMode;
use crate::library::{Playlist, Track};

/// Longest playlist name the backend accepts.
pub const PLAYLIST_NAME_MAX: usize = 50;

/// Preset searches offered on the home view, as `(label, query)`.
pub const QUICK_PICKS: [(&str, &str); 4] = [
    ("Trending Now", "trending music 2024"),
    ("Chill Vibes", "chill music"),
    ("Workout", "workout music"),
    ("Focus", "focus music"),
];

/// Which page the main area shows.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Home,
    Search,
    Liked,
    Recent,
    Library,
    /// Songs of the playlist at this index of `App::playlists`.
    Playlist(usize),
}

impl View {
    /// Views reachable with Tab, in order.
    pub const TABS: [View; 5] = [
        View::Home,
        View::Search,
        View::Liked,
        View::Recent,
        View::Library,
    ];

    pub fn title(self) -> &'static str {
        match self {
            View::Home => "Home",
            View::Search => "Search",
            View::Liked => "Liked Songs",
            View::Recent => "Recently Played",
            View::Library => "Your Library",
            View::Playlist(_) => "Playlist",
        }
    }

    fn tab_index(self) -> usize {
        match self {
            View::Playlist(_) => 4,
            v => View::TABS.iter().position(|t| *t == v).unwrap_or(0),
        }
    }

    pub fn next_tab(self) -> View {
        View::TABS[(self.tab_index() + 1) % View::TABS.len()]
    }

    pub fn prev_tab(self) -> View {
        let len = View::TABS.len();
        View::TABS[(self.tab_index() + len - 1) % len]
    }
}

/// What keystrokes currently edit.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    Search,
    PlaylistName,
}

/// Lifecycle of data fetched from the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Remote<T> {
    #[default]
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Remote<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Remote::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Remote::Ready(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub raised_at: Instant,
}

/// Results of the most recent search.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    /// The query the results belong to.
    pub query: String,
    pub results: Remote<Vec<Track>>,
}

/// The main application model.
#[derive(Debug)]
pub struct App {
    pub view: View,
    pub input_mode: InputMode,
    pub input: String,
    pub search: SearchState,
    pub playlists: Remote<Vec<Playlist>>,
    /// Loading flags for the liked and recent views; their data lives in the
    /// controller.
    pub liked_sync: Remote<()>,
    pub recent_sync: Remote<()>,
    pub selected: usize,
    pub mode: PlayMode,
    pub notification: Option<Notification>,
    pub downloading: bool,
}

impl App {
    pub fn new(mode: PlayMode) -> Self {
        Self {
            view: View::Home,
            input_mode: InputMode::Normal,
            input: String::new(),
            search: SearchState::default(),
            playlists: Remote::Idle,
            liked_sync: Remote::Idle,
            recent_sync: Remote::Idle,
            selected: 0,
            mode,
            notification: None,
            downloading: false,
        }
    }

    /// Switch view and put the cursor back at the top.
    pub fn show(&mut self, view: View) {
        if self.view != view {
            self.view = view;
            self.selected = 0;
        }
    }

    pub fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) {
        let message = message.into();
        log::debug!("notification ({kind:?}): {message}");
        self.notification = Some(Notification {
            message,
            kind,
            raised_at: Instant::now(),
        });
    }

    /// Drop the notification once it has been visible for `ttl`.
    pub fn expire_notification(&mut self, now: Instant, ttl: Duration) {
        if self
            .notification
            .as_ref()
            .is_some_and(|n| now.saturating_duration_since(n.raised_at) >= ttl)
        {
            self.notification = None;
        }
    }

    /// Flip stream/download mode and return the notification text.
    pub fn toggle_mode(&mut self) -> &'static str {
        self.mode = self.mode.toggled();
        match self.mode {
            PlayMode::Stream => "Streaming mode enabled",
            PlayMode::Download => "Download mode enabled",
        }
    }

    pub fn begin_input(&mut self, mode: InputMode) {
        self.input_mode = mode;
        self.input = match mode {
            InputMode::Search => self.search.query.clone(),
            _ => String::new(),
        };
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input.clear();
    }

    pub fn push_input_char(&mut self, c: char) {
        if self.input_mode == InputMode::PlaylistName
            && self.input.chars().count() >= PLAYLIST_NAME_MAX
        {
            return;
        }
        self.input.push(c);
    }

    pub fn pop_input_char(&mut self) {
        self.input.pop();
    }

    /// Clamp the cursor into a list of `len` rows.
    pub fn clamp_selection(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    pub fn next(&mut self, len: usize) {
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    pub fn playlist(&self, index: usize) -> Option<&Playlist> {
        self.playlists.ready().and_then(|p| p.get(index))
    }
}

/// Trim a search query; `None` when nothing is left to search for.
pub fn validate_query(raw: &str) -> Option<String> {
    let q = raw.trim();
    (!q.is_empty()).then(|| q.to_string())
}

/// Trim a playlist name and check it against what the backend accepts.
pub fn validate_playlist_name(raw: &str) -> Result<String, &'static str> {
    let name = raw.trim();
    if name.is_empty() {
        return Err("Please enter a playlist name");
    }
    if name.chars().count() > PLAYLIST_NAME_MAX {
        return Err("Playlist name is too long");
    }
    Ok(name.to_string())
}

/// Salutation for the home view at `hour` (0-23).
pub fn greeting(hour: u32) -> &'static str {
    match hour {
        0..=11 => "Good morning",
        12..=17 => "Good afternoon",
        _ => "Good evening",
    }
}

pub fn greeting_now() -> &'static str {
    greeting(chrono::Local::now().hour())
}
