//! Backend calls run off the UI thread.
//!
//! The session emits `Job`s; the `Dispatcher` runs each one on a worker
//! thread and posts the matching `Completion` back to the event loop.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use crate::api::{ApiError, Backend, ResolvedSource};
use crate::config::PlayMode;
use crate::library::{LikeAction, LikeTicket, Playlist, Track};
use crate::player::{LikeRequest, LoadTicket};

#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    Search { query: String },
    Resolve { ticket: LoadTicket, url: String, mode: PlayMode },
    AddRecent(Track),
    Like(LikeRequest),
    /// `since` is the local list's revision when the fetch was queued.
    FetchLiked { since: u64 },
    FetchRecent { since: u64 },
    FetchPlaylists,
    CreatePlaylist { name: String },
    Download(Track),
}

#[derive(Debug)]
pub enum Completion {
    Search {
        query: String,
        result: Result<Vec<Track>, ApiError>,
    },
    Resolved {
        ticket: LoadTicket,
        result: Result<ResolvedSource, ApiError>,
    },
    RecentSaved(Result<(), ApiError>),
    Liked {
        ticket: LikeTicket,
        action: LikeAction,
        result: Result<(), ApiError>,
    },
    LikedFetched {
        since: u64,
        result: Result<Vec<Track>, ApiError>,
    },
    RecentFetched {
        since: u64,
        result: Result<Vec<Track>, ApiError>,
    },
    Playlists(Result<Vec<Playlist>, ApiError>),
    PlaylistCreated {
        name: String,
        result: Result<(), ApiError>,
    },
    Downloaded {
        title: String,
        result: Result<PathBuf, ApiError>,
    },
}

impl Job {
    /// Perform the call. Blocks on the network.
    pub fn run(self, backend: &dyn Backend, downloads_dir: &Path) -> Completion {
        match self {
            Job::Search { query } => {
                let result = backend.search(&query);
                Completion::Search { query, result }
            }
            Job::Resolve { ticket, url, mode } => Completion::Resolved {
                result: backend.play_audio(&url, mode),
                ticket,
            },
            Job::AddRecent(track) => Completion::RecentSaved(backend.add_recent(&track)),
            Job::Like(req) => {
                let result = match req.action {
                    LikeAction::Add => backend.add_liked(&req.track),
                    LikeAction::Remove => backend.remove_liked(&req.track.id),
                };
                Completion::Liked {
                    ticket: req.ticket,
                    action: req.action,
                    result,
                }
            }
            Job::FetchLiked { since } => Completion::LikedFetched {
                since,
                result: backend.liked_songs(),
            },
            Job::FetchRecent { since } => Completion::RecentFetched {
                since,
                result: backend.recent_tracks(),
            },
            Job::FetchPlaylists => Completion::Playlists(backend.playlists()),
            Job::CreatePlaylist { name } => {
                let result = backend.create_playlist(&name);
                Completion::PlaylistCreated { name, result }
            }
            Job::Download(track) => Completion::Downloaded {
                result: download(backend, &track, downloads_dir),
                title: track.title,
            },
        }
    }
}

/// Have the backend fetch `track` to its disk, then copy the file into
/// `dir`. Returns the written path.
fn download(backend: &dyn Backend, track: &Track, dir: &Path) -> Result<PathBuf, ApiError> {
    let source = backend.play_audio(&track.url, PlayMode::Download)?;
    let file = source
        .file
        .ok_or_else(|| ApiError::Rejected("Download did not produce a file".to_string()))?;
    let bytes = backend.fetch_file(&file)?;

    // Only the final path component; the backend picks the name.
    let name = Path::new(&file)
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(format!("{}.mp3", track.id)));
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    fs::write(&path, bytes)?;
    log::info!("downloaded {:?} to {}", track.title, path.display());
    Ok(path)
}

/// Runs jobs on short-lived worker threads.
pub struct Dispatcher {
    backend: Arc<dyn Backend>,
    downloads_dir: PathBuf,
    tx: Sender<Completion>,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn Backend>, downloads_dir: PathBuf, tx: Sender<Completion>) -> Self {
        Self {
            backend,
            downloads_dir,
            tx,
        }
    }

    pub fn dispatch(&self, job: Job) {
        log::debug!("dispatching {job:?}");
        let backend = Arc::clone(&self.backend);
        let dir = self.downloads_dir.clone();
        let tx = self.tx.clone();
        let spawned = thread::Builder::new()
            .name("riff-net".to_string())
            .spawn(move || {
                let completion = job.run(backend.as_ref(), &dir);
                // The loop is gone when we are shutting down.
                let _ = tx.send(completion);
            });
        if let Err(e) = spawned {
            log::error!("failed to spawn network worker: {e}");
        }
    }
}
