//! Local JSON mirror of the recent and liked lists.
//!
//! The files let the UI render immediately at startup, before (or without)
//! a round-trip to the backend.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::model::Track;

const RECENT_FILE: &str = "recent_tracks.json";
const LIKED_FILE: &str = "liked_tracks.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cache file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct LocalCache {
    dir: PathBuf,
}

impl LocalCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load_recent(&self) -> Result<Vec<Track>, StoreError> {
        self.read(RECENT_FILE)
    }

    pub fn save_recent(&self, tracks: &[Track]) -> Result<(), StoreError> {
        self.write(RECENT_FILE, tracks)
    }

    pub fn load_liked(&self) -> Result<Vec<Track>, StoreError> {
        self.read(LIKED_FILE)
    }

    pub fn save_liked(&self, tracks: &[Track]) -> Result<(), StoreError> {
        self.write(LIKED_FILE, tracks)
    }

    /// A missing file is an empty list.
    fn read(&self, name: &str) -> Result<Vec<Track>, StoreError> {
        let path = self.dir.join(name);
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Json { path, source })
    }

    fn write(&self, name: &str, tracks: &[Track]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.dir.join(name);
        let json = serde_json::to_vec_pretty(tracks).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;

        // Write-then-rename so a crash never leaves a truncated cache behind.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StoreError::Io { path, source })
    }
}
