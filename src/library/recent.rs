use super::model::Track;

/// Maximum number of tracks kept in the recently-played list.
pub const RECENT_LIMIT: usize = 20;

/// Recently played tracks, most recent first, unique by id.
///
/// `revision` moves forward on every change, so a caller can tell whether
/// the list was touched since it last looked.
#[derive(Debug, Clone, Default)]
pub struct RecentList {
    tracks: Vec<Track>,
    revision: u64,
}

impl RecentList {
    /// Build from a persisted list, re-applying dedup and the cap in case the
    /// file was edited by hand.
    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        let mut list = Self::default();
        for track in tracks.into_iter().rev() {
            list.push(track);
        }
        list
    }

    /// Move `track` to the front, dropping any older entry with the same id.
    pub fn push(&mut self, track: Track) {
        self.tracks.retain(|t| !t.same_as(&track));
        self.tracks.insert(0, track);
        self.tracks.truncate(RECENT_LIMIT);
        self.revision += 1;
    }

    /// Swap in another list wholesale, keeping the revision moving forward.
    pub fn replace(&mut self, tracks: Vec<Track>) {
        let revision = self.revision;
        *self = Self::from_tracks(tracks);
        self.revision = revision + 1;
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
