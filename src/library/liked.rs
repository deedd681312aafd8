use std::collections::HashMap;

use super::model::Track;

/// What a like toggle asks the backend to do.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LikeAction {
    Add,
    Remove,
}

/// Identifies one in-flight like/unlike request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeTicket {
    pub seq: u64,
    pub track_id: String,
}

/// Result of settling a pending like request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikeSettlement {
    /// The server confirmed and the local set now reflects it.
    Committed(LikeAction),
    /// The server refused or was unreachable; the local set is unchanged.
    Failed(LikeAction),
    /// No pending request matches the ticket.
    Unknown,
}

#[derive(Debug, Clone)]
struct Pending {
    seq: u64,
    action: LikeAction,
    track: Track,
}

/// Liked tracks keyed by id. Changes go through `begin` and are applied only
/// when `settle` is called with a confirmed outcome.
///
/// `revision` counts changes to the committed contents.
#[derive(Debug, Clone, Default)]
pub struct LikedSet {
    tracks: Vec<Track>,
    pending: HashMap<String, Pending>,
    next_seq: u64,
    revision: u64,
}

impl LikedSet {
    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        let mut set = Self::default();
        for track in tracks {
            if !set.contains(&track.id) {
                set.tracks.push(track);
            }
        }
        set
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tracks.iter().any(|t| t.id == id)
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.contains_key(id)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Start a toggle for `track`. Returns `None` while an earlier toggle for
    /// the same id is still waiting on the server.
    pub fn begin(&mut self, track: &Track) -> Option<(LikeTicket, LikeAction)> {
        if self.is_pending(&track.id) {
            return None;
        }

        let action = if self.contains(&track.id) {
            LikeAction::Remove
        } else {
            LikeAction::Add
        };

        self.next_seq += 1;
        let ticket = LikeTicket {
            seq: self.next_seq,
            track_id: track.id.clone(),
        };
        self.pending.insert(
            track.id.clone(),
            Pending {
                seq: ticket.seq,
                action,
                track: track.clone(),
            },
        );
        Some((ticket, action))
    }

    /// Resolve the pending request identified by `ticket`.
    pub fn settle(&mut self, ticket: &LikeTicket, confirmed: bool) -> LikeSettlement {
        let matches = self
            .pending
            .get(&ticket.track_id)
            .is_some_and(|p| p.seq == ticket.seq);
        if !matches {
            return LikeSettlement::Unknown;
        }
        let Some(pending) = self.pending.remove(&ticket.track_id) else {
            return LikeSettlement::Unknown;
        };

        if !confirmed {
            return LikeSettlement::Failed(pending.action);
        }

        match pending.action {
            LikeAction::Add => {
                if !self.contains(&pending.track.id) {
                    self.tracks.push(pending.track);
                }
            }
            LikeAction::Remove => {
                self.tracks.retain(|t| t.id != pending.track.id);
            }
        }
        self.revision += 1;
        LikeSettlement::Committed(pending.action)
    }

    /// Replace the committed contents with the server's list. Pending
    /// requests stay pending.
    pub fn replace(&mut self, tracks: Vec<Track>) {
        let pending = std::mem::take(&mut self.pending);
        let next_seq = self.next_seq;
        let revision = self.revision;
        *self = Self::from_tracks(tracks);
        self.pending = pending;
        self.next_seq = next_seq;
        self.revision = revision + 1;
    }
}
