//! Playback controller: the single owner of player state.
//!
//! `PlaybackController` turns user intent into `MediaElement` commands and
//! folds the element's `MediaEvent`s back into `PlaybackState`. The
//! `progress` helpers project that state onto the progress bar.

mod controller;
mod media;
mod progress;
mod state;

pub use controller::{LikeRequest, LoadOutcome, LoadRequest, LoadTicket, PlaybackController};
pub use media::{MediaElement, MediaEvent};
pub use progress::{ProgressView, format_duration, format_time, progress_percent};
pub use state::{PlaybackState, PlayerStatus, Transport, VolumeLevel};

#[cfg(test)]
pub(crate) mod testing;
