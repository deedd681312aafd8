//! The audio thread: a single `rodio` sink driven by commands.
//!
//! `AudioPlayer` is the handle the rest of the app holds. It implements
//! `MediaElement`, and the thread reports playback state back as
//! `MediaEvent`s.

mod player;
mod sink;
mod thread;
mod types;

pub use player::AudioPlayer;
pub use types::AudioError;

#[cfg(test)]
mod tests;
