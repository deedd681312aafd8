use std::time::Duration;

/// A single media-playback element: one source at a time, transport
/// commands in, `MediaEvent`s out.
///
/// Commands are requests. The element reports what actually happened through
/// events, and callers must not assume a command took effect until then.
pub trait MediaElement {
    /// Replace the source and start loading it. The element reports
    /// `Emptied` before any event about the new source.
    fn set_source(&mut self, url: &str);
    fn play(&mut self);
    fn pause(&mut self);
    /// Jump to an absolute position in seconds.
    fn seek(&mut self, position_secs: f64);
    fn set_volume(&mut self, volume: f32);
    /// Stop and drop the current source.
    fn clear(&mut self);
    /// Whether a source has been assigned and not cleared since.
    fn has_source(&self) -> bool;
}

/// State changes reported by a media element.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    Playing,
    Paused,
    TimeUpdate {
        position: Duration,
        duration: Option<Duration>,
    },
    LoadedMetadata {
        duration: Option<Duration>,
    },
    Ended,
    /// The source was removed or replaced.
    Emptied,
    Error(String),
}
