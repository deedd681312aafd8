//! Fetching, probing and decoding audio into `rodio` sinks.
//!
//! Sources are downloaded in chunks into memory, then decoded from there.
//! Seeking rebuilds the sink and skips into the decoded stream.

use std::io::{self, Cursor, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use lofty::file::AudioFile;
use lofty::probe::Probe;
use reqwest::blocking::Client;
use rodio::{Decoder, OutputStream, Sink, Source};

use super::types::{AudioError, LoadedSource};

/// Bytes read from the response between checks of the cancel flag.
const CHUNK_SIZE: usize = 64 * 1024;

/// Download `url` and work out its duration. Returns `Ok(None)` when
/// `cancel` was raised before the download finished.
pub(super) fn fetch_source(
    http: &Client,
    url: &str,
    cancel: &AtomicBool,
) -> Result<Option<LoadedSource>, AudioError> {
    let response = http.get(url).send()?.error_for_status()?;
    let expected = response.content_length().unwrap_or(0);
    let Some(bytes) = read_unless_cancelled(response, expected, cancel)? else {
        log::debug!("download of {url} cancelled");
        return Ok(None);
    };
    let data: Arc<[u8]> = Arc::from(bytes);

    // Decoding once up front rejects non-audio payloads (HTML error pages etc.)
    // before the source is reported as loaded.
    let decoder = Decoder::new(Cursor::new(data.clone()))?;
    let duration = probe_duration(&data).or_else(|| decoder.total_duration());

    log::debug!(
        "loaded {} bytes from {url}, duration {:?}",
        data.len(),
        duration
    );
    Ok(Some(LoadedSource { data, duration }))
}

/// Read `reader` to the end, giving up as soon as `cancel` is set.
pub(super) fn read_unless_cancelled<R: Read>(
    mut reader: R,
    size_hint: u64,
    cancel: &AtomicBool,
) -> io::Result<Option<Vec<u8>>> {
    let mut data = Vec::with_capacity(size_hint.min(64 * 1024 * 1024) as usize);
    let mut chunk = vec![0u8; CHUNK_SIZE];
    loop {
        if cancel.load(Ordering::Relaxed) {
            return Ok(None);
        }
        match reader.read(&mut chunk) {
            Ok(0) => return Ok(Some(data)),
            Ok(n) => data.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
}

/// Read the container's declared length. Streams without headers (or with
/// bogus zero lengths) yield `None`.
pub(super) fn probe_duration(data: &Arc<[u8]>) -> Option<Duration> {
    let probe = Probe::new(Cursor::new(data.clone())).guess_file_type().ok()?;
    let tagged = probe.read().ok()?;
    let duration = tagged.properties().duration();
    (!duration.is_zero()).then_some(duration)
}

/// Create a paused `Sink` for `source` that starts playback at `start_at`.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    source: &LoadedSource,
    start_at: Duration,
    volume: f32,
) -> Result<Sink, AudioError> {
    let decoded = Decoder::new(Cursor::new(source.data.clone()))?
        // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
        .skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.set_volume(volume);
    sink.append(decoded);
    sink.pause();
    Ok(sink)
}

/// The parts of a `rodio::Sink` the engine drives.
pub(super) trait Playback {
    fn play(&self);
    fn pause(&self);
    fn stop(&self);
    fn set_volume(&self, volume: f32);
    /// Nothing left to play.
    fn empty(&self) -> bool;
}

impl Playback for Sink {
    fn play(&self) {
        Sink::play(self);
    }

    fn pause(&self) {
        Sink::pause(self);
    }

    fn stop(&self) {
        Sink::stop(self);
    }

    fn set_volume(&self, volume: f32) {
        Sink::set_volume(self, volume);
    }

    fn empty(&self) -> bool {
        Sink::empty(self)
    }
}
