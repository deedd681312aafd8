use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, SyncSender};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::player::MediaEvent;

use super::sink::{Playback, create_sink_at, fetch_source};
use super::types::{AudioCmd, AudioError, LoadedSource};

/// How often position updates are published while playing.
const TICK: Duration = Duration::from_millis(250);

pub(super) fn spawn_audio_thread(
    http: Client,
    rx: Receiver<AudioCmd>,
    self_tx: Sender<AudioCmd>,
    events: Sender<MediaEvent>,
    ready: SyncSender<Result<(), String>>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => s,
            Err(e) => {
                let _ = ready.send(Err(e.to_string()));
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);
        let _ = ready.send(Ok(()));

        let device = Device {
            stream,
            http,
            self_tx,
        };
        let mut engine = Engine::new(device, events);

        loop {
            match rx.recv_timeout(TICK) {
                Ok(AudioCmd::Quit { fade_out_ms }) => {
                    engine.quit(fade_out_ms);
                    break;
                }
                Ok(cmd) => engine.handle(cmd),
                Err(RecvTimeoutError::Timeout) => engine.tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}

/// Where the engine gets its sinks and source bytes from.
pub(super) trait Output {
    type Sink: Playback;

    /// A paused sink for `source`, starting `start_at` into it.
    fn open_sink(
        &self,
        source: &LoadedSource,
        start_at: Duration,
        volume: f32,
    ) -> Result<Self::Sink, AudioError>;

    /// Fetch `url` in the background and report back with
    /// `AudioCmd::Loaded { generation, .. }`. Stop early once `cancel` is set.
    fn fetch(&self, url: String, generation: u64, cancel: Arc<AtomicBool>);
}

/// The default output device, with sources fetched over HTTP.
struct Device {
    stream: OutputStream,
    http: Client,
    self_tx: Sender<AudioCmd>,
}

impl Output for Device {
    type Sink = Sink;

    fn open_sink(
        &self,
        source: &LoadedSource,
        start_at: Duration,
        volume: f32,
    ) -> Result<Sink, AudioError> {
        create_sink_at(&self.stream, source, start_at, volume)
    }

    fn fetch(&self, url: String, generation: u64, cancel: Arc<AtomicBool>) {
        let http = self.http.clone();
        let tx = self.self_tx.clone();
        let spawned = thread::Builder::new()
            .name("riff-audio-fetch".to_string())
            .spawn(move || {
                let result = match fetch_source(&http, &url, &cancel) {
                    Ok(Some(source)) => Ok(source),
                    Ok(None) => return,
                    Err(e) => Err(e.to_string()),
                };
                let _ = tx.send(AudioCmd::Loaded { generation, result });
            });
        if let Err(e) = spawned {
            let _ = self.self_tx.send(AudioCmd::Loaded {
                generation,
                result: Err(format!("failed to start download: {e}")),
            });
        }
    }
}

/// State owned by the audio thread: one source, one sink.
pub(super) struct Engine<O: Output> {
    output: O,
    events: Sender<MediaEvent>,

    /// Bumped on every load/clear so late loader results can be dropped.
    generation: u64,
    /// Raised to stop the download for the current generation.
    cancel: Option<Arc<AtomicBool>>,
    loading: bool,
    source: Option<LoadedSource>,
    sink: Option<O::Sink>,

    /// A play request arrived while the source was still loading.
    play_when_ready: bool,
    playing: bool,

    // Position = offset + time since `started_at` while playing.
    started_at: Option<Instant>,
    offset: Duration,

    volume: f32,
}

impl<O: Output> Engine<O> {
    pub(super) fn new(output: O, events: Sender<MediaEvent>) -> Self {
        Self {
            output,
            events,
            generation: 0,
            cancel: None,
            loading: false,
            source: None,
            sink: None,
            play_when_ready: false,
            playing: false,
            started_at: None,
            offset: Duration::ZERO,
            volume: 1.0,
        }
    }

    fn emit(&self, event: MediaEvent) {
        let _ = self.events.send(event);
    }

    pub(super) fn handle(&mut self, cmd: AudioCmd) {
        match cmd {
            AudioCmd::Load(url) => self.load(url),
            AudioCmd::Loaded { generation, result } => self.loaded(generation, result),
            AudioCmd::Play => self.play(),
            AudioCmd::Pause => self.pause(),
            AudioCmd::Seek(position) => self.seek(position),
            AudioCmd::SetVolume(volume) => {
                self.volume = volume.clamp(0.0, 1.0);
                if let Some(s) = self.sink.as_ref() {
                    s.set_volume(self.volume);
                }
            }
            AudioCmd::Clear => {
                self.reset();
                self.emit(MediaEvent::Emptied);
            }
            AudioCmd::Quit { fade_out_ms } => self.quit(fade_out_ms),
        }
    }

    fn elapsed(&self) -> Duration {
        self.offset + self.started_at.map_or(Duration::ZERO, |st| st.elapsed())
    }

    fn duration(&self) -> Option<Duration> {
        self.source.as_ref().and_then(|s| s.duration)
    }

    /// Drop the sink and source and invalidate in-flight loads.
    fn reset(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.generation += 1;
        if let Some(cancel) = self.cancel.take() {
            cancel.store(true, Ordering::Relaxed);
        }
        self.loading = false;
        self.source = None;
        self.play_when_ready = false;
        self.playing = false;
        self.started_at = None;
        self.offset = Duration::ZERO;
    }

    fn load(&mut self, url: String) {
        self.reset();
        self.emit(MediaEvent::Emptied);
        self.loading = true;

        let cancel = Arc::new(AtomicBool::new(false));
        self.cancel = Some(Arc::clone(&cancel));
        log::info!("loading audio source {url}");
        self.output.fetch(url, self.generation, cancel);
    }

    fn loaded(&mut self, generation: u64, result: Result<LoadedSource, String>) {
        if generation != self.generation {
            log::debug!("dropping stale audio load #{generation}");
            return;
        }
        self.loading = false;
        self.cancel = None;

        let source = match result {
            Ok(s) => s,
            Err(msg) => {
                log::warn!("audio load failed: {msg}");
                self.play_when_ready = false;
                self.emit(MediaEvent::Error(msg));
                return;
            }
        };

        match self.output.open_sink(&source, Duration::ZERO, self.volume) {
            Ok(sink) => {
                self.sink = Some(sink);
                self.emit(MediaEvent::LoadedMetadata {
                    duration: source.duration,
                });
                self.source = Some(source);
                if std::mem::take(&mut self.play_when_ready) {
                    self.play();
                }
            }
            Err(e) => {
                log::warn!("audio decode failed: {e}");
                self.play_when_ready = false;
                self.emit(MediaEvent::Error(e.to_string()));
            }
        }
    }

    fn play(&mut self) {
        if self.loading {
            self.play_when_ready = true;
            return;
        }
        if self.playing {
            return;
        }

        // Playing after the end restarts from the beginning.
        let finished = self.sink.as_ref().is_some_and(|s| s.empty());
        if finished {
            self.rebuild_sink(Duration::ZERO);
        }

        if let Some(s) = self.sink.as_ref() {
            s.play();
            self.started_at = Some(Instant::now());
            self.playing = true;
            self.emit(MediaEvent::Playing);
        }
    }

    fn pause(&mut self) {
        self.play_when_ready = false;
        if !self.playing {
            return;
        }
        if let Some(s) = self.sink.as_ref() {
            s.pause();
        }
        self.offset = self.elapsed();
        self.started_at = None;
        self.playing = false;
        self.emit(MediaEvent::Paused);
    }

    fn seek(&mut self, position: Duration) {
        if self.source.is_none() {
            return;
        }
        let position = match self.duration() {
            Some(total) => position.min(total),
            None => position,
        };

        // Scrubbing: rebuild the current sink and skip into the stream.
        self.rebuild_sink(position);
        if self.playing {
            if let Some(s) = self.sink.as_ref() {
                s.play();
            }
            self.started_at = Some(Instant::now());
        }
        self.emit(MediaEvent::TimeUpdate {
            position,
            duration: self.duration(),
        });
    }

    fn rebuild_sink(&mut self, start_at: Duration) {
        let Some(source) = self.source.as_ref() else {
            return;
        };
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        match self.output.open_sink(source, start_at, self.volume) {
            Ok(sink) => self.sink = Some(sink),
            Err(e) => {
                log::warn!("failed to rebuild sink: {e}");
                self.playing = false;
                self.emit(MediaEvent::Error(e.to_string()));
            }
        }
        self.offset = start_at;
        self.started_at = None;
    }

    /// Periodic position publishing and end-of-track detection.
    pub(super) fn tick(&mut self) {
        if !self.playing {
            return;
        }
        let ended = self.sink.as_ref().is_none_or(|s| s.empty());
        if ended {
            self.offset = self.duration().unwrap_or_else(|| self.elapsed());
            self.started_at = None;
            self.playing = false;
            self.emit(MediaEvent::TimeUpdate {
                position: self.offset,
                duration: self.duration(),
            });
            self.emit(MediaEvent::Ended);
            return;
        }

        self.emit(MediaEvent::TimeUpdate {
            position: self.elapsed(),
            duration: self.duration(),
        });
    }

    pub(super) fn quit(&mut self, fade_out_ms: u64) {
        if let Some(s) = self.sink.as_ref() {
            if self.playing {
                // Fade out gently before stopping.
                fade_out_sink(s, self.volume, fade_out_ms);
            }
            s.stop();
        }
        if self.playing {
            self.playing = false;
            self.emit(MediaEvent::Paused);
        }
    }
}

fn fade_out_sink(sink: &impl Playback, from: f32, fade_out_ms: u64) {
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(from * (1.0 - t));
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}
