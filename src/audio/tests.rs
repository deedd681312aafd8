use std::cell::RefCell;
use std::io::{self, Cursor, Read};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use crate::player::MediaEvent;

use super::sink::{Playback, probe_duration, read_unless_cancelled};
use super::thread::{Engine, Output};
use super::types::{AudioCmd, AudioError, LoadedSource};

/// A silent 16-bit mono PCM WAV of the given length.
fn wav(sample_rate: u32, seconds: u32) -> Vec<u8> {
    let data_len = sample_rate * seconds * 2;
    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&1u16.to_le_bytes()); // mono
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.resize(44 + data_len as usize, 0);
    out
}

#[test]
fn probe_duration_reads_wav_length() {
    let data: Arc<[u8]> = Arc::from(wav(8000, 2));
    let d = probe_duration(&data).expect("wav should have a duration");
    assert!(
        d > Duration::from_millis(1900) && d < Duration::from_millis(2100),
        "unexpected duration {d:?}"
    );
}

#[test]
fn probe_duration_of_garbage_is_none() {
    let data: Arc<[u8]> = Arc::from(&b"<html>not audio</html>"[..]);
    assert_eq!(probe_duration(&data), None);
}

/// What the fake output has been asked to do.
#[derive(Default)]
struct Rig {
    opened: Vec<Duration>,
    fetches: Vec<(String, u64, Arc<AtomicBool>)>,
    playing: bool,
    drained: bool,
}

struct FakeOutput(Rc<RefCell<Rig>>);
struct FakeSink(Rc<RefCell<Rig>>);

impl Playback for FakeSink {
    fn play(&self) {
        self.0.borrow_mut().playing = true;
    }

    fn pause(&self) {
        self.0.borrow_mut().playing = false;
    }

    fn stop(&self) {
        self.0.borrow_mut().playing = false;
    }

    fn set_volume(&self, _volume: f32) {}

    fn empty(&self) -> bool {
        self.0.borrow().drained
    }
}

impl Output for FakeOutput {
    type Sink = FakeSink;

    fn open_sink(
        &self,
        _source: &LoadedSource,
        start_at: Duration,
        _volume: f32,
    ) -> Result<FakeSink, AudioError> {
        let mut rig = self.0.borrow_mut();
        rig.opened.push(start_at);
        rig.drained = false;
        Ok(FakeSink(Rc::clone(&self.0)))
    }

    fn fetch(&self, url: String, generation: u64, cancel: Arc<AtomicBool>) {
        self.0.borrow_mut().fetches.push((url, generation, cancel));
    }
}

fn engine() -> (Engine<FakeOutput>, Rc<RefCell<Rig>>, Receiver<MediaEvent>) {
    let rig = Rc::new(RefCell::new(Rig::default()));
    let (tx, rx) = mpsc::channel();
    (Engine::new(FakeOutput(Rc::clone(&rig)), tx), rig, rx)
}

fn two_seconds() -> LoadedSource {
    LoadedSource {
        data: Arc::from(wav(8000, 2)),
        duration: Some(Duration::from_secs(2)),
    }
}

fn events(rx: &Receiver<MediaEvent>) -> Vec<MediaEvent> {
    rx.try_iter().collect()
}

fn generation_of(rig: &Rc<RefCell<Rig>>, index: usize) -> u64 {
    rig.borrow().fetches[index].1
}

#[test]
fn superseded_load_is_cancelled_and_its_result_dropped() {
    let (mut engine, rig, rx) = engine();

    engine.handle(AudioCmd::Load("http://cdn/a".to_string()));
    engine.handle(AudioCmd::Load("http://cdn/b".to_string()));
    {
        let rig = rig.borrow();
        assert!(rig.fetches[0].2.load(Ordering::Relaxed));
        assert!(!rig.fetches[1].2.load(Ordering::Relaxed));
    }
    events(&rx);

    let first = generation_of(&rig, 0);
    engine.handle(AudioCmd::Loaded {
        generation: first,
        result: Ok(two_seconds()),
    });
    assert!(events(&rx).is_empty());
    assert!(rig.borrow().opened.is_empty());

    let second = generation_of(&rig, 1);
    engine.handle(AudioCmd::Loaded {
        generation: second,
        result: Ok(two_seconds()),
    });
    assert_eq!(
        events(&rx),
        vec![MediaEvent::LoadedMetadata {
            duration: Some(Duration::from_secs(2))
        }]
    );
}

#[test]
fn clear_cancels_the_download_in_flight() {
    let (mut engine, rig, rx) = engine();
    engine.handle(AudioCmd::Load("http://cdn/a".to_string()));
    engine.handle(AudioCmd::Clear);

    assert!(rig.borrow().fetches[0].2.load(Ordering::Relaxed));
    assert_eq!(events(&rx), vec![MediaEvent::Emptied, MediaEvent::Emptied]);
}

#[test]
fn play_during_load_waits_for_the_source() {
    let (mut engine, rig, rx) = engine();
    engine.handle(AudioCmd::Load("http://cdn/a".to_string()));
    engine.handle(AudioCmd::Play);

    assert_eq!(events(&rx), vec![MediaEvent::Emptied]);
    assert!(!rig.borrow().playing);

    let generation = generation_of(&rig, 0);
    engine.handle(AudioCmd::Loaded {
        generation,
        result: Ok(two_seconds()),
    });

    assert_eq!(
        events(&rx),
        vec![
            MediaEvent::LoadedMetadata {
                duration: Some(Duration::from_secs(2))
            },
            MediaEvent::Playing,
        ]
    );
    assert!(rig.borrow().playing);
}

#[test]
fn failed_load_reports_an_error_and_drops_the_pending_play() {
    let (mut engine, rig, rx) = engine();
    engine.handle(AudioCmd::Load("http://cdn/a".to_string()));
    engine.handle(AudioCmd::Play);
    events(&rx);

    let generation = generation_of(&rig, 0);
    engine.handle(AudioCmd::Loaded {
        generation,
        result: Err("HTTP status 404".to_string()),
    });

    assert_eq!(
        events(&rx),
        vec![MediaEvent::Error("HTTP status 404".to_string())]
    );
    assert!(!rig.borrow().playing);
}

/// Load the two-second source and start it.
fn started() -> (Engine<FakeOutput>, Rc<RefCell<Rig>>, Receiver<MediaEvent>) {
    let (mut engine, rig, rx) = engine();
    engine.handle(AudioCmd::Load("http://cdn/a".to_string()));
    let generation = generation_of(&rig, 0);
    engine.handle(AudioCmd::Loaded {
        generation,
        result: Ok(two_seconds()),
    });
    engine.handle(AudioCmd::Play);
    events(&rx);
    (engine, rig, rx)
}

#[test]
fn drained_sink_is_reported_as_ended_at_full_length() {
    let (mut engine, rig, rx) = started();
    rig.borrow_mut().drained = true;

    engine.tick();

    assert_eq!(
        events(&rx),
        vec![
            MediaEvent::TimeUpdate {
                position: Duration::from_secs(2),
                duration: Some(Duration::from_secs(2)),
            },
            MediaEvent::Ended,
        ]
    );

    // Nothing more once stopped.
    engine.tick();
    assert!(events(&rx).is_empty());
}

#[test]
fn play_after_the_end_restarts_from_the_top() {
    let (mut engine, rig, rx) = started();
    rig.borrow_mut().drained = true;
    engine.tick();
    events(&rx);

    engine.handle(AudioCmd::Play);

    assert_eq!(events(&rx), vec![MediaEvent::Playing]);
    assert_eq!(rig.borrow().opened, vec![Duration::ZERO, Duration::ZERO]);
    assert!(rig.borrow().playing);
}

#[test]
fn pause_then_seek_rebuilds_without_playing() {
    let (mut engine, rig, rx) = started();
    engine.handle(AudioCmd::Pause);
    engine.handle(AudioCmd::Seek(Duration::from_secs(5)));

    assert_eq!(
        events(&rx),
        vec![
            MediaEvent::Paused,
            MediaEvent::TimeUpdate {
                position: Duration::from_secs(2),
                duration: Some(Duration::from_secs(2)),
            },
        ]
    );
    assert_eq!(
        rig.borrow().opened,
        vec![Duration::ZERO, Duration::from_secs(2)]
    );
    assert!(!rig.borrow().playing);
}

/// Hands out one byte per read and raises `cancel` on the first one.
struct CancelAfterFirstRead<'a> {
    inner: Cursor<Vec<u8>>,
    cancel: &'a AtomicBool,
    reads: usize,
}

impl Read for CancelAfterFirstRead<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;
        self.cancel.store(true, Ordering::Relaxed);
        let n = buf.len().min(1);
        self.inner.read(&mut buf[..n])
    }
}

#[test]
fn download_stops_once_cancelled() {
    let cancel = AtomicBool::new(false);
    let mut reader = CancelAfterFirstRead {
        inner: Cursor::new(vec![7u8; 1024]),
        cancel: &cancel,
        reads: 0,
    };

    let out = read_unless_cancelled(&mut reader, 1024, &cancel).unwrap();

    assert_eq!(out, None);
    assert_eq!(reader.reads, 1);
}

#[test]
fn download_reads_to_the_end_when_left_alone() {
    let cancel = AtomicBool::new(false);
    let body = wav(8000, 1);
    let out = read_unless_cancelled(Cursor::new(body.clone()), 0, &cancel).unwrap();
    assert_eq!(out, Some(body));
}
