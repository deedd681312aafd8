use std::sync::Mutex;
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::player::{MediaElement, MediaEvent};

use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, AudioError};

/// Handle to the audio thread. This is the media element the playback
/// controller drives; state comes back as `MediaEvent`s on the events channel.
pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    has_source: bool,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    /// Spawn the audio thread and wait until it has an output device.
    pub fn new(http: Client, events: Sender<MediaEvent>) -> Result<Self, AudioError> {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);

        let handle = spawn_audio_thread(http, rx, tx.clone(), events, ready_tx);

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(msg)) => {
                let _ = handle.join();
                return Err(AudioError::NoOutputDevice(msg));
            }
            Err(_) => return Err(AudioError::ThreadGone),
        }

        Ok(Self {
            tx,
            has_source: false,
            join: Mutex::new(Some(handle)),
        })
    }

    fn send(&self, cmd: AudioCmd) -> Result<(), mpsc::SendError<AudioCmd>> {
        self.tx.send(cmd)
    }

    pub fn quit_softly(&self, fade_out: Duration) {
        let _ = self.send(AudioCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl MediaElement for AudioPlayer {
    fn set_source(&mut self, url: &str) {
        self.has_source = true;
        let _ = self.send(AudioCmd::Load(url.to_string()));
    }

    fn play(&mut self) {
        let _ = self.send(AudioCmd::Play);
    }

    fn pause(&mut self) {
        let _ = self.send(AudioCmd::Pause);
    }

    fn seek(&mut self, position_secs: f64) {
        if position_secs.is_finite() {
            let _ = self.send(AudioCmd::Seek(Duration::from_secs_f64(position_secs.max(0.0))));
        }
    }

    fn set_volume(&mut self, volume: f32) {
        let _ = self.send(AudioCmd::SetVolume(volume));
    }

    fn clear(&mut self) {
        self.has_source = false;
        let _ = self.send(AudioCmd::Clear);
    }

    fn has_source(&self) -> bool {
        self.has_source
    }
}
