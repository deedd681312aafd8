use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_io::{Timer, block_on};
use zbus::{Connection, interface, object_server::InterfaceRef};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::library::Track;
use crate::player::{PlaybackState, Transport};

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.riff";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    /// Relative seek in microseconds.
    Seek(i64),
}

#[derive(Debug, Default)]
struct SharedState {
    playback: Transport,
    title: Option<String>,
    url: Option<String>,
    length_micros: Option<i64>,
    position_micros: i64,
    track_id: Option<OwnedObjectPath>,
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
    notify: Sender<()>,
}

impl MprisHandle {
    pub fn set_playback(&self, playback: Transport) {
        let changed = match self.state.lock() {
            Ok(mut s) => {
                let changed = s.playback != playback;
                s.playback = playback;
                changed
            }
            Err(_) => false,
        };
        if changed {
            let _ = self.notify.send(());
        }
    }

    /// Publish `track` (or clear it) with its length in seconds.
    pub fn set_track_metadata(&self, track: Option<&Track>, length_secs: f64) {
        if let Ok(mut s) = self.state.lock() {
            s.title = track.map(|t| t.title.clone());
            s.url = track.map(|t| t.url.clone());
            s.length_micros = (length_secs > 0.0 && length_secs.is_finite())
                .then(|| (length_secs * 1_000_000.0) as i64);
            s.track_id = track.and_then(|t| track_path(&t.id));
        }
        let _ = self.notify.send(());
    }

    /// Position is polled by clients, so it never triggers a signal.
    pub fn set_position(&self, secs: f64) {
        if let Ok(mut s) = self.state.lock() {
            s.position_micros = if secs.is_finite() && secs > 0.0 {
                (secs * 1_000_000.0) as i64
            } else {
                0
            };
        }
    }

    /// Mirror the whole playback state.
    pub fn sync(&self, state: &PlaybackState) {
        self.set_playback(state.transport());
        self.set_position(state.current_time);
    }
}

/// D-Bus object path for a backend track id. Path elements only allow
/// `[A-Za-z0-9_]`.
fn track_path(id: &str) -> Option<OwnedObjectPath> {
    let element: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if element.is_empty() {
        return None;
    }
    ObjectPath::try_from(format!("{OBJECT_PATH}/track/{element}"))
        .ok()
        .map(OwnedObjectPath::from)
}

fn owned(value: Value<'_>) -> Option<OwnedValue> {
    OwnedValue::try_from(value).ok()
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for TUI.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "riff"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec![]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {}

    fn previous(&self) {}

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    fn seek(&self, offset: i64) {
        let _ = self.tx.send(ControlCmd::Seek(offset));
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.playback {
            Transport::Stopped => "Stopped",
            Transport::Playing => "Playing",
            Transport::Paused => "Paused",
        }
    }

    #[zbus(property)]
    fn position(&self) -> i64 {
        self.state.lock().map(|s| s.position_micros).unwrap_or(0)
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        if let Some(v) = s
            .track_id
            .clone()
            .and_then(|p| owned(Value::ObjectPath(p.into_inner())))
        {
            map.insert("mpris:trackid".to_string(), v);
        }
        if let Some(v) = owned(Value::from(s.title.clone().unwrap_or_default())) {
            map.insert("xesam:title".to_string(), v);
        }
        if let Some(v) = s.url.clone().and_then(|u| owned(Value::from(u))) {
            map.insert("xesam:url".to_string(), v);
        }
        if let Some(v) = s.length_micros.and_then(|l| owned(Value::from(l))) {
            map.insert("mpris:length".to_string(), v);
        }
        map
    }
}

pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel::<()>();

    let state_for_thread = state.clone();
    let spawned = std::thread::Builder::new()
        .name("riff-mpris".to_string())
        .spawn(move || {
            block_on(async move {
                if let Err(e) = serve(tx, state_for_thread, notify_rx).await {
                    log::warn!("MPRIS unavailable: {e}");
                }
            });
        });
    if let Err(e) = spawned {
        log::warn!("MPRIS: failed to spawn thread: {e}");
    }

    MprisHandle {
        state,
        notify: notify_tx,
    }
}

async fn serve(
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
    notify_rx: Receiver<()>,
) -> zbus::Result<()> {
    let connection = Connection::session().await?;
    connection.request_name(BUS_NAME).await?;

    let object_server = connection.object_server();
    object_server
        .at(OBJECT_PATH, RootIface { tx: tx.clone() })
        .await?;
    object_server
        .at(OBJECT_PATH, PlayerIface { tx, state })
        .await?;
    let player: InterfaceRef<PlayerIface> = object_server.interface(OBJECT_PATH).await?;
    log::info!("MPRIS registered as {BUS_NAME}");

    loop {
        Timer::after(Duration::from_millis(200)).await;

        let mut changed = false;
        loop {
            match notify_rx.try_recv() {
                Ok(()) => changed = true,
                Err(mpsc::TryRecvError::Empty) => break,
                // The app has shut down.
                Err(mpsc::TryRecvError::Disconnected) => return Ok(()),
            }
        }

        if changed {
            let iface = player.get().await;
            let emitter = player.signal_emitter();
            if let Err(e) = iface.playback_status_changed(emitter).await {
                log::debug!("MPRIS: PlaybackStatus signal failed: {e}");
            }
            if let Err(e) = iface.metadata_changed(emitter).await {
                log::debug!("MPRIS: Metadata signal failed: {e}");
            }
        }
    }
}
