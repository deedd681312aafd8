use crate::mpris::MprisHandle;
use crate::player::PlaybackState;

/// What was last published, so metadata is only re-sent when it changes.
#[derive(Debug, Default)]
pub struct MprisSync {
    track_id: Option<String>,
    duration: f64,
}

impl MprisSync {
    pub fn update(&mut self, mpris: &MprisHandle, state: &PlaybackState) {
        let track_id = state.current_track.as_ref().map(|t| t.id.clone());
        if track_id != self.track_id || state.duration != self.duration {
            mpris.set_track_metadata(state.current_track.as_ref(), state.duration);
            self.track_id = track_id;
            self.duration = state.duration;
        }
        mpris.sync(state);
    }
}
