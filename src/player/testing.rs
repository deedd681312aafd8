use super::MediaElement;

/// One command received by `FakeMedia`.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCall {
    SetSource(String),
    Play,
    Pause,
    Seek(f64),
    SetVolume(f32),
    Clear,
}

/// Records every command and never emits events on its own; tests feed
/// `MediaEvent`s to the controller by hand.
#[derive(Debug, Default)]
pub struct FakeMedia {
    pub calls: Vec<MediaCall>,
    pub source: Option<String>,
}

impl FakeMedia {
    pub fn seeks(&self) -> Vec<f64> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                MediaCall::Seek(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: &MediaCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }
}

impl MediaElement for FakeMedia {
    fn set_source(&mut self, url: &str) {
        self.source = Some(url.to_string());
        self.calls.push(MediaCall::SetSource(url.to_string()));
    }

    fn play(&mut self) {
        self.calls.push(MediaCall::Play);
    }

    fn pause(&mut self) {
        self.calls.push(MediaCall::Pause);
    }

    fn seek(&mut self, position_secs: f64) {
        self.calls.push(MediaCall::Seek(position_secs));
    }

    fn set_volume(&mut self, volume: f32) {
        self.calls.push(MediaCall::SetVolume(volume));
    }

    fn clear(&mut self) {
        self.source = None;
        self.calls.push(MediaCall::Clear);
    }

    fn has_source(&self) -> bool {
        self.source.is_some()
    }
}
