use crate::app::App;
use crate::config;
use crate::library::LocalCache;
use crate::player::{MediaElement, PlaybackController};
use crate::runtime::session::{Session, SessionSettings};

/// Build the session from settings: playback defaults, the local cache and
/// an initial pull of liked and recent tracks from the backend.
pub fn build_session<M: MediaElement>(media: M, settings: &config::Settings) -> Session<M> {
    let cache = LocalCache::new(settings.data_dir());
    let controller =
        PlaybackController::new(media, settings.playback.volume).with_cache(cache);
    log::info!(
        "{} recent and {} liked tracks loaded from cache",
        controller.recent().len(),
        controller.liked().tracks().len()
    );

    let app = App::new(settings.playback.mode);
    let mut session = Session::new(app, controller, SessionSettings::from(settings));
    session.sync_library();
    session
}
