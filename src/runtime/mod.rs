use std::sync::{Arc, mpsc};
use std::time::Duration;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::api::ApiClient;
use crate::audio::AudioPlayer;
use crate::logging;
use crate::mpris::ControlCmd;
use crate::player::MediaEvent;

mod event_loop;
mod jobs;
mod mpris_sync;
mod session;
mod settings;
mod startup;

#[cfg(test)]
mod tests;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_problem) = settings::load_settings();

    let log_file = settings.log_file();
    if let Err(e) = logging::init(&settings.logging.level, &log_file) {
        eprintln!("riff: cannot open log file {}: {e}", log_file.display());
    }
    if let Some(problem) = config_problem {
        log::warn!("{problem}");
    }
    log::info!("riff {} starting, backend {}", env!("CARGO_PKG_VERSION"), settings.server.base_url);

    let api = ApiClient::new(&settings.server)?;

    // Whole tracks are fetched in one request; only bound the connect.
    let audio_http = reqwest::blocking::Client::builder()
        .connect_timeout(Duration::from_secs(settings.server.timeout_secs.max(1)))
        .timeout(None)
        .build()?;

    let (media_tx, media_rx) = mpsc::channel::<MediaEvent>();
    let audio_player = match AudioPlayer::new(audio_http, media_tx) {
        Ok(p) => p,
        Err(e) => {
            log::error!("audio unavailable: {e}");
            return Err(e.into());
        }
    };

    let (completion_tx, completion_rx) = mpsc::channel::<jobs::Completion>();
    let dispatcher = jobs::Dispatcher::new(Arc::new(api), settings.downloads_dir(), completion_tx);

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);

    let mut session = startup::build_session(audio_player, &settings);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::default();
        event_loop::run(
            &mut terminal,
            &settings,
            &mut session,
            &dispatcher,
            &mpris,
            event_loop::Inputs {
                media: &media_rx,
                completions: &completion_rx,
                control: &control_rx,
            },
            &mut state,
        )
    })();

    session
        .controller
        .media()
        .quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(e) = &run_result {
        log::error!("event loop failed: {e}");
    }
    log::info!("riff exiting");
    run_result
}
