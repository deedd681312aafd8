use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{InputMode, PlayerView};
use crate::audio::AudioPlayer;
use crate::config;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::player::MediaEvent;
use crate::runtime::jobs::{Completion, Dispatcher};
use crate::runtime::mpris_sync::MprisSync;
use crate::runtime::session::Session;
use crate::ui::{self, UiAreas};

/// State tracked by the runtime event loop across iterations.
#[derive(Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    /// Where the last frame put the progress bar.
    pub areas: UiAreas,
    pub mpris: MprisSync,
}

/// Channels feeding the loop from other threads.
pub struct Inputs<'a> {
    pub media: &'a Receiver<MediaEvent>,
    pub completions: &'a Receiver<Completion>,
    pub control: &'a Receiver<ControlCmd>,
}

/// Main terminal event loop: handles input, UI drawing, media events,
/// backend completions and MPRIS. Returns `Ok(())` when shutdown is
/// requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    session: &mut Session<AudioPlayer>,
    dispatcher: &Dispatcher,
    mpris: &MprisHandle,
    inputs: Inputs<'_>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        while let Ok(ev) = inputs.media.try_recv() {
            session.media_event(ev);
        }
        while let Ok(done) = inputs.completions.try_recv() {
            session.complete(done);
        }
        while let Ok(cmd) = inputs.control.try_recv() {
            if session.control(cmd) {
                return Ok(());
            }
        }

        session.tick(Instant::now());
        for job in session.take_jobs() {
            dispatcher.dispatch(job);
        }
        state.mpris.update(mpris, session.controller.state());

        let list = session.list_view();
        let player = PlayerView::build(&session.controller, session.app.mode);
        let mut areas = state.areas;
        terminal.draw(|f| {
            areas = ui::draw(
                f,
                &session.app,
                &list,
                player.as_ref(),
                &settings.ui,
                &settings.controls,
            );
        })?;
        state.areas = areas;

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_key_event(key, session, state) {
                        break;
                    }
                }
                Event::Mouse(mouse) => handle_mouse_event(mouse, session, state),
                _ => {}
            }
        }
    }

    Ok(())
}

fn handle_mouse_event(
    mouse: MouseEvent,
    session: &mut Session<AudioPlayer>,
    state: &EventLoopState,
) {
    if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
        if let Some(fraction) = state.areas.progress_fraction(mouse.column, mouse.row) {
            session.seek_fraction(fraction);
        }
    }
}

/// Returns true when the user asked to quit.
fn handle_key_event(
    key: KeyEvent,
    session: &mut Session<AudioPlayer>,
    state: &mut EventLoopState,
) -> bool {
    if session.app.input_mode != InputMode::Normal {
        state.pending_gg = false;
        match key.code {
            KeyCode::Esc => session.app.cancel_input(),
            KeyCode::Enter => session.submit_input(),
            KeyCode::Backspace => session.app.pop_input_char(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                session.app.push_input_char(c);
            }
            _ => {}
        }
        return false;
    }

    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('k') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            session.begin_search();
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
        KeyCode::Char('/') => session.begin_search(),
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                session.move_top();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => session.move_bottom(),
        KeyCode::Char('j') | KeyCode::Down => session.move_down(),
        KeyCode::Char('k') | KeyCode::Up => session.move_up(),
        KeyCode::Enter => session.activate(),
        KeyCode::Char('p') | KeyCode::Char(' ') => session.toggle_play_pause(),
        KeyCode::Esc => session.close_player(),
        KeyCode::Char('L') | KeyCode::Right => session.scrub(true),
        KeyCode::Char('H') | KeyCode::Left => session.scrub(false),
        KeyCode::Char(c @ '0'..='9') => session.seek_tenth(c.to_digit(10).unwrap_or(0)),
        KeyCode::Char('+') | KeyCode::Char('=') => session.volume_up(),
        KeyCode::Char('-') => session.volume_down(),
        KeyCode::Char('M') => session.toggle_mute(),
        KeyCode::Char('f') => session.toggle_like(),
        KeyCode::Char('m') => session.toggle_mode(),
        KeyCode::Char('d') => session.download(),
        KeyCode::Char('n') => session.begin_new_playlist(),
        KeyCode::Char('r') => session.refresh(),
        KeyCode::Tab => session.next_view(),
        KeyCode::BackTab => session.prev_view(),
        _ => {}
    }

    false
}
