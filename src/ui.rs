//! UI rendering helpers for the terminal user interface.
//!
//! This module renders the view models from `app` using `ratatui`. It reads
//! state and never changes it; `draw` reports where interactive widgets
//! landed so the event loop can hit-test mouse clicks.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::{
    App, Entry, InputMode, ListView, NotificationKind, PLAYLIST_NAME_MAX, PlayerView, View,
};
use crate::config::{ControlsSettings, UiSettings};
use crate::player::{Transport, VolumeLevel};

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("gg/G".to_string(), "top/bottom".to_string());
    map.insert("enter".to_string(), "play/open".to_string());
    map.insert("space/p".to_string(), "play/pause".to_string());
    // H/L is filled dynamically from config.
    map.insert("0-9".to_string(), "jump".to_string());
    map.insert("+/-".to_string(), "volume".to_string());
    map.insert("M".to_string(), "mute".to_string());
    map.insert("f".to_string(), "like".to_string());
    map.insert("m".to_string(), "stream/download".to_string());
    map.insert("d".to_string(), "download".to_string());
    map.insert("/".to_string(), "search".to_string());
    map.insert("tab".to_string(), "views".to_string());
    map.insert("n".to_string(), "new playlist".to_string());
    map.insert("r".to_string(), "refresh".to_string());
    map.insert("esc".to_string(), "close player".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "j/k", "enter", "space/p", "H/L", "0-9", "+/-", "M", "f", "/", "tab", "m", "d", "n",
        "r", "gg/G", "esc", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{}s", scrub_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Screen regions the event loop needs after a frame is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiAreas {
    /// The progress bar, when the player panel is visible.
    pub progress: Option<Rect>,
}

impl UiAreas {
    /// Fraction of the track under column `x`, if `(x, y)` hits the progress bar.
    pub fn progress_fraction(&self, x: u16, y: u16) -> Option<f64> {
        let area = self.progress?;
        let inside = x >= area.x
            && x < area.x + area.width
            && y >= area.y
            && y < area.y + area.height;
        if !inside || area.width == 0 {
            return None;
        }
        Some(f64::from(x - area.x) / f64::from(area.width))
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    // Keep the popup smaller and avoid covering the entire UI.
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(3);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn tabs_line(current: View) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, tab) in View::TABS.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        let active = match current {
            View::Playlist(_) => *tab == View::Library,
            v => v == *tab,
        };
        let style = if active {
            Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(tab.title(), style));
    }
    Line::from(spans)
}

fn entry_item(entry: &Entry) -> ListItem<'_> {
    match entry {
        Entry::QuickPick { label, query } => ListItem::new(Line::from(vec![
            Span::styled("◆ ", Style::default().fg(Color::Magenta)),
            Span::raw(*label),
            Span::styled(format!("  {query}"), Style::default().fg(Color::DarkGray)),
        ])),
        Entry::Track(card) => {
            let marker = if card.now_playing { "♪ " } else { "  " };
            let heart = if card.liked { " ♥" } else { "" };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Green)),
                Span::raw(card.track.title.as_str()),
                Span::styled(heart, Style::default().fg(Color::Red)),
                Span::styled(
                    format!("  {}", card.duration),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        }
        Entry::Playlist(card) => ListItem::new(Line::from(vec![
            Span::raw("▤ "),
            Span::raw(card.name.as_str()),
            Span::styled(format!("  {}", card.songs), Style::default().fg(Color::DarkGray)),
        ])),
    }
}

fn draw_list(frame: &mut Frame, area: Rect, list: &ListView, selected: usize) {
    let mut title = format!(" {} ", list.title);
    if let Some(sub) = &list.subtitle {
        title.push_str(&format!("· {sub} "));
    }
    let block = Block::default().borders(Borders::ALL).title(title);

    if list.loading && list.is_empty() {
        let p = Paragraph::new("Loading...")
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(p, area);
        return;
    }
    if let Some(empty) = &list.empty {
        let p = Paragraph::new(empty.message.as_str())
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(p, area);
        return;
    }

    let items: Vec<ListItem> = list.entries.iter().map(entry_item).collect();
    let widget = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !list.is_empty() {
        state.select(Some(selected.min(list.len() - 1)));
    }
    frame.render_stateful_widget(widget, area, &mut state);
}

/// Draw the now-playing panel; returns the progress bar's area.
fn draw_player(frame: &mut Frame, area: Rect, player: &PlayerView) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" now playing ")
        .padding(Padding {
            left: 1,
            right: 1,
            top: 0,
            bottom: 0,
        });
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let icon = match player.transport {
        Transport::Playing => "▶",
        Transport::Paused => "⏸",
        Transport::Stopped => "■",
    };
    let heart = if player.liked { "♥" } else { "♡" };
    let title = Line::from(vec![
        Span::raw(format!("{icon} ")),
        Span::styled(player.title.as_str(), Style::default().bold()),
        Span::styled(format!("  {heart}"), Style::default().fg(Color::Red)),
    ]);
    frame.render_widget(Paragraph::new(title), rows[0]);

    let volume_icon = match player.volume_level {
        VolumeLevel::Muted => "🔇",
        VolumeLevel::Low => "🔉",
        VolumeLevel::High => "🔊",
    };
    let info = format!(
        "{}  ·  mode: {}  ·  {volume_icon} {}%",
        player.status, player.mode, player.volume_percent
    );
    frame.render_widget(
        Paragraph::new(info).style(Style::default().fg(Color::DarkGray)),
        rows[1],
    );

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(player.progress.ratio().clamp(0.0, 1.0))
        .label(format!(
            "{} / {}",
            player.progress.elapsed, player.progress.total
        ));
    frame.render_widget(gauge, rows[2]);
    rows[2]
}

fn draw_input(frame: &mut Frame, area: Rect, app: &App) {
    let title = match app.input_mode {
        InputMode::Search => " search (enter to submit, esc to cancel) ".to_string(),
        InputMode::PlaylistName => format!(
            " new playlist ({}/{PLAYLIST_NAME_MAX}) ",
            app.input.chars().count()
        ),
        InputMode::Normal => return,
    };
    let popup = centered_rect_sized(60, 3, area);
    frame.render_widget(Clear, popup);
    let p = Paragraph::new(format!("{}▏", app.input))
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(p, popup);
}

fn draw_notification(frame: &mut Frame, area: Rect, app: &App) {
    let Some(n) = &app.notification else {
        return;
    };
    let color = match n.kind {
        NotificationKind::Info => Color::Cyan,
        NotificationKind::Success => Color::Green,
        NotificationKind::Error => Color::Red,
    };
    let width = (n.message.chars().count() as u16 + 4).min(area.width);
    let rect = Rect {
        x: area.x + area.width.saturating_sub(width),
        y: area.y,
        width,
        height: 3.min(area.height),
    };
    frame.render_widget(Clear, rect);
    let p = Paragraph::new(n.message.as_str())
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(p, rect);
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    list: &ListView,
    player: Option<&PlayerView>,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) -> UiAreas {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(3),
            Constraint::Length(if player.is_some() { 5 } else { 0 }),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(vec![
        Line::from(ui_settings.header_text.as_str()).alignment(Alignment::Center),
        tabs_line(app.view).alignment(Alignment::Center),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" riff ")
            .title_alignment(Alignment::Center),
    );
    frame.render_widget(header, chunks[0]);

    draw_list(frame, chunks[1], list, app.selected);

    let mut areas = UiAreas::default();
    if let Some(player) = player {
        areas.progress = Some(draw_player(frame, chunks[2], player));
    }

    let footer = Paragraph::new(controls_text(controls_settings.scrub_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);

    draw_input(frame, chunks[1], app);
    draw_notification(frame, frame.area(), app);

    areas
}
