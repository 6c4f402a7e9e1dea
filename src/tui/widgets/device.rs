//! Device layout: the screen with its status bar above the click wheel.

use crate::app::state::{AppState, ToastKind};
use crate::nav::Screen;
use crate::player::controller::PlaybackStatus;
use crate::tui::theme::{Theme, get_theme};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Flex, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::{menu_list, now_playing, screens, truncate_str, wheel};

/// Widest the device gets, in columns.
const DEVICE_WIDTH: u16 = 44;
/// Rows given to the wheel.
const WHEEL_HEIGHT: u16 = 13;

/// ┌────────────────────────┐
/// │ ▶      Music       ▮80%│  status bar
/// │ Cover Flow            ›│
/// │ All Songs             ›│  screen
/// │ Add Music             ›│
/// └────────────────────────┘
///           MENU
///     |◀◀   (    )   ▶▶|        wheel
///           ▶ ❚❚
pub fn render(frame: &mut Frame, state: &mut AppState) {
    let theme = get_theme(state.theme);
    let root = frame.area();
    state.hits.rows.clear();
    state.hits.wheel = None;

    frame.render_widget(
        Block::default().style(Style::default().bg(theme.palette.body)),
        root,
    );

    let [device] = Layout::horizontal([Constraint::Length(DEVICE_WIDTH.min(root.width))])
        .flex(Flex::Center)
        .areas(root);

    let wheel_height = WHEEL_HEIGHT.min(device.height / 2);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),               // Screen
            Constraint::Length(wheel_height), // Wheel
        ])
        .split(device);

    render_screen(frame, state, &theme, rows[0]);
    wheel::render(frame, state, &theme, rows[1]);
}

fn render_screen(frame: &mut Frame, state: &mut AppState, theme: &Theme, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border))
        .style(
            Style::default()
                .bg(theme.palette.screen_bg)
                .fg(theme.palette.screen_fg),
        );
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    render_status_bar(frame, state, theme, rows[0]);

    let content = rows[1];
    if state.current_menu().is_some() {
        menu_list::render(frame, state, theme, content);
    } else {
        match state.nav.current() {
            Screen::NowPlaying | Screen::VideoPlayer => {
                now_playing::render(frame, state, theme, content)
            }
            Screen::CoverFlow => screens::render_cover_flow(frame, state, theme, content),
            Screen::PhotoViewer => screens::render_photo_viewer(frame, state, theme, content),
            Screen::ShufflePlay => screens::render_shuffle(frame, state, theme, content),
            Screen::BrickBreaker | Screen::Snake => {
                screens::render_game(frame, state, theme, content)
            }
            Screen::J2meRunner => screens::render_runner(frame, state, theme, content),
            Screen::About => screens::render_about(frame, state, theme, content),
            s if s.is_form() => screens::render_form(frame, state, theme, content),
            _ => {}
        }
    }

    render_toast(frame, state, theme, content);
}

fn render_status_bar(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    let icons = &theme.icons;
    let style = Style::default()
        .bg(theme.palette.status_bg)
        .fg(theme.palette.status_fg);
    frame.render_widget(Block::default().style(style), area);

    let indicator = match state.playback.status() {
        PlaybackStatus::Playing => icons.play,
        PlaybackStatus::Paused => icons.pause,
        PlaybackStatus::Loading => "…",
        PlaybackStatus::Failed(_) => icons.error,
        PlaybackStatus::Idle => "",
    };
    let battery = match state.battery {
        Some(b) if b.charging => format!("{}{}%", icons.charging, b.percent),
        Some(b) => format!("{}{}%", icons.battery, b.percent),
        None => String::new(),
    };

    let side = 6u16.min(area.width / 3);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(side),
            Constraint::Min(1),
            Constraint::Length(side),
        ])
        .split(area);

    frame.render_widget(Paragraph::new(format!(" {indicator}")).style(style), cols[0]);
    let title = truncate_str(&state.status_title(), cols[1].width as usize);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            title,
            style.add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center),
        cols[1],
    );
    frame.render_widget(
        Paragraph::new(battery).style(style).alignment(Alignment::Right),
        cols[2],
    );
}

/// Last line of the screen, over whatever is there.
fn render_toast(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    let Some(toast) = &state.toast else { return };
    if toast.is_expired() || area.height == 0 {
        return;
    }
    let icons = &theme.icons;
    let (prefix, color) = match toast.kind {
        ToastKind::Success => (icons.success, theme.palette.accent),
        ToastKind::Error => (icons.error, theme.palette.error),
    };
    let row = Rect::new(area.x, area.y + area.height - 1, area.width, 1);
    let width = area.width.saturating_sub(3) as usize;
    let line = Line::from(vec![
        Span::styled(format!(" {prefix} "), Style::default().fg(color)),
        Span::styled(truncate_str(&toast.message, width), Style::default().fg(color)),
    ]);
    frame.render_widget(
        Paragraph::new(line).style(Style::default().bg(theme.palette.status_bg)),
        row,
    );
}
