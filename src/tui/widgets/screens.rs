//! Screens that are not plain menus.

use crate::app::state::{AppState, GameInput, RunnerStatus};
use crate::library::models::UNKNOWN_ARTIST;
use crate::nav::Screen;
use crate::tui::theme::Theme;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::truncate_str;

fn centered_lines(frame: &mut Frame, lines: Vec<Line<'_>>, area: Rect) {
    let top = (area.height as usize).saturating_sub(lines.len()) / 2;
    let mut padded = vec![Line::default(); top];
    padded.extend(lines);
    frame.render_widget(
        Paragraph::new(padded)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}

/// The active album large in the middle, its neighbours either side.
pub fn render_cover_flow(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    let dim = Style::default().fg(theme.palette.screen_dim);
    let albums = state.library.albums();
    if albums.is_empty() {
        centered_lines(frame, vec![Line::styled("No albums", dim)], area);
        return;
    }
    let active = state.nav.active().min(albums.len() - 1);
    let album = &albums[active];

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(60),
            Constraint::Percentage(20),
        ])
        .split(area);

    let side = |i: Option<usize>, rect: Rect, frame: &mut Frame| {
        let Some(a) = i.and_then(|i| albums.get(i)) else { return };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_set(theme.border_set())
            .border_style(dim);
        let label = truncate_str(&a.name, rect.width.saturating_sub(2) as usize);
        let inner = block.inner(rect);
        frame.render_widget(block, rect);
        centered_lines(frame, vec![Line::styled(label, dim)], inner);
    };
    let cover_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(cols[1]);
    side(active.checked_sub(1), Rect { height: cover_rows[0].height, ..cols[0] }, frame);
    side(Some(active + 1), Rect { height: cover_rows[0].height, ..cols[2] }, frame);

    let cover = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.accent));
    let inner = cover.inner(cover_rows[0]);
    frame.render_widget(cover, cover_rows[0]);
    centered_lines(
        frame,
        vec![Line::styled(
            theme.icons.music,
            Style::default().fg(theme.palette.accent),
        )],
        inner,
    );

    let width = cover_rows[1].width as usize;
    let artist = if album.artist.is_empty() { UNKNOWN_ARTIST } else { &album.artist };
    let songs = if album.song_count == 1 { "song" } else { "songs" };
    frame.render_widget(
        Paragraph::new(vec![
            Line::styled(
                truncate_str(&album.name, width),
                Style::default()
                    .fg(theme.palette.screen_fg)
                    .add_modifier(Modifier::BOLD),
            ),
            Line::styled(truncate_str(artist, width), dim),
            Line::styled(format!("{} {songs}", album.song_count), dim),
        ])
        .alignment(Alignment::Center),
        cover_rows[1],
    );
}

pub fn render_photo_viewer(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    let dim = Style::default().fg(theme.palette.screen_dim);
    let photos = &state.library.photos;
    if photos.is_empty() {
        centered_lines(frame, vec![Line::styled("No photos", dim)], area);
        return;
    }
    let active = state.nav.active().min(photos.len() - 1);
    let Some(photo) = photos.get(active) else { return };
    let width = area.width as usize;
    centered_lines(
        frame,
        vec![
            Line::styled(theme.icons.photo, Style::default().fg(theme.palette.accent)),
            Line::default(),
            Line::styled(
                truncate_str(&photo.name, width),
                Style::default()
                    .fg(theme.palette.screen_fg)
                    .add_modifier(Modifier::BOLD),
            ),
            Line::styled("Select to open", dim),
        ],
        area,
    );
}

pub fn render_shuffle(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    let dim = Style::default().fg(theme.palette.screen_dim);
    let n = state.library.songs.len();
    let hint = if n == 0 { "No songs to shuffle".to_string() } else { format!("{n} songs") };
    centered_lines(
        frame,
        vec![
            Line::styled(
                "Shuffle Songs",
                Style::default()
                    .fg(theme.palette.screen_fg)
                    .add_modifier(Modifier::BOLD),
            ),
            Line::styled(hint, dim),
            Line::default(),
            Line::styled("Press select to play", dim),
        ],
        area,
    );
}

pub fn render_form(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    let Some(form) = &state.form else { return };
    let dim = Style::default().fg(theme.palette.screen_dim);
    let fg = Style::default().fg(theme.palette.screen_fg);
    let width = area.width.saturating_sub(2) as usize;

    let mut lines = vec![Line::default()];
    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        lines.push(Line::styled(format!(" {}", field.label), dim));
        let (text, style) = if field.value.is_empty() {
            (field.placeholder.to_string(), dim)
        } else {
            (field.value.clone(), fg)
        };
        let cursor = if focused && !form.busy { "▏" } else { "" };
        // Long values scroll so the cursor end stays visible.
        let shown: String = {
            let n = text.chars().count();
            let keep = width.saturating_sub(1);
            if focused && !field.value.is_empty() && n > keep {
                text.chars().skip(n - keep).collect()
            } else {
                truncate_str(&text, keep)
            }
        };
        let row_style = if focused {
            style.bg(theme.palette.status_bg)
        } else {
            style
        };
        lines.push(Line::from(vec![
            Span::raw(" "),
            Span::styled(shown, row_style),
            Span::styled(cursor, Style::default().fg(theme.palette.accent)),
        ]));
        lines.push(Line::default());
    }

    if form.busy {
        let msg = match state.nav.current() {
            Screen::AddYoutubeVideo => "Looking up video...",
            _ => "Importing...",
        };
        lines.push(Line::styled(format!(" {msg}"), dim));
    } else if let Some(err) = &form.error {
        lines.push(Line::styled(
            format!(" {} {err}", theme.icons.error),
            Style::default().fg(theme.palette.error),
        ));
    } else {
        lines.push(Line::styled(" Enter to save, Esc to go back", dim));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

pub fn render_game(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    let dim = Style::default().fg(theme.palette.screen_dim);
    let accent = Style::default().fg(theme.palette.accent);
    let mode = if state.gamepad {
        Line::styled("Gamepad mode ON", accent)
    } else {
        Line::styled("Double-tap select for gamepad mode", dim)
    };
    let last = match state.last_game_input {
        Some(GameInput::Up) => "▲",
        Some(GameInput::Down) => "▼",
        Some(GameInput::Left) => "◀",
        Some(GameInput::Right) => "▶",
        Some(GameInput::Fire) => "●",
        None => " ",
    };
    centered_lines(
        frame,
        vec![
            Line::styled(
                format!("{} {}", theme.icons.game, state.nav.current().title()),
                Style::default()
                    .fg(theme.palette.screen_fg)
                    .add_modifier(Modifier::BOLD),
            ),
            Line::default(),
            mode,
            Line::styled(last, accent),
        ],
        area,
    );
}

pub fn render_runner(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    let dim = Style::default().fg(theme.palette.screen_dim);
    let fg = Style::default()
        .fg(theme.palette.screen_fg)
        .add_modifier(Modifier::BOLD);
    let lines = match &state.runner {
        RunnerStatus::Idle => vec![Line::styled("No app running", dim)],
        RunnerStatus::Running(name) => vec![
            Line::styled(name.clone(), fg),
            Line::styled("Running in emulator...", dim),
        ],
        RunnerStatus::Exited(name) => vec![
            Line::styled(name.clone(), fg),
            Line::styled("App closed", dim),
        ],
        RunnerStatus::Failed(msg) => vec![Line::styled(
            format!("{} {msg}", theme.icons.error),
            Style::default().fg(theme.palette.error),
        )],
    };
    centered_lines(frame, lines, area);
}

pub fn render_about(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    let dim = Style::default().fg(theme.palette.screen_dim);
    let fg = Style::default().fg(theme.palette.screen_fg);
    let lib = &state.library;
    let row = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label:<8}"), dim),
            Span::styled(format!("{value:>6}"), fg),
        ])
    };
    centered_lines(
        frame,
        vec![
            Line::styled("wheelpod", fg.add_modifier(Modifier::BOLD)),
            Line::styled(format!("Version {}", env!("CARGO_PKG_VERSION")), dim),
            Line::default(),
            row("Songs", lib.songs.len().to_string()),
            row("Photos", lib.photos.len().to_string()),
            row("Videos", lib.videos.len().to_string()),
            row("Radio", lib.fm.len().to_string()),
            row("Apps", lib.apps.len().to_string()),
        ],
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::test_support::*;
    use ratatui::{Terminal, backend::TestBackend};

    fn screen_text(state: &AppState, f: fn(&mut Frame, &AppState, &Theme, Rect)) -> String {
        let theme = crate::tui::theme::get_theme(state.theme);
        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        terminal
            .draw(|frame| f(frame, state, &theme, frame.area()))
            .unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_about_shows_counts() {
        let mut state = AppState::new(80);
        state.library.songs.extend([song("a", "X"), song("b", "Y")]);
        let text = screen_text(&state, render_about);
        assert!(text.contains("wheelpod"));
        assert!(text.contains("Songs"));
        assert!(text.contains('2'));
    }

    #[test]
    fn test_runner_failure_shown() {
        let mut state = AppState::new(80);
        state.runner = RunnerStatus::Failed("Emulator Not Found".into());
        assert!(screen_text(&state, render_runner).contains("Emulator Not Found"));
    }

    #[test]
    fn test_cover_flow_names_active_album() {
        let mut state = AppState::new(80);
        state.library.songs.extend([song("a", "First"), song("b", "Second")]);
        state.nav.navigate_to(Screen::CoverFlow);
        state.nav.set_active(1);
        let text = screen_text(&state, render_cover_flow);
        assert!(text.contains("Second"));
    }
}
