//! Scrolling menu with the active row highlighted.

use crate::app::state::AppState;
use crate::menu::{MenuEntry, MenuTarget};
use crate::nav::Screen;
use crate::tui::theme::Theme;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::truncate_str;

pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme, area: Rect) {
    let Some(entries) = state.current_menu() else { return };
    if area.height == 0 {
        return;
    }

    if entries.is_empty() {
        let msg = empty_message(state.nav.current());
        frame.render_widget(
            Paragraph::new(msg)
                .style(Style::default().fg(theme.palette.screen_dim))
                .alignment(Alignment::Center),
            area,
        );
        return;
    }

    let active = state.nav.active().min(entries.len() - 1);
    let offset = scroll_offset(active, area.height as usize, entries.len());

    for (row, (i, entry)) in entries
        .iter()
        .enumerate()
        .skip(offset)
        .take(area.height as usize)
        .enumerate()
    {
        let rect = Rect::new(area.x, area.y + row as u16, area.width, 1);
        render_row(frame, theme, entry, i == active, rect);
        state.hits.rows.push((rect, entry.id));
    }
}

fn render_row(frame: &mut Frame, theme: &Theme, entry: &MenuEntry, selected: bool, rect: Rect) {
    let (style, dim) = if selected {
        let s = Style::default()
            .bg(theme.palette.highlight_bg)
            .fg(theme.palette.highlight_fg);
        (s.add_modifier(Modifier::BOLD), s)
    } else {
        (
            Style::default().fg(theme.palette.screen_fg),
            Style::default().fg(theme.palette.screen_dim),
        )
    };

    let width = rect.width as usize;
    let chevron = if drills_down(&entry.target) { theme.icons.chevron } else { "" };
    // Subtext only when it fits next to the label; the selected row always
    // gets it, truncated if need be.
    let tail = entry.subtext.as_deref().unwrap_or("");
    let label_len = entry.label.chars().count() + 1;
    let room = width.saturating_sub(label_len + chevron.chars().count() + 2);
    let tail = if selected || tail.chars().count() <= room {
        truncate_str(tail, room)
    } else {
        String::new()
    };

    let label = truncate_str(&entry.label, width.saturating_sub(2));
    let used = label.chars().count() + 1 + tail.chars().count() + chevron.chars().count() + 1;
    let pad = " ".repeat(width.saturating_sub(used));

    let line = Line::from(vec![
        Span::styled(format!(" {label}"), style),
        Span::styled(pad, style),
        Span::styled(tail, dim),
        Span::styled(format!("{chevron} "), style),
    ]);
    frame.render_widget(Paragraph::new(line).style(style), rect);
}

fn drills_down(target: &MenuTarget) -> bool {
    matches!(target, MenuTarget::Navigate(_) | MenuTarget::ShowNowPlaying)
}

fn empty_message(screen: Screen) -> &'static str {
    match screen {
        Screen::SongList => "No songs. Add Music first.",
        Screen::VideoList => "No videos yet.",
        _ => "Nothing here yet.",
    }
}

/// First visible row, keeping `active` on screen with as little movement
/// as possible.
fn scroll_offset(active: usize, height: usize, len: usize) -> usize {
    if height == 0 || len <= height {
        return 0;
    }
    active.saturating_sub(height - 1).min(len - height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::test_support::*;
    use ratatui::{Terminal, backend::TestBackend};

    #[test]
    fn test_scroll_offset_keeps_active_visible() {
        assert_eq!(scroll_offset(0, 5, 3), 0);
        assert_eq!(scroll_offset(4, 5, 20), 0);
        assert_eq!(scroll_offset(5, 5, 20), 1);
        assert_eq!(scroll_offset(19, 5, 20), 15);
    }

    #[test]
    fn test_rows_registered_for_clicks() {
        let mut state = AppState::new(80);
        state.library.songs.extend([song("a", "X"), song("b", "X")]);
        state.nav.navigate_to(Screen::SongList);
        let theme = crate::tui::theme::get_theme(state.theme);

        let mut terminal = Terminal::new(TestBackend::new(30, 10)).unwrap();
        terminal
            .draw(|f| render(f, &mut state, &theme, Rect::new(0, 1, 30, 8)))
            .unwrap();

        // Two songs plus the clear entry.
        assert_eq!(state.hits.rows.len(), 3);
        assert_eq!(state.hits.rows[1].0, Rect::new(0, 2, 30, 1));
    }
}
