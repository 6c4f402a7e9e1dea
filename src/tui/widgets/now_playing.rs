//! Now Playing and video screens: title, progress and inline playback errors.

use crate::app::state::AppState;
use crate::library::Library;
use crate::library::models::VideoSource;
use crate::player::controller::{MediaRef, PlaybackStatus};
use crate::tui::theme::{Icons, Theme};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::{format_time, truncate_str};

/// What the screen shows for the playing item.
struct Described {
    title: String,
    subtitle: String,
    detail: String,
    /// The song file carried embedded cover art.
    artwork: bool,
    /// Live streams have no meaningful position.
    live: bool,
}

fn describe(lib: &Library, media: MediaRef) -> Option<Described> {
    match media {
        MediaRef::Song(i) => lib.songs.get(i).map(|s| Described {
            title: s.name.clone(),
            subtitle: s.artist.clone(),
            detail: s.album.clone(),
            artwork: s.cover.is_some(),
            live: false,
        }),
        MediaRef::Video(i) => lib.videos.get(i).map(|v| Described {
            title: v.name.clone(),
            subtitle: v.origin_label().to_string(),
            detail: String::new(),
            artwork: false,
            live: matches!(v.source, VideoSource::Iptv { .. }),
        }),
        MediaRef::Fm(i) => lib.fm.get(i).map(|c| Described {
            title: c.name.clone(),
            subtitle: "FM Radio".to_string(),
            detail: String::new(),
            artwork: false,
            live: true,
        }),
    }
}

pub fn render(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    let icons = &theme.icons;
    let dim = Style::default().fg(theme.palette.screen_dim);

    let Some(np) = state.playback.now_playing() else {
        frame.render_widget(
            Paragraph::new(vec![Line::default(), Line::from("Nothing playing")])
                .style(dim)
                .alignment(Alignment::Center),
            area,
        );
        return;
    };
    let Some(item) = describe(&state.library, np.media) else { return };

    let padded = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(1), // Left padding
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Right padding
        ])
        .split(area)[1];

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Artwork badge
            Constraint::Length(1), // Title
            Constraint::Length(1), // Artist / origin
            Constraint::Length(1), // Album
            Constraint::Min(0),    // Status or error
            Constraint::Length(1), // Progress bar
            Constraint::Length(1), // Times
            Constraint::Length(1), // Volume
        ])
        .split(padded);

    let width = padded.width as usize;
    let center = |text: String, style: Style| {
        Paragraph::new(Line::from(Span::styled(truncate_str(&text, width), style)))
            .alignment(Alignment::Center)
    };

    if item.artwork {
        let badge = format!("{} Cover art", icons.photo);
        frame.render_widget(center(badge, Style::default().fg(theme.palette.accent)), rows[0]);
    }
    frame.render_widget(
        center(
            item.title,
            Style::default()
                .fg(theme.palette.screen_fg)
                .add_modifier(Modifier::BOLD),
        ),
        rows[1],
    );
    frame.render_widget(center(item.subtitle, dim), rows[2]);
    frame.render_widget(center(item.detail, dim), rows[3]);

    let status = match state.playback.status() {
        PlaybackStatus::Loading => Some(("Loading...".to_string(), dim)),
        PlaybackStatus::Paused => Some(("Paused".to_string(), dim)),
        PlaybackStatus::Failed(msg) => {
            Some((msg.clone(), Style::default().fg(theme.palette.error)))
        }
        PlaybackStatus::Playing | PlaybackStatus::Idle => None,
    };
    if let Some((text, style)) = status
        && rows[4].height > 0
    {
        let mid = Rect::new(rows[4].x, rows[4].y + rows[4].height / 2, rows[4].width, 1);
        frame.render_widget(center(text, style), mid);
    }

    let position = state.playback.position();
    let duration = state.playback.duration();
    if item.live {
        frame.render_widget(
            center("● LIVE".to_string(), Style::default().fg(theme.palette.accent)),
            rows[5],
        );
    } else {
        let ratio = if duration > 0.0 {
            (position / duration).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let bar = render_progress_bar(rows[5].width as usize, ratio, icons);
        frame.render_widget(
            Paragraph::new(Span::styled(bar, Style::default().fg(theme.palette.accent))),
            rows[5],
        );

        let elapsed = format_time(position);
        let remaining = if duration > 0.0 {
            format!("-{}", format_time((duration - position).max(0.0)))
        } else {
            format_time(f64::NAN)
        };
        let gap = width.saturating_sub(elapsed.chars().count() + remaining.chars().count());
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(elapsed, dim),
                Span::raw(" ".repeat(gap)),
                Span::styled(remaining, dim),
            ])),
            rows[6],
        );
    }

    frame.render_widget(
        center(format!("Vol {}%", state.playback.volume()), dim),
        rows[7],
    );
}

fn render_progress_bar(width: usize, ratio: f64, icons: &Icons) -> String {
    if width < 3 {
        return String::new();
    }

    let filled = ((width - 1) as f64 * ratio).round() as usize;
    let empty = width.saturating_sub(filled + 1);

    let mut bar = String::with_capacity(width * 3);
    for _ in 0..filled {
        bar.push_str(icons.progress_full);
    }
    bar.push_str(icons.progress_head);
    for _ in 0..empty {
        bar.push_str(icons.progress_empty);
    }
    bar
}
