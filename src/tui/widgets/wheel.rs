//! The click wheel, drawn on a braille canvas.

use crate::app::state::{AppState, WheelGeometry};
use crate::input::CENTER_RADIUS;
use crate::tui::theme::Theme;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::canvas::{Canvas, Circle},
};

/// A square-looking rect for the wheel: terminal cells are about twice as
/// tall as they are wide.
fn wheel_rect(area: Rect) -> Rect {
    let height = area.height.min(area.width / 2);
    let width = (height * 2).min(area.width);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

pub fn geometry(rect: Rect) -> WheelGeometry {
    WheelGeometry {
        center_x: rect.x as f64 + rect.width as f64 / 2.0,
        center_y: rect.y as f64 + rect.height as f64 / 2.0,
        radius_x: rect.width as f64 / 2.0,
        radius_y: rect.height as f64 / 2.0,
    }
}

pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme, area: Rect) {
    let rect = wheel_rect(area);
    if rect.width < 8 || rect.height < 4 {
        return;
    }
    state.hits.wheel = Some(geometry(rect));

    let icons = &theme.icons;
    let (top, bottom, left, right) = if state.gamepad {
        ("▲", "▼", "◀", "▶")
    } else {
        (icons.menu, "▶❚❚", icons.prev, icons.next)
    };
    let label_style = Style::default()
        .fg(theme.palette.wheel_label)
        .add_modifier(Modifier::BOLD);
    // Canvas text starts at the given point; shift left by half its width.
    let cell = 2.0 / rect.width as f64;
    let centered = |text: &str| -(text.chars().count() as f64) * cell / 2.0;

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .background_color(theme.palette.body)
        .x_bounds([-1.0, 1.0])
        .y_bounds([-1.0, 1.0])
        .paint(|ctx| {
            ctx.draw(&Circle {
                x: 0.0,
                y: 0.0,
                radius: 0.98,
                color: theme.palette.wheel,
            });
            ctx.draw(&Circle {
                x: 0.0,
                y: 0.0,
                radius: CENTER_RADIUS,
                color: theme.palette.center_button,
            });
            ctx.layer();
            ctx.print(centered(top), 0.7, Span::styled(top.to_string(), label_style));
            ctx.print(centered(bottom), -0.75, Span::styled(bottom.to_string(), label_style));
            ctx.print(-0.9, 0.0, Span::styled(left.to_string(), label_style));
            ctx.print(
                0.9 - right.chars().count() as f64 * cell,
                0.0,
                Span::styled(right.to_string(), label_style),
            );
        });
    frame.render_widget(canvas, rect);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wheel_rect_is_centred_and_twice_as_wide() {
        let r = wheel_rect(Rect::new(0, 20, 44, 13));
        assert_eq!((r.width, r.height), (26, 13));
        assert_eq!(r.x, 9);
        assert_eq!(r.y, 20);
    }

    #[test]
    fn test_geometry_matches_rect() {
        let g = geometry(Rect::new(10, 4, 20, 10));
        assert_eq!(g.center_x, 20.0);
        assert_eq!(g.center_y, 9.0);
        assert_eq!(g.radius_x, 10.0);
        assert_eq!(g.radius_y, 5.0);
    }
}
