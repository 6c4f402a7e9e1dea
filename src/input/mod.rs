//! Terminal input: key and mouse events mapped onto the click wheel.

pub mod wheel;

use crate::app::actions::Action;
use crate::app::events::{Event, InputEvent};
use crate::app::reduce::VOLUME_STEP;
use crate::app::state::{AppState, WheelGeometry};
use crate::nav::ScrollDirection;
use crate::player::controller::SeekDirection;
use crossterm::event::{
    self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
    MouseEvent, MouseEventKind,
};
use std::time::Instant;
use tokio::sync::mpsc;
use wheel::{ClickWheel, WheelButton, WheelEvent};

/// Inner radius of the ring as a fraction of the wheel radius.
pub const CENTER_RADIUS: f64 = 0.4;
/// Half-width in degrees of the button zones at the four cardinal points.
const BUTTON_ARC_DEG: f64 = 22.5;

pub fn spawn_input_task(tx: mpsc::Sender<Event>) {
    tokio::task::spawn_blocking(move || {
        loop {
            if event::poll(std::time::Duration::from_millis(250)).unwrap_or(false) {
                let ev = match event::read() {
                    Ok(CtEvent::Key(k)) if k.kind == KeyEventKind::Press => InputEvent::Key(k),
                    Ok(CtEvent::Mouse(m)) => InputEvent::Mouse(m),
                    Ok(CtEvent::Resize(_, _)) => InputEvent::Resize,
                    _ => continue,
                };
                if tx.blocking_send(Event::Input(ev)).is_err() {
                    break;
                }
            }
        }
    });
}

/// Where a point falls on the drawn wheel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WheelZone {
    Center,
    Button(WheelButton),
    /// Anywhere else on the ring, with the angle in degrees (clockwise on
    /// screen from 3 o'clock).
    Ring(f64),
    Outside,
}

impl WheelGeometry {
    pub fn zone(&self, col: u16, row: u16) -> WheelZone {
        let dx = (col as f64 + 0.5 - self.center_x) / self.radius_x;
        let dy = (row as f64 + 0.5 - self.center_y) / self.radius_y;
        let r = (dx * dx + dy * dy).sqrt();
        if r > 1.0 {
            return WheelZone::Outside;
        }
        if r < CENTER_RADIUS {
            return WheelZone::Center;
        }
        let angle = dy.atan2(dx).to_degrees();
        match button_at(angle) {
            Some(b) => WheelZone::Button(b),
            None => WheelZone::Ring(angle),
        }
    }

    /// Angle of any point relative to the centre, for drags that leave the
    /// ring.
    pub fn angle(&self, col: u16, row: u16) -> f64 {
        let dx = (col as f64 + 0.5 - self.center_x) / self.radius_x;
        let dy = (row as f64 + 0.5 - self.center_y) / self.radius_y;
        dy.atan2(dx).to_degrees()
    }
}

fn button_at(angle: f64) -> Option<WheelButton> {
    let near = |target: f64| wheel::normalize_delta(angle - target).abs() <= BUTTON_ARC_DEG;
    if near(-90.0) {
        Some(WheelButton::Menu)
    } else if near(90.0) {
        Some(WheelButton::PlayPause)
    } else if near(0.0) {
        Some(WheelButton::Next)
    } else if near(180.0) {
        Some(WheelButton::Prev)
    } else {
        None
    }
}

pub fn map_input(
    state: &AppState,
    wheel: &mut ClickWheel,
    ev: InputEvent,
    now: Instant,
) -> Vec<Action> {
    match ev {
        InputEvent::Resize => vec![Action::Resize],
        InputEvent::Mouse(m) => map_mouse(state, wheel, m, now),
        InputEvent::Key(k) => {
            if state.nav.current().is_form() {
                handle_form_key(k).into_iter().collect()
            } else {
                handle_key(wheel, k, now).into_iter().collect()
            }
        }
    }
}

fn handle_form_key(k: KeyEvent) -> Option<Action> {
    match k.code {
        KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Esc => Some(Action::Wheel(WheelEvent::Menu)),
        KeyCode::Enter => Some(Action::FormSubmit),
        KeyCode::Backspace => Some(Action::FormBackspace),
        KeyCode::Tab | KeyCode::Down => Some(Action::FormNextField),
        KeyCode::BackTab | KeyCode::Up => Some(Action::FormPrevField),
        KeyCode::Char(c) => Some(Action::FormChar(c)),
        _ => None,
    }
}

fn handle_key(wheel: &mut ClickWheel, k: KeyEvent, now: Instant) -> Option<Action> {
    let ev = match k.code {
        KeyCode::Char('q') => return Some(Action::Quit),
        KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => {
            return Some(Action::Quit);
        }

        KeyCode::Up | KeyCode::Char('k') => WheelEvent::Scroll(ScrollDirection::Up),
        KeyCode::Down | KeyCode::Char('j') => WheelEvent::Scroll(ScrollDirection::Down),
        // Enter goes through the tap detector so a quick double press is a
        // secondary action.
        KeyCode::Enter => return wheel.press_center(now).map(Action::Wheel),
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('m') => WheelEvent::Menu,
        KeyCode::Left | KeyCode::Char('h') => WheelEvent::Prev,
        KeyCode::Right | KeyCode::Char('l') => WheelEvent::Next,
        KeyCode::Char(' ') => WheelEvent::PlayPause,

        KeyCode::Char(']') => return Some(Action::Seek(SeekDirection::Forward)),
        KeyCode::Char('[') => return Some(Action::Seek(SeekDirection::Back)),
        KeyCode::Char('=') | KeyCode::Char('+') => return Some(Action::Volume(VOLUME_STEP)),
        KeyCode::Char('-') | KeyCode::Char('_') => return Some(Action::Volume(-VOLUME_STEP)),
        _ => return None,
    };
    Some(Action::Wheel(ev))
}

fn map_mouse(state: &AppState, wheel: &mut ClickWheel, m: MouseEvent, now: Instant) -> Vec<Action> {
    let scroll = |d| vec![Action::Wheel(WheelEvent::Scroll(d))];
    match m.kind {
        MouseEventKind::ScrollUp => scroll(ScrollDirection::Up),
        MouseEventKind::ScrollDown => scroll(ScrollDirection::Down),
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(id) = state.hits.row_at(m.column, m.row) {
                return vec![Action::SelectId(id)];
            }
            let Some(geom) = state.hits.wheel else {
                return Vec::new();
            };
            match geom.zone(m.column, m.row) {
                WheelZone::Center => {
                    wheel.press_center(now).map(Action::Wheel).into_iter().collect()
                }
                WheelZone::Button(b) => vec![Action::Wheel(wheel.press_button(b, now))],
                WheelZone::Ring(angle) => {
                    wheel.begin_rotation(angle);
                    Vec::new()
                }
                WheelZone::Outside => Vec::new(),
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => match state.hits.wheel {
            Some(geom) if wheel.is_rotating() => wheel
                .rotate_to(geom.angle(m.column, m.row))
                .into_iter()
                .map(Action::Wheel)
                .collect(),
            _ => Vec::new(),
        },
        MouseEventKind::Up(MouseButton::Left) => {
            wheel.end_rotation();
            wheel.release_button();
            Vec::new()
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::EntryId;
    use crate::nav::Screen;
    use crossterm::event::KeyEventState;
    use ratatui::layout::Rect;

    fn geometry() -> WheelGeometry {
        WheelGeometry {
            center_x: 20.0,
            center_y: 10.0,
            radius_x: 16.0,
            radius_y: 8.0,
        }
    }

    fn key(code: KeyCode) -> InputEvent {
        InputEvent::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> InputEvent {
        InputEvent::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_zones() {
        let g = geometry();
        assert_eq!(g.zone(19, 9), WheelZone::Center);
        assert_eq!(g.zone(19, 3), WheelZone::Button(WheelButton::Menu));
        assert_eq!(g.zone(19, 16), WheelZone::Button(WheelButton::PlayPause));
        assert_eq!(g.zone(33, 9), WheelZone::Button(WheelButton::Next));
        assert_eq!(g.zone(6, 9), WheelZone::Button(WheelButton::Prev));
        assert!(matches!(g.zone(30, 15), WheelZone::Ring(_)));
        assert_eq!(g.zone(0, 0), WheelZone::Outside);
    }

    #[test]
    fn test_drag_around_ring_scrolls() {
        let mut state = AppState::new(80);
        state.hits.wheel = Some(geometry());
        let mut wheel = ClickWheel::new(Default::default());
        let now = Instant::now();

        // Start at the lower right of the ring and sweep clockwise.
        let press = mouse(MouseEventKind::Down(MouseButton::Left), 31, 14);
        let down = map_input(&state, &mut wheel, press, now);
        assert!(down.is_empty());
        assert!(wheel.is_rotating());
        let sweep = mouse(MouseEventKind::Drag(MouseButton::Left), 24, 17);
        let drag = map_input(&state, &mut wheel, sweep, now);
        assert!(!drag.is_empty());
        assert!(drag
            .iter()
            .all(|a| matches!(a, Action::Wheel(WheelEvent::Scroll(ScrollDirection::Down)))));

        map_input(&state, &mut wheel, mouse(MouseEventKind::Up(MouseButton::Left), 24, 17), now);
        assert!(!wheel.is_rotating());
    }

    #[test]
    fn test_row_click_selects_by_id() {
        let mut state = AppState::new(80);
        state.hits.rows.push((Rect::new(0, 2, 30, 1), EntryId::Screen(Screen::Music)));
        let mut wheel = ClickWheel::new(Default::default());
        let actions = map_input(
            &state,
            &mut wheel,
            mouse(MouseEventKind::Down(MouseButton::Left), 4, 2),
            Instant::now(),
        );
        assert!(matches!(
            actions.as_slice(),
            [Action::SelectId(EntryId::Screen(Screen::Music))]
        ));
    }

    #[test]
    fn test_keys_on_forms_edit_text() {
        let mut state = AppState::new(80);
        state.nav.navigate_to(Screen::AddFmChannel);
        let mut wheel = ClickWheel::new(Default::default());
        let now = Instant::now();
        assert!(matches!(
            map_input(&state, &mut wheel, key(KeyCode::Char('q')), now).as_slice(),
            [Action::FormChar('q')]
        ));
        assert!(matches!(
            map_input(&state, &mut wheel, key(KeyCode::Esc), now).as_slice(),
            [Action::Wheel(WheelEvent::Menu)]
        ));
    }

    #[test]
    fn test_enter_waits_for_double_tap_window() {
        let state = AppState::new(80);
        let mut wheel = ClickWheel::new(Default::default());
        let now = Instant::now();
        assert!(map_input(&state, &mut wheel, key(KeyCode::Enter), now).is_empty());
        assert!(matches!(
            map_input(&state, &mut wheel, key(KeyCode::Enter), now).as_slice(),
            [Action::Wheel(WheelEvent::SecondaryAction)]
        ));
        assert!(matches!(
            map_input(&state, &mut wheel, key(KeyCode::Char('q')), now).as_slice(),
            [Action::Quit]
        ));
    }
}
