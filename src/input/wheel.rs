//! Click-wheel gesture decoding.
//!
//! Turns a continuous angle stream into scroll ticks and centre-button taps
//! into select / secondary-action events. Time is passed in explicitly so
//! every transition is deterministic.

use crate::config::InputConfig;
use crate::nav::ScrollDirection;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelButton {
    Menu,
    PlayPause,
    Next,
    Prev,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelEvent {
    Scroll(ScrollDirection),
    Select,
    SecondaryAction,
    Menu,
    PlayPause,
    Next,
    Prev,
}

impl From<WheelButton> for WheelEvent {
    fn from(b: WheelButton) -> Self {
        match b {
            WheelButton::Menu => WheelEvent::Menu,
            WheelButton::PlayPause => WheelEvent::PlayPause,
            WheelButton::Next => WheelEvent::Next,
            WheelButton::Prev => WheelEvent::Prev,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WheelTiming {
    /// Degrees of rotation per scroll tick.
    pub scroll_threshold_deg: f64,
    pub double_tap: Duration,
    pub hold_delay: Duration,
    pub repeat_interval: Duration,
}

impl Default for WheelTiming {
    fn default() -> Self {
        Self {
            scroll_threshold_deg: 15.0,
            double_tap: Duration::from_millis(300),
            hold_delay: Duration::from_millis(500),
            repeat_interval: Duration::from_millis(200),
        }
    }
}

impl From<&InputConfig> for WheelTiming {
    fn from(cfg: &InputConfig) -> Self {
        Self {
            scroll_threshold_deg: cfg.scroll_threshold_deg.max(1.0),
            double_tap: Duration::from_millis(cfg.double_tap_ms),
            hold_delay: Duration::from_millis(cfg.hold_delay_ms),
            repeat_interval: Duration::from_millis(cfg.repeat_ms.max(10)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Held {
    button: WheelButton,
    next_fire: Instant,
}

#[derive(Debug)]
pub struct ClickWheel {
    timing: WheelTiming,
    accumulator: f64,
    last_angle: Option<f64>,
    pending_tap: Option<Instant>,
    held: Option<Held>,
}

impl ClickWheel {
    pub fn new(timing: WheelTiming) -> Self {
        Self {
            timing,
            accumulator: 0.0,
            last_angle: None,
            pending_tap: None,
            held: None,
        }
    }

    pub fn begin_rotation(&mut self, angle_deg: f64) {
        self.last_angle = Some(angle_deg);
        self.accumulator = 0.0;
    }

    /// Feeds the next sampled angle. Positive (clockwise) rotation scrolls
    /// down. A full threshold of accumulated rotation yields one tick and the
    /// residual carries over to the next sample.
    pub fn rotate_to(&mut self, angle_deg: f64) -> Vec<WheelEvent> {
        let Some(last) = self.last_angle.replace(angle_deg) else {
            return Vec::new();
        };
        self.accumulator += normalize_delta(angle_deg - last);

        let threshold = self.timing.scroll_threshold_deg;
        let mut out = Vec::new();
        while self.accumulator >= threshold {
            self.accumulator -= threshold;
            out.push(WheelEvent::Scroll(ScrollDirection::Down));
        }
        while self.accumulator <= -threshold {
            self.accumulator += threshold;
            out.push(WheelEvent::Scroll(ScrollDirection::Up));
        }
        out
    }

    pub fn end_rotation(&mut self) {
        self.last_angle = None;
        self.accumulator = 0.0;
    }

    pub fn is_rotating(&self) -> bool {
        self.last_angle.is_some()
    }

    /// A centre tap. The first tap is held back for the double-tap window;
    /// a second tap inside it becomes a secondary action and cancels the
    /// pending select.
    pub fn press_center(&mut self, now: Instant) -> Option<WheelEvent> {
        match self.pending_tap.take() {
            Some(deadline) if now <= deadline => Some(WheelEvent::SecondaryAction),
            // A tap whose window ran out unpolled still counts as a select.
            stale => {
                self.pending_tap = Some(now + self.timing.double_tap);
                stale.map(|_| WheelEvent::Select)
            }
        }
    }

    /// Fires a discrete button immediately. Next/Prev keep firing while held.
    pub fn press_button(&mut self, button: WheelButton, now: Instant) -> WheelEvent {
        self.held = match button {
            WheelButton::Next | WheelButton::Prev => Some(Held {
                button,
                next_fire: now + self.timing.hold_delay,
            }),
            WheelButton::Menu | WheelButton::PlayPause => None,
        };
        button.into()
    }

    pub fn release_button(&mut self) {
        self.held = None;
    }

    /// Emits whatever timers have come due by `now`.
    pub fn poll(&mut self, now: Instant) -> Vec<WheelEvent> {
        let mut out = Vec::new();
        if let Some(deadline) = self.pending_tap
            && now > deadline
        {
            self.pending_tap = None;
            out.push(WheelEvent::Select);
        }
        if let Some(held) = self.held.as_mut()
            && now >= held.next_fire
        {
            held.next_fire = now + self.timing.repeat_interval;
            out.push(held.button.into());
        }
        out
    }

    /// The next instant at which [`poll`](Self::poll) may produce an event.
    pub fn next_deadline(&self) -> Option<Instant> {
        let tap = self.pending_tap.map(|d| d + Duration::from_millis(1));
        let hold = self.held.map(|h| h.next_fire);
        match (tap, hold) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Drops every in-flight gesture and timer. Called on screen change so no
    /// stale select or repeat lands on the new screen.
    pub fn reset(&mut self) {
        self.end_rotation();
        self.pending_tap = None;
        self.held = None;
    }
}

/// Maps a raw angle difference into (-180, 180].
pub fn normalize_delta(mut delta: f64) -> f64 {
    while delta > 180.0 {
        delta -= 360.0;
    }
    while delta <= -180.0 {
        delta += 360.0;
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wheel() -> ClickWheel {
        ClickWheel::new(WheelTiming::default())
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_normalize_delta_wraps() {
        assert_eq!(normalize_delta(350.0), -10.0);
        assert_eq!(normalize_delta(-350.0), 10.0);
        assert_eq!(normalize_delta(180.0), 180.0);
        assert_eq!(normalize_delta(-180.0), 180.0);
    }

    #[test]
    fn test_rotation_emits_ticks_with_residual() {
        let mut w = wheel();
        w.begin_rotation(0.0);
        assert!(w.rotate_to(10.0).is_empty());
        // 10 + 10 = 20 -> one tick, 5 left over
        assert_eq!(w.rotate_to(20.0), vec![WheelEvent::Scroll(ScrollDirection::Down)]);
        // 5 + 10 = 15 -> exactly one more
        assert_eq!(w.rotate_to(30.0), vec![WheelEvent::Scroll(ScrollDirection::Down)]);
    }

    #[test]
    fn test_large_jump_emits_multiple_ticks() {
        let mut w = wheel();
        w.begin_rotation(0.0);
        let ticks = w.rotate_to(-47.0);
        assert_eq!(ticks, vec![WheelEvent::Scroll(ScrollDirection::Up); 3]);
    }

    #[test]
    fn test_rotation_across_wraparound() {
        let mut w = wheel();
        w.begin_rotation(170.0);
        // 170 -> -170 is +20 degrees clockwise, not -340
        assert_eq!(w.rotate_to(-170.0), vec![WheelEvent::Scroll(ScrollDirection::Down)]);
    }

    #[test]
    fn test_reversal_consumes_residual() {
        let mut w = wheel();
        w.begin_rotation(0.0);
        w.rotate_to(20.0); // one tick down, residual 5
        assert!(w.rotate_to(5.0).is_empty()); // residual -10
        assert_eq!(w.rotate_to(0.0), vec![WheelEvent::Scroll(ScrollDirection::Up)]);
    }

    #[test]
    fn test_rotate_without_begin_is_ignored_once() {
        let mut w = wheel();
        assert!(w.rotate_to(90.0).is_empty());
        assert!(w.is_rotating());
        w.end_rotation();
        assert!(!w.is_rotating());
    }

    #[test]
    fn test_single_tap_selects_after_window() {
        let mut w = wheel();
        let t0 = Instant::now();
        assert_eq!(w.press_center(t0), None);
        assert!(w.poll(t0 + ms(100)).is_empty());
        assert_eq!(w.poll(t0 + ms(301)), vec![WheelEvent::Select]);
        assert!(w.poll(t0 + ms(600)).is_empty());
    }

    #[test]
    fn test_double_tap_is_secondary_and_suppresses_select() {
        let mut w = wheel();
        let t0 = Instant::now();
        assert_eq!(w.press_center(t0), None);
        assert_eq!(w.press_center(t0 + ms(200)), Some(WheelEvent::SecondaryAction));
        assert!(w.poll(t0 + ms(1000)).is_empty());
        assert_eq!(w.next_deadline(), None);
    }

    #[test]
    fn test_late_second_tap_starts_new_tap() {
        let mut w = wheel();
        let t0 = Instant::now();
        w.press_center(t0);
        assert_eq!(w.press_center(t0 + ms(400)), Some(WheelEvent::Select));
        assert_eq!(w.poll(t0 + ms(701)), vec![WheelEvent::Select]);
    }

    #[test]
    fn test_hold_next_repeats_until_release() {
        let mut w = wheel();
        let t0 = Instant::now();
        assert_eq!(w.press_button(WheelButton::Next, t0), WheelEvent::Next);
        assert!(w.poll(t0 + ms(499)).is_empty());
        assert_eq!(w.poll(t0 + ms(500)), vec![WheelEvent::Next]);
        assert!(w.poll(t0 + ms(600)).is_empty());
        assert_eq!(w.poll(t0 + ms(700)), vec![WheelEvent::Next]);
        w.release_button();
        assert!(w.poll(t0 + ms(2000)).is_empty());
    }

    #[test]
    fn test_menu_does_not_repeat() {
        let mut w = wheel();
        let t0 = Instant::now();
        assert_eq!(w.press_button(WheelButton::Menu, t0), WheelEvent::Menu);
        assert!(w.poll(t0 + ms(5000)).is_empty());
    }

    #[test]
    fn test_reset_clears_timers() {
        let mut w = wheel();
        let t0 = Instant::now();
        w.press_center(t0);
        w.press_button(WheelButton::Prev, t0);
        w.begin_rotation(0.0);
        w.reset();
        assert_eq!(w.next_deadline(), None);
        assert!(!w.is_rotating());
        assert!(w.poll(t0 + ms(5000)).is_empty());
    }
}
