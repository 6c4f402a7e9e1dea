//! Color palettes for the device body, screen and wheel

use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    /// Device casing around the screen and wheel.
    pub body: Color,
    pub screen_bg: Color,
    pub screen_fg: Color,
    pub screen_dim: Color,
    /// Highlighted menu row.
    pub highlight_bg: Color,
    pub highlight_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub wheel: Color,
    pub wheel_label: Color,
    pub center_button: Color,
    pub border: Color,
    pub accent: Color,
    pub error: Color,
}

impl Palette {
    /// White body, grey wheel, blue selection bar
    pub const CLASSIC: Self = Self {
        body: Color::Rgb(236, 236, 236),
        screen_bg: Color::Rgb(250, 250, 250),
        screen_fg: Color::Rgb(20, 20, 20),
        screen_dim: Color::Rgb(120, 120, 120),
        highlight_bg: Color::Rgb(52, 120, 214),
        highlight_fg: Color::Rgb(255, 255, 255),
        status_bg: Color::Rgb(210, 214, 222),
        status_fg: Color::Rgb(30, 30, 30),
        wheel: Color::Rgb(190, 190, 190),
        wheel_label: Color::Rgb(90, 90, 90),
        center_button: Color::Rgb(240, 240, 240),
        border: Color::Rgb(160, 160, 160),
        accent: Color::Rgb(52, 120, 214),
        error: Color::Rgb(200, 40, 40),
    };

    /// Black body, dark wheel, white selection bar
    pub const DARK: Self = Self {
        body: Color::Rgb(24, 24, 24),
        screen_bg: Color::Rgb(12, 12, 12),
        screen_fg: Color::Rgb(235, 235, 235),
        screen_dim: Color::Rgb(130, 130, 130),
        highlight_bg: Color::Rgb(235, 235, 235),
        highlight_fg: Color::Rgb(12, 12, 12),
        status_bg: Color::Rgb(48, 48, 48),
        status_fg: Color::Rgb(235, 235, 235),
        wheel: Color::Rgb(60, 60, 60),
        wheel_label: Color::Rgb(200, 200, 200),
        center_button: Color::Rgb(36, 36, 36),
        border: Color::Rgb(80, 80, 80),
        accent: Color::Rgb(235, 235, 235),
        error: Color::Rgb(255, 110, 110),
    };

    /// Brushed-gold body, amber highlight
    pub const GOLD: Self = Self {
        body: Color::Rgb(212, 175, 55),
        screen_bg: Color::Rgb(255, 250, 235),
        screen_fg: Color::Rgb(60, 45, 10),
        screen_dim: Color::Rgb(140, 120, 70),
        highlight_bg: Color::Rgb(184, 134, 11),
        highlight_fg: Color::Rgb(255, 255, 255),
        status_bg: Color::Rgb(238, 220, 160),
        status_fg: Color::Rgb(60, 45, 10),
        wheel: Color::Rgb(240, 225, 170),
        wheel_label: Color::Rgb(110, 85, 20),
        center_button: Color::Rgb(212, 175, 55),
        border: Color::Rgb(150, 120, 40),
        accent: Color::Rgb(184, 134, 11),
        error: Color::Rgb(170, 30, 30),
    };
}

impl Default for Palette {
    fn default() -> Self {
        Self::CLASSIC
    }
}
