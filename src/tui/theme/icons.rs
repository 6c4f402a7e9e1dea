//! Glyphs drawn on the screen and wheel. Plain unicode so no patched font
//! is needed.

#[derive(Debug, Clone)]
pub struct Icons {
    pub play: &'static str,
    pub pause: &'static str,
    pub next: &'static str,
    pub prev: &'static str,
    pub menu: &'static str,

    pub chevron: &'static str,
    pub battery: &'static str,
    pub charging: &'static str,

    pub success: &'static str,
    pub error: &'static str,

    pub progress_full: &'static str,
    pub progress_empty: &'static str,
    pub progress_head: &'static str,

    pub music: &'static str,
    pub video: &'static str,
    pub photo: &'static str,
    pub radio: &'static str,
    pub tv: &'static str,
    pub game: &'static str,
    pub app: &'static str,
}

impl Icons {
    pub const fn unicode() -> Self {
        Self {
            play: "▶",
            pause: "❚❚",
            next: "▶▶|",
            prev: "|◀◀",
            menu: "MENU",

            chevron: "›",
            battery: "▮",
            charging: "⚡",

            success: "✓",
            error: "✗",

            progress_full: "━",
            progress_empty: "─",
            progress_head: "●",

            music: "♪",
            video: "▣",
            photo: "◩",
            radio: "◉",
            tv: "▤",
            game: "◆",
            app: "☐",
        }
    }
}

impl Default for Icons {
    fn default() -> Self {
        Self::unicode()
    }
}
