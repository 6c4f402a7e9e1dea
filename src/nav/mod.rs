//! Screen identifiers, the drill-down stack and the active index.

use crate::library::models::Collection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    MainMenu,
    Music,
    SongList,
    CoverFlow,
    Photos,
    PhotoViewer,
    Videos,
    VideoList,
    VideoPlayer,
    AddYoutubeVideo,
    AddIptvLink,
    AddOnlineVideo,
    LiveTv,
    FmRadio,
    AddFmChannel,
    Extras,
    ShufflePlay,
    NowPlaying,
    Games,
    BrickBreaker,
    Snake,
    Apps,
    J2meRunner,
    Settings,
    Themes,
    StreamProxy,
    About,
    Import(Collection),
}

impl Screen {
    /// Title shown in the status bar.
    pub fn title(self) -> &'static str {
        match self {
            Screen::MainMenu => "wheelpod",
            Screen::Music => "Music",
            Screen::SongList => "Songs",
            Screen::CoverFlow => "Cover Flow",
            Screen::Photos => "Photos",
            Screen::PhotoViewer => "Photo",
            Screen::Videos => "Videos",
            Screen::VideoList => "All Videos",
            Screen::VideoPlayer => "Video",
            Screen::AddYoutubeVideo => "Add YouTube",
            Screen::AddIptvLink => "Add IPTV",
            Screen::AddOnlineVideo => "Add Online",
            Screen::LiveTv => "Live TV",
            Screen::FmRadio => "FM Radio",
            Screen::AddFmChannel => "Add Channel",
            Screen::Extras => "Extras",
            Screen::ShufflePlay => "Shuffle",
            Screen::NowPlaying => "Now Playing",
            Screen::Games => "Games",
            Screen::BrickBreaker => "Brick Breaker",
            Screen::Snake => "Snake",
            Screen::Apps => "Apps",
            Screen::J2meRunner => "J2ME",
            Screen::Settings => "Settings",
            Screen::Themes => "Themes",
            Screen::StreamProxy => "Stream Proxy",
            Screen::About => "About",
            Screen::Import(c) => match c {
                Collection::Songs => "Add Music",
                Collection::Photos => "Add Photos",
                Collection::Videos => "Add Videos",
                Collection::Apps => "Add App",
            },
        }
    }

    pub fn is_game(self) -> bool {
        matches!(self, Screen::BrickBreaker | Screen::Snake)
    }

    /// Screens that take typed text.
    pub fn is_form(self) -> bool {
        matches!(
            self,
            Screen::AddYoutubeVideo
                | Screen::AddIptvLink
                | Screen::AddOnlineVideo
                | Screen::AddFmChannel
                | Screen::StreamProxy
                | Screen::Import(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// Drill-down history plus the cursor into the current screen's items.
///
/// The stack is never empty: the root main menu cannot be popped.
#[derive(Debug, Clone)]
pub struct Navigator {
    stack: Vec<Screen>,
    active: usize,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            stack: vec![Screen::MainMenu],
            active: 0,
        }
    }

    pub fn navigate_to(&mut self, screen: Screen) {
        self.stack.push(screen);
        self.active = 0;
    }

    /// Pops the current screen unless it is the root. Returns whether the
    /// stack changed.
    pub fn go_back(&mut self) -> bool {
        self.active = 0;
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    pub fn current(&self) -> Screen {
        // The root is never popped.
        self.stack.last().copied().unwrap_or(Screen::MainMenu)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn active(&self) -> usize {
        self.active
    }

    /// Moves the cursor one step, wrapping within `item_count`. No effect on
    /// an empty screen.
    pub fn scroll(&mut self, direction: ScrollDirection, item_count: usize) {
        if item_count == 0 {
            return;
        }
        let i = self.active.min(item_count - 1);
        self.active = match direction {
            ScrollDirection::Down => (i + 1) % item_count,
            ScrollDirection::Up => (i + item_count - 1) % item_count,
        };
    }

    pub fn set_active(&mut self, index: usize) {
        self.active = index;
    }

    pub fn reset_active(&mut self) {
        self.active = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_main_menu() {
        let nav = Navigator::new();
        assert_eq!(nav.current(), Screen::MainMenu);
        assert_eq!(nav.depth(), 1);
        assert_eq!(nav.active(), 0);
    }

    #[test]
    fn test_push_pop_depth() {
        let mut nav = Navigator::new();
        let pushes = [Screen::Music, Screen::SongList, Screen::NowPlaying, Screen::Settings];
        for s in pushes {
            nav.navigate_to(s);
        }
        for _ in 0..3 {
            assert!(nav.go_back());
        }
        assert_eq!(nav.depth(), 1 + pushes.len() - 3);
        assert_eq!(nav.current(), Screen::Music);
    }

    #[test]
    fn test_go_back_at_root_is_noop() {
        let mut nav = Navigator::new();
        nav.set_active(3);
        assert!(!nav.go_back());
        assert!(!nav.go_back());
        assert_eq!(nav.depth(), 1);
        assert_eq!(nav.current(), Screen::MainMenu);
        assert_eq!(nav.active(), 0);
    }

    #[test]
    fn test_navigation_resets_active() {
        let mut nav = Navigator::new();
        nav.set_active(4);
        nav.navigate_to(Screen::Photos);
        assert_eq!(nav.active(), 0);
        nav.set_active(1);
        nav.go_back();
        assert_eq!(nav.active(), 0);
    }

    #[test]
    fn test_scroll_wraps_both_ways() {
        let mut nav = Navigator::new();
        nav.scroll(ScrollDirection::Up, 3);
        assert_eq!(nav.active(), 2);
        nav.scroll(ScrollDirection::Down, 3);
        assert_eq!(nav.active(), 0);
        for _ in 0..7 {
            nav.scroll(ScrollDirection::Down, 3);
            assert!(nav.active() < 3);
        }
        assert_eq!(nav.active(), 1);
    }

    #[test]
    fn test_scroll_empty_is_noop() {
        let mut nav = Navigator::new();
        nav.set_active(0);
        nav.scroll(ScrollDirection::Down, 0);
        nav.scroll(ScrollDirection::Up, 0);
        assert_eq!(nav.active(), 0);
    }

    #[test]
    fn test_scroll_clamps_stale_index() {
        let mut nav = Navigator::new();
        nav.set_active(9);
        nav.scroll(ScrollDirection::Down, 4);
        assert_eq!(nav.active(), 0);
    }
}
