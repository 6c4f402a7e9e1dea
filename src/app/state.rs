use crate::battery::BatteryStatus;
use crate::library::Library;
use crate::menu::{self, EntryId, MenuContext, MenuEntry};
use crate::nav::{Navigator, Screen};
use crate::player::PlaybackController;
use crate::player::controller::MediaRef;
use crate::tui::theme::ThemeName;
use ratatui::layout::Rect;

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub created_at: std::time::Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Success,
            created_at: std::time::Instant::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Error,
            created_at: std::time::Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > std::time::Duration::from_secs(3)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
    pub placeholder: &'static str,
}

impl FormField {
    fn new(label: &'static str, placeholder: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            placeholder,
        }
    }
}

/// Text entry state for the add-link, import and proxy screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub fields: Vec<FormField>,
    pub focus: usize,
    pub error: Option<String>,
    /// A lookup or import is in flight; input is ignored until it reports.
    pub busy: bool,
}

impl FormState {
    pub fn for_screen(screen: Screen, stream_proxy: &str) -> Option<Self> {
        let fields = match screen {
            Screen::AddYoutubeVideo => vec![FormField::new(
                "YouTube URL",
                "https://www.youtube.com/watch?v=...",
            )],
            Screen::AddIptvLink => vec![
                FormField::new("Channel name", "My Channel"),
                FormField::new("Stream URL", "https://example.com/live.m3u8"),
            ],
            Screen::AddOnlineVideo => vec![
                FormField::new("Video name", "My Video"),
                FormField::new("Video URL", "https://example.com/video.mp4"),
            ],
            Screen::AddFmChannel => vec![
                FormField::new("Station name", "My Station"),
                FormField::new("Stream URL", "https://example.com/stream.mp3"),
            ],
            Screen::StreamProxy => {
                let mut field = FormField::new("Proxy prefix", "https://proxy.example/");
                field.value = stream_proxy.to_string();
                vec![field]
            }
            Screen::Import(_) => vec![FormField::new("File or folder", "~/Music")],
            _ => return None,
        };
        Some(Self {
            fields,
            focus: 0,
            error: None,
            busy: false,
        })
    }

    pub fn value(&self, i: usize) -> &str {
        self.fields.get(i).map(|f| f.value.as_str()).unwrap_or("")
    }

    pub fn input_char(&mut self, c: char) {
        if let Some(f) = self.fields.get_mut(self.focus) {
            f.value.push(c);
            self.error = None;
        }
    }

    pub fn backspace(&mut self) {
        if let Some(f) = self.fields.get_mut(self.focus) {
            f.value.pop();
        }
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn prev_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerStatus {
    Idle,
    Running(String),
    Exited(String),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameInput {
    Up,
    Down,
    Left,
    Right,
    Fire,
}

/// Where the click wheel was drawn, in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelGeometry {
    pub center_x: f64,
    pub center_y: f64,
    /// Horizontal radius in columns.
    pub radius_x: f64,
    /// Vertical radius in rows.
    pub radius_y: f64,
}

/// Screen regions from the last draw, used to hit-test the mouse.
#[derive(Debug, Clone, Default)]
pub struct HitMap {
    pub rows: Vec<(Rect, EntryId)>,
    pub wheel: Option<WheelGeometry>,
}

impl HitMap {
    pub fn row_at(&self, col: u16, row: u16) -> Option<EntryId> {
        self.rows
            .iter()
            .find(|(r, _)| {
                col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height
            })
            .map(|(_, id)| *id)
    }
}

#[derive(Debug)]
pub struct AppState {
    pub nav: Navigator,
    pub library: Library,
    pub playback: PlaybackController,
    pub form: Option<FormState>,
    pub theme: ThemeName,
    pub stream_proxy: String,
    pub gamepad: bool,
    pub last_game_input: Option<GameInput>,
    pub runner: RunnerStatus,
    pub battery: Option<BatteryStatus>,
    pub toast: Option<Toast>,
    pub hits: HitMap,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(volume: u8) -> Self {
        Self {
            nav: Navigator::new(),
            library: Library::new(),
            playback: PlaybackController::new(volume),
            form: None,
            theme: ThemeName::default(),
            stream_proxy: String::new(),
            gamepad: false,
            last_game_input: None,
            runner: RunnerStatus::Idle,
            battery: None,
            toast: None,
            hits: HitMap::default(),
            should_quit: false,
        }
    }

    pub fn menu_context(&self) -> MenuContext<'_> {
        MenuContext {
            library: &self.library,
            theme: self.theme,
        }
    }

    pub fn current_menu(&self) -> Option<Vec<MenuEntry>> {
        menu::menu_for(self.nav.current(), &self.menu_context())
    }

    pub fn item_count(&self) -> usize {
        menu::item_count(self.nav.current(), &self.menu_context())
    }

    /// Status bar title: position within the playing list on the playback
    /// screens, the photo counter in the viewer, the screen name elsewhere.
    pub fn status_title(&self) -> String {
        let screen = self.nav.current();
        match screen {
            Screen::NowPlaying | Screen::VideoPlayer => {
                let Some(np) = self.playback.now_playing() else {
                    return screen.title().to_string();
                };
                let total = match np.media {
                    MediaRef::Song(_) => self.library.songs.len(),
                    MediaRef::Video(_) => self.library.videos.len(),
                    MediaRef::Fm(_) => self.library.fm.len(),
                };
                format!("{} of {}", np.media.index() + 1, total)
            }
            Screen::PhotoViewer if !self.library.photos.is_empty() => {
                let n = self.library.photos.len();
                format!("Photo {} of {}", self.nav.active().min(n - 1) + 1, n)
            }
            _ => screen.title().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::test_support::*;

    #[test]
    fn test_form_editing() {
        let mut form = FormState::for_screen(Screen::AddIptvLink, "").unwrap();
        for c in "News".chars() {
            form.input_char(c);
        }
        form.next_field();
        form.input_char('x');
        form.backspace();
        assert_eq!(form.value(0), "News");
        assert_eq!(form.value(1), "");
        form.prev_field();
        assert_eq!(form.focus, 0);
        assert!(FormState::for_screen(Screen::Music, "").is_none());
    }

    #[test]
    fn test_proxy_form_prefilled() {
        let form = FormState::for_screen(Screen::StreamProxy, "https://p/").unwrap();
        assert_eq!(form.value(0), "https://p/");
    }

    #[test]
    fn test_status_title_counts() {
        let mut state = AppState::new(80);
        state.library.songs.extend([song("a", "X"), song("b", "X"), song("c", "X")]);
        state.playback.play_song(&state.library, 1);
        state.nav.navigate_to(Screen::NowPlaying);
        assert_eq!(state.status_title(), "2 of 3");

        state.nav.go_back();
        assert_eq!(state.status_title(), "wheelpod");
    }

    #[test]
    fn test_hit_map_row_lookup() {
        let hits = HitMap {
            rows: vec![(Rect::new(2, 5, 10, 1), EntryId::Add)],
            wheel: None,
        };
        assert_eq!(hits.row_at(2, 5), Some(EntryId::Add));
        assert_eq!(hits.row_at(12, 5), None);
        assert_eq!(hits.row_at(3, 6), None);
    }
}
