//! Menu entries for every list screen and resolving a selection to what it
//! should do.

use crate::library::Library;
use crate::library::models::Collection;
use crate::nav::Screen;
use crate::tui::theme::ThemeName;

/// Titles listed on the games screen that have no playable implementation.
pub const UNAVAILABLE_GAMES: [&str; 9] = [
    "Solitaire",
    "Minesweeper",
    "Pac-Man",
    "Tetris",
    "Pong",
    "Space Invaders",
    "Asteroids",
    "Frogger",
    "Galaga",
];

pub const CLEAR_SUBTEXT: &str = "This action cannot be undone.";

/// Stable identity of a row, independent of its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryId {
    Screen(Screen),
    /// Index into the screen's backing registry.
    Item(usize),
    Add,
    Clear,
    Theme(ThemeName),
    Unavailable(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearTarget {
    Songs,
    Photos,
    Videos,
    Iptv,
    Fm,
    Apps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTarget {
    Navigate(Screen),
    PlaySong(usize),
    PlayVideo(usize),
    PlayFm(usize),
    LaunchApp(usize),
    Clear(ClearTarget),
    SetTheme(ThemeName),
    /// Resolved against what is playing: audio or video screen.
    ShowNowPlaying,
    Unavailable(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub id: EntryId,
    pub label: String,
    pub subtext: Option<String>,
    pub target: MenuTarget,
}

impl MenuEntry {
    fn new(id: EntryId, label: impl Into<String>, target: MenuTarget) -> Self {
        Self {
            id,
            label: label.into(),
            subtext: None,
            target,
        }
    }

    fn screen(label: &str, screen: Screen) -> Self {
        Self::new(EntryId::Screen(screen), label, MenuTarget::Navigate(screen))
    }

    fn with_subtext(mut self, subtext: impl Into<String>) -> Self {
        self.subtext = Some(subtext.into());
        self
    }

    fn clear(label: &str, target: ClearTarget) -> Self {
        Self::new(EntryId::Clear, label, MenuTarget::Clear(target)).with_subtext(CLEAR_SUBTEXT)
    }
}

pub struct MenuContext<'a> {
    pub library: &'a Library,
    pub theme: ThemeName,
}

/// Entries for a list screen; `None` for screens that are not lists.
pub fn menu_for(screen: Screen, ctx: &MenuContext<'_>) -> Option<Vec<MenuEntry>> {
    let lib = ctx.library;
    let entries = match screen {
        Screen::MainMenu => vec![
            MenuEntry::screen("Music", Screen::Music),
            MenuEntry::screen("Photos", Screen::Photos),
            MenuEntry::screen("Videos", Screen::Videos),
            MenuEntry::screen("Live TV", Screen::LiveTv),
            MenuEntry::screen("FM Radio", Screen::FmRadio),
            MenuEntry::screen("Extras", Screen::Extras),
            MenuEntry::screen("Shuffle Songs", Screen::ShufflePlay),
            MenuEntry::new(
                EntryId::Screen(Screen::NowPlaying),
                "Now Playing",
                MenuTarget::ShowNowPlaying,
            ),
            MenuEntry::screen("Settings", Screen::Settings),
        ],
        Screen::Music => vec![
            MenuEntry::screen("Cover Flow", Screen::CoverFlow),
            MenuEntry::screen("All Songs", Screen::SongList),
            MenuEntry::screen("Add Music", Screen::Import(Collection::Songs)),
        ],
        Screen::SongList => {
            let mut entries: Vec<_> = lib
                .songs
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    MenuEntry::new(EntryId::Item(i), &s.name, MenuTarget::PlaySong(i))
                        .with_subtext(&s.artist)
                })
                .collect();
            if !lib.songs.is_empty() {
                entries.push(MenuEntry::clear("[Clear All Songs]", ClearTarget::Songs));
            }
            entries
        }
        Screen::Photos => {
            let mut entries = vec![
                MenuEntry::screen("View Photos", Screen::PhotoViewer)
                    .with_subtext(format!("{} photos", lib.photos.len())),
                MenuEntry::new(
                    EntryId::Add,
                    "Add Photos",
                    MenuTarget::Navigate(Screen::Import(Collection::Photos)),
                ),
            ];
            if !lib.photos.is_empty() {
                entries.push(MenuEntry::clear("[Clear All Photos]", ClearTarget::Photos));
            }
            entries
        }
        Screen::Videos => vec![
            MenuEntry::screen("View Videos", Screen::VideoList),
            MenuEntry::screen("Add Videos", Screen::Import(Collection::Videos)),
            MenuEntry::screen("Add YouTube Link", Screen::AddYoutubeVideo),
            MenuEntry::screen("Add Online Video", Screen::AddOnlineVideo),
        ],
        Screen::VideoList => {
            let mut entries: Vec<_> = lib
                .videos
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    MenuEntry::new(EntryId::Item(i), &v.name, MenuTarget::PlayVideo(i))
                        .with_subtext(v.origin_label())
                })
                .collect();
            if !lib.videos.is_empty() {
                entries.push(MenuEntry::clear("[Clear All Videos]", ClearTarget::Videos));
            }
            entries
        }
        Screen::LiveTv => {
            let channels = lib.iptv_indices();
            let has_channels = !channels.is_empty();
            let mut entries: Vec<_> = channels
                .into_iter()
                .filter_map(|i| {
                    let v = lib.videos.get(i)?;
                    Some(MenuEntry::new(EntryId::Item(i), &v.name, MenuTarget::PlayVideo(i)))
                })
                .collect();
            entries.push(MenuEntry::new(
                EntryId::Add,
                "Add IPTV Link",
                MenuTarget::Navigate(Screen::AddIptvLink),
            ));
            if has_channels {
                entries.push(MenuEntry::clear("[Clear All Channels]", ClearTarget::Iptv));
            }
            entries
        }
        Screen::FmRadio => {
            let mut entries: Vec<_> = lib
                .fm
                .iter()
                .enumerate()
                .map(|(i, c)| MenuEntry::new(EntryId::Item(i), &c.name, MenuTarget::PlayFm(i)))
                .collect();
            entries.push(MenuEntry::new(
                EntryId::Add,
                "Add Channel",
                MenuTarget::Navigate(Screen::AddFmChannel),
            ));
            if !lib.fm.is_empty() {
                entries.push(MenuEntry::clear("[Clear All Stations]", ClearTarget::Fm));
            }
            entries
        }
        Screen::Extras => vec![
            MenuEntry::screen("Games", Screen::Games),
            MenuEntry::screen("Apps", Screen::Apps),
        ],
        Screen::Games => {
            let mut entries = vec![
                MenuEntry::screen("Brick Breaker", Screen::BrickBreaker),
                MenuEntry::screen("Snake", Screen::Snake),
            ];
            entries.extend(UNAVAILABLE_GAMES.iter().enumerate().map(|(i, title)| {
                MenuEntry::new(EntryId::Unavailable(i), *title, MenuTarget::Unavailable(*title))
                    .with_subtext("Coming soon")
            }));
            entries
        }
        Screen::Apps => {
            let mut entries: Vec<_> = lib
                .apps
                .iter()
                .enumerate()
                .map(|(i, a)| MenuEntry::new(EntryId::Item(i), &a.name, MenuTarget::LaunchApp(i)))
                .collect();
            entries.push(MenuEntry::new(
                EntryId::Add,
                "Add App",
                MenuTarget::Navigate(Screen::Import(Collection::Apps)),
            ));
            if !lib.apps.is_empty() {
                entries.push(MenuEntry::clear("[Clear All Apps]", ClearTarget::Apps));
            }
            entries
        }
        Screen::Settings => vec![
            MenuEntry::screen("Themes", Screen::Themes),
            MenuEntry::screen("Stream Proxy", Screen::StreamProxy),
            MenuEntry::screen("About", Screen::About),
        ],
        Screen::Themes => ThemeName::ALL
            .iter()
            .map(|&t| {
                let e = MenuEntry::new(EntryId::Theme(t), t.label(), MenuTarget::SetTheme(t));
                if t == ctx.theme { e.with_subtext("Current") } else { e }
            })
            .collect(),
        _ => return None,
    };
    Some(entries)
}

/// How a selection names its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The active index, from the center button.
    Index(usize),
    /// An explicit id, from clicking a row.
    Id(EntryId),
}

/// Finds the selected entry and its position. An out-of-range index or an
/// unknown id selects nothing.
pub fn resolve(entries: &[MenuEntry], selection: Selection) -> Option<(usize, &MenuEntry)> {
    match selection {
        Selection::Index(i) => entries.get(i).map(|e| (i, e)),
        Selection::Id(id) => entries.iter().enumerate().find(|(_, e)| e.id == id),
    }
}

/// How many positions the wheel scrolls through on `screen`.
pub fn item_count(screen: Screen, ctx: &MenuContext<'_>) -> usize {
    if let Some(entries) = menu_for(screen, ctx) {
        return entries.len();
    }
    match screen {
        Screen::CoverFlow => ctx.library.albums().len(),
        Screen::PhotoViewer => ctx.library.photos.len(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::test_support::*;

    fn labels(entries: &[MenuEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.label.as_str()).collect()
    }

    fn ctx(lib: &Library) -> MenuContext<'_> {
        MenuContext {
            library: lib,
            theme: ThemeName::Classic,
        }
    }

    #[test]
    fn test_main_menu_order() {
        let lib = Library::new();
        let entries = menu_for(Screen::MainMenu, &ctx(&lib)).unwrap();
        assert_eq!(
            labels(&entries),
            vec![
                "Music",
                "Photos",
                "Videos",
                "Live TV",
                "FM Radio",
                "Extras",
                "Shuffle Songs",
                "Now Playing",
                "Settings"
            ]
        );
        assert_eq!(entries[7].target, MenuTarget::ShowNowPlaying);
    }

    #[test]
    fn test_clear_only_when_non_empty() {
        let mut lib = Library::new();
        let songs = menu_for(Screen::SongList, &ctx(&lib)).unwrap();
        assert!(songs.is_empty());
        let fm_menu = menu_for(Screen::FmRadio, &ctx(&lib)).unwrap();
        assert_eq!(labels(&fm_menu), vec!["Add Channel"]);

        lib.songs.push(song("a", "X"));
        lib.fm.push(fm("jazz"));
        let songs = menu_for(Screen::SongList, &ctx(&lib)).unwrap();
        assert_eq!(labels(&songs), vec!["Song a", "[Clear All Songs]"]);
        assert_eq!(songs[1].subtext.as_deref(), Some(CLEAR_SUBTEXT));
        let fm_menu = menu_for(Screen::FmRadio, &ctx(&lib)).unwrap();
        assert_eq!(labels(&fm_menu), vec!["Radio jazz", "Add Channel", "[Clear All Stations]"]);
    }

    #[test]
    fn test_live_tv_lists_registry_indices() {
        let mut lib = Library::new();
        lib.videos.push(local_video("v"));
        lib.videos.push(iptv("t", "https://tv.example/t.m3u8"));
        let entries = menu_for(Screen::LiveTv, &ctx(&lib)).unwrap();
        assert_eq!(entries[0].target, MenuTarget::PlayVideo(1));
        assert_eq!(entries[1].id, EntryId::Add);
        assert_eq!(entries[2].target, MenuTarget::Clear(ClearTarget::Iptv));
    }

    #[test]
    fn test_resolve_by_index_and_id() {
        let lib = Library::new();
        let entries = menu_for(Screen::Settings, &ctx(&lib)).unwrap();
        let (i, e) = resolve(&entries, Selection::Id(EntryId::Screen(Screen::About))).unwrap();
        assert_eq!(i, 2);
        assert_eq!(e.target, MenuTarget::Navigate(Screen::About));
        assert!(resolve(&entries, Selection::Index(3)).is_none());
        assert!(resolve(&entries, Selection::Id(EntryId::Clear)).is_none());
    }

    #[test]
    fn test_entry_ids_unique_per_menu() {
        let mut lib = Library::new();
        lib.songs.extend([song("a", "X"), song("b", "Y")]);
        lib.fm.push(fm("jazz"));
        for screen in [Screen::MainMenu, Screen::SongList, Screen::FmRadio, Screen::Themes] {
            let entries = menu_for(screen, &ctx(&lib)).unwrap();
            let ids: std::collections::HashSet<EntryId> = entries.iter().map(|e| e.id).collect();
            assert_eq!(ids.len(), entries.len(), "{screen:?}");
        }
        let themes = menu_for(Screen::Themes, &ctx(&lib)).unwrap();
        assert!(themes.iter().any(|e| e.id == EntryId::Theme(ThemeName::Gold)));
    }

    #[test]
    fn test_games_list_unavailable_titles() {
        let lib = Library::new();
        let entries = menu_for(Screen::Games, &ctx(&lib)).unwrap();
        assert_eq!(entries.len(), 2 + UNAVAILABLE_GAMES.len());
        assert_eq!(entries[2].target, MenuTarget::Unavailable("Solitaire"));
    }

    #[test]
    fn test_non_list_screens_count_their_items() {
        let mut lib = Library::new();
        lib.songs.extend([song("a", "X"), song("b", "Y"), song("c", "X")]);
        assert!(menu_for(Screen::CoverFlow, &ctx(&lib)).is_none());
        assert_eq!(item_count(Screen::CoverFlow, &ctx(&lib)), 2);
        assert_eq!(item_count(Screen::NowPlaying, &ctx(&lib)), 0);
        assert_eq!(item_count(Screen::SongList, &ctx(&lib)), 4);
    }
}
