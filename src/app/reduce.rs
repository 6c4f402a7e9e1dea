//! The synchronous state machine: every action mutates `AppState` and hands
//! back the side effects the app loop must perform.

use super::actions::{Action, Effect, PersistOp};
use super::state::{AppState, FormState, GameInput, RunnerStatus, Toast};
use crate::input::wheel::WheelEvent;
use crate::library::links::{self, LinkError};
use crate::library::models::{Collection, FmChannel, MediaItem, RemoteLink, Video};
use crate::menu::{self, ClearTarget, MenuTarget, Selection};
use crate::nav::{Screen, ScrollDirection};
use crate::player::PlayerCommand;
use crate::player::controller::MediaRef;
use crate::storage::keys;
use rand::Rng;
use std::path::PathBuf;

pub const VOLUME_STEP: i16 = 5;
pub const YOUTUBE_LOOKUP_FAILED: &str = "Could not fetch video title. Please check the URL.";

#[derive(Debug, Clone, Copy)]
enum StreamKind {
    Iptv,
    Online,
}

impl AppState {
    pub fn dispatch(&mut self, action: Action) -> Vec<Effect> {
        let effects = self.reduce(action);
        self.sync_screen_state();
        effects
    }

    fn reduce(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::Quit => {
                self.should_quit = true;
                Vec::new()
            }
            Action::Resize => Vec::new(),
            Action::Wheel(ev) => self.on_wheel(ev),
            Action::SelectId(id) => self.select(Selection::Id(id)),
            Action::Seek(direction) => player(self.playback.seek(direction)),
            Action::Volume(delta) => player(self.playback.adjust_volume(delta)),

            Action::FormChar(c) => {
                if let Some(form) = self.form.as_mut().filter(|f| !f.busy) {
                    form.input_char(c);
                }
                Vec::new()
            }
            Action::FormBackspace => {
                if let Some(form) = self.form.as_mut().filter(|f| !f.busy) {
                    form.backspace();
                }
                Vec::new()
            }
            Action::FormNextField => {
                if let Some(form) = self.form.as_mut() {
                    form.next_field();
                }
                Vec::new()
            }
            Action::FormPrevField => {
                if let Some(form) = self.form.as_mut() {
                    form.prev_field();
                }
                Vec::new()
            }
            Action::FormSubmit => self.submit_form(),

            Action::MediaImported {
                collection,
                items,
                failed,
            } => self.on_imported(collection, items, failed),
            Action::ImportFailed {
                collection,
                message,
            } => {
                match self.form_on(Screen::Import(collection)) {
                    Some(form) => {
                        form.busy = false;
                        form.error = Some(message);
                    }
                    None => self.toast = Some(Toast::error(message)),
                }
                Vec::new()
            }
            Action::YoutubeTitle { video_id, title } => self.on_youtube_title(video_id, title),
            Action::Player { transport, event } => {
                player(self.playback.handle_event(&self.library, transport, event))
            }
            Action::LoadTimeout { generation } => player(self.playback.on_load_timeout(generation)),
            Action::Battery(status) => {
                self.battery = status;
                Vec::new()
            }
            Action::AppExited { name, result } => {
                self.runner = match result {
                    Ok(()) => RunnerStatus::Exited(name),
                    Err(msg) => RunnerStatus::Failed(msg),
                };
                Vec::new()
            }
        }
    }

    /// Keeps screen-scoped state in step with the navigator: a form exists
    /// exactly while a form screen is showing, gamepad mode only on games.
    fn sync_screen_state(&mut self) {
        let screen = self.nav.current();
        if !screen.is_form() {
            self.form = None;
        } else if self.form.is_none() {
            self.form = FormState::for_screen(screen, &self.stream_proxy);
        }
        if !screen.is_game() {
            self.gamepad = false;
            self.last_game_input = None;
        }
    }

    fn form_on(&mut self, screen: Screen) -> Option<&mut FormState> {
        if self.nav.current() == screen {
            self.form.as_mut()
        } else {
            None
        }
    }

    fn form_value(&self, i: usize) -> String {
        self.form
            .as_ref()
            .map(|f| f.value(i).to_string())
            .unwrap_or_default()
    }

    fn on_wheel(&mut self, ev: WheelEvent) -> Vec<Effect> {
        let screen = self.nav.current();
        if screen.is_game() {
            if ev == WheelEvent::SecondaryAction {
                self.gamepad = !self.gamepad;
                self.last_game_input = None;
                return Vec::new();
            }
            if self.gamepad {
                self.last_game_input = Some(game_input(ev));
                return Vec::new();
            }
        }

        match ev {
            WheelEvent::Scroll(direction) => self.on_scroll(direction),
            WheelEvent::Select | WheelEvent::SecondaryAction => {
                self.select(Selection::Index(self.nav.active()))
            }
            WheelEvent::Menu => {
                self.nav.go_back();
                Vec::new()
            }
            WheelEvent::PlayPause => self.play_pause(),
            WheelEvent::Next => player(self.playback.next(&self.library).unwrap_or_default()),
            WheelEvent::Prev => player(self.playback.prev(&self.library).unwrap_or_default()),
        }
    }

    fn on_scroll(&mut self, direction: ScrollDirection) -> Vec<Effect> {
        let screen = self.nav.current();
        match screen {
            Screen::NowPlaying | Screen::VideoPlayer => {
                let delta = match direction {
                    ScrollDirection::Down => VOLUME_STEP,
                    ScrollDirection::Up => -VOLUME_STEP,
                };
                player(self.playback.adjust_volume(delta))
            }
            s if s.is_form() => {
                if let Some(form) = self.form.as_mut() {
                    match direction {
                        ScrollDirection::Down => form.next_field(),
                        ScrollDirection::Up => form.prev_field(),
                    }
                }
                Vec::new()
            }
            _ => {
                let count = self.item_count();
                self.nav.scroll(direction, count);
                Vec::new()
            }
        }
    }

    fn select(&mut self, selection: Selection) -> Vec<Effect> {
        let screen = self.nav.current();
        if screen.is_form() {
            return self.submit_form();
        }

        if let Some(entries) = self.current_menu() {
            let Some((i, entry)) = menu::resolve(&entries, selection) else {
                return Vec::new();
            };
            let target = entry.target;
            self.nav.set_active(i);
            return self.apply_target(target);
        }

        let active = self.nav.active();
        match screen {
            Screen::CoverFlow => match self.library.albums().get(active) {
                Some(album) => self.play(MediaRef::Song(album.first_song)),
                None => Vec::new(),
            },
            Screen::ShufflePlay => {
                let n = self.library.songs.len();
                if n == 0 {
                    self.toast = Some(Toast::error("No songs to shuffle"));
                    return Vec::new();
                }
                let i = rand::rng().random_range(0..n);
                self.play(MediaRef::Song(i))
            }
            Screen::PhotoViewer => {
                let n = self.library.photos.len();
                match self.library.photos.get(active.min(n.saturating_sub(1))) {
                    Some(photo) => vec![Effect::OpenExternal(photo.url.path().to_path_buf())],
                    None => Vec::new(),
                }
            }
            Screen::NowPlaying | Screen::VideoPlayer => self.play_pause(),
            _ => Vec::new(),
        }
    }

    fn apply_target(&mut self, target: MenuTarget) -> Vec<Effect> {
        match target {
            MenuTarget::Navigate(screen) => {
                self.nav.navigate_to(screen);
                Vec::new()
            }
            MenuTarget::PlaySong(i) => self.play(MediaRef::Song(i)),
            MenuTarget::PlayVideo(i) => self.play(MediaRef::Video(i)),
            MenuTarget::PlayFm(i) => self.play(MediaRef::Fm(i)),
            MenuTarget::LaunchApp(i) => {
                let Some(app) = self.library.apps.get(i) else {
                    return Vec::new();
                };
                let (name, jar) = (app.name.clone(), app.url.path().to_path_buf());
                self.nav.navigate_to(Screen::J2meRunner);
                self.runner = RunnerStatus::Running(name.clone());
                vec![Effect::LaunchApp { name, jar }]
            }
            MenuTarget::Clear(target) => self.clear(target),
            MenuTarget::SetTheme(theme) => {
                self.theme = theme;
                self.toast = Some(Toast::success(format!("Theme set to {}", theme.label())));
                vec![Effect::Persist(PersistOp::SetSetting {
                    key: keys::THEME,
                    value: theme.key().to_string(),
                })]
            }
            MenuTarget::ShowNowPlaying => {
                let playing_video = self
                    .playback
                    .now_playing()
                    .is_some_and(|np| matches!(np.media, MediaRef::Video(_)));
                let screen = if playing_video {
                    Screen::VideoPlayer
                } else {
                    Screen::NowPlaying
                };
                self.nav.navigate_to(screen);
                Vec::new()
            }
            MenuTarget::Unavailable(title) => {
                self.toast = Some(Toast::error(format!("{title} is not available yet")));
                Vec::new()
            }
        }
    }

    /// Starts `media` and shows its playback screen unless that screen is
    /// already showing.
    fn play(&mut self, media: MediaRef) -> Vec<Effect> {
        let cmds = match media {
            MediaRef::Song(i) => self.playback.play_song(&self.library, i),
            MediaRef::Video(i) => self.playback.play_video(&self.library, i),
            MediaRef::Fm(i) => self.playback.play_fm(&self.library, i),
        };
        let Some(cmds) = cmds else {
            return Vec::new();
        };
        let screen = match media {
            MediaRef::Video(_) => Screen::VideoPlayer,
            MediaRef::Song(_) | MediaRef::Fm(_) => Screen::NowPlaying,
        };
        if self.nav.current() != screen {
            self.nav.navigate_to(screen);
        }
        player(cmds)
    }

    fn play_pause(&mut self) -> Vec<Effect> {
        let was_idle = self.playback.now_playing().is_none();
        let Some(cmds) = self.playback.play_pause(&self.library) else {
            return Vec::new();
        };
        if was_idle && self.nav.current() != Screen::NowPlaying {
            self.nav.navigate_to(Screen::NowPlaying);
        }
        player(cmds)
    }

    fn clear(&mut self, target: ClearTarget) -> Vec<Effect> {
        let mut persist = Vec::new();
        let (removed, noun) = match target {
            ClearTarget::Songs => {
                persist.push(PersistOp::ClearCollection(Collection::Songs));
                (self.library.songs.clear().len(), "songs")
            }
            ClearTarget::Photos => {
                persist.push(PersistOp::ClearCollection(Collection::Photos));
                (self.library.photos.clear().len(), "photos")
            }
            ClearTarget::Apps => {
                persist.push(PersistOp::ClearCollection(Collection::Apps));
                (self.library.apps.clear().len(), "apps")
            }
            ClearTarget::Videos => {
                persist.push(PersistOp::ClearCollection(Collection::Videos));
                persist.push(PersistOp::SaveRemoteLinks(Vec::new()));
                (self.library.videos.clear().len(), "videos")
            }
            ClearTarget::Iptv => {
                let n = self.library.videos.remove_where(|v| v.is_iptv()).len();
                persist.push(PersistOp::SaveRemoteLinks(self.library.remote_links()));
                (n, "channels")
            }
            ClearTarget::Fm => {
                persist.push(PersistOp::SaveFmChannels(Vec::new()));
                (self.library.fm.clear().len(), "stations")
            }
        };
        self.nav.reset_active();
        self.toast = Some(Toast::success(format!("Cleared {removed} {noun}")));

        let mut effects = player(self.playback.reconcile(&self.library));
        effects.extend(persist.into_iter().map(Effect::Persist));
        effects
    }

    fn submit_form(&mut self) -> Vec<Effect> {
        if self.form.as_ref().is_none_or(|f| f.busy) {
            return Vec::new();
        }
        let result = match self.nav.current() {
            Screen::AddYoutubeVideo => self.submit_youtube(),
            Screen::AddIptvLink => self.submit_stream_link(StreamKind::Iptv),
            Screen::AddOnlineVideo => self.submit_stream_link(StreamKind::Online),
            Screen::AddFmChannel => self.submit_fm(),
            Screen::StreamProxy => self.submit_proxy(),
            Screen::Import(collection) => self.submit_import(collection),
            _ => Ok(Vec::new()),
        };
        match result {
            Ok(effects) => effects,
            Err(msg) => {
                if let Some(form) = self.form.as_mut() {
                    form.error = Some(msg);
                }
                Vec::new()
            }
        }
    }

    fn submit_youtube(&mut self) -> Result<Vec<Effect>, String> {
        let video_id = links::parse_youtube_url(&self.form_value(0))
            .map_err(|e| e.to_string())?;
        if self.library.videos.contains(&youtube_id(&video_id)) {
            return Err("This video is already in your library.".to_string());
        }
        if let Some(form) = self.form.as_mut() {
            form.busy = true;
            form.error = None;
        }
        Ok(vec![Effect::LookupYoutubeTitle { video_id }])
    }

    fn submit_stream_link(&mut self, kind: StreamKind) -> Result<Vec<Effect>, String> {
        let (name, url) = links::validate_stream_link(&self.form_value(0), &self.form_value(1))
            .map_err(|e| e.to_string())?;
        let link = match kind {
            StreamKind::Iptv => RemoteLink::Iptv {
                id: self.library.fresh_link_id("iptv"),
                name: name.clone(),
                url,
            },
            StreamKind::Online => RemoteLink::Online {
                id: self.library.fresh_link_id("online"),
                name: name.clone(),
                url,
            },
        };
        self.library.videos.push(Video::from_link(link));
        self.toast = Some(Toast::success(format!("Added {name}")));
        self.nav.go_back();
        Ok(vec![Effect::Persist(PersistOp::SaveRemoteLinks(
            self.library.remote_links(),
        ))])
    }

    fn submit_fm(&mut self) -> Result<Vec<Effect>, String> {
        let (name, url) = links::validate_stream_link(&self.form_value(0), &self.form_value(1))
            .map_err(|e| e.to_string())?;
        let id = self.library.fresh_link_id("fm");
        self.library.fm.push(FmChannel {
            id,
            name: name.clone(),
            url,
        });
        self.toast = Some(Toast::success(format!("Added {name}")));
        self.nav.go_back();
        Ok(vec![Effect::Persist(PersistOp::SaveFmChannels(
            self.library.fm_channels(),
        ))])
    }

    fn submit_proxy(&mut self) -> Result<Vec<Effect>, String> {
        let proxy = self.form_value(0).trim().to_string();
        if !proxy.is_empty() && !proxy.starts_with("http://") && !proxy.starts_with("https://") {
            return Err(LinkError::InvalidUrl.to_string());
        }
        self.stream_proxy = proxy.clone();
        self.playback.set_proxy(proxy.clone());
        self.toast = Some(Toast::success(if proxy.is_empty() {
            "Stream proxy cleared"
        } else {
            "Stream proxy saved"
        }));
        self.nav.go_back();
        Ok(vec![Effect::Persist(PersistOp::SetSetting {
            key: keys::STREAM_PROXY,
            value: proxy,
        })])
    }

    fn submit_import(&mut self, collection: Collection) -> Result<Vec<Effect>, String> {
        let raw = self.form_value(0);
        let raw = raw.trim();
        if raw.is_empty() {
            return Err("Please enter a file or folder path.".to_string());
        }
        let path = expand_home(raw);
        if !path.exists() {
            return Err(format!("{} does not exist.", path.display()));
        }
        if let Some(form) = self.form.as_mut() {
            form.busy = true;
            form.error = None;
        }
        Ok(vec![Effect::Import { collection, path }])
    }

    fn on_imported(
        &mut self,
        collection: Collection,
        items: Vec<MediaItem>,
        failed: usize,
    ) -> Vec<Effect> {
        let total = items.len();
        let added = items
            .into_iter()
            .map(|item| self.library.add(item))
            .filter(|&added| added)
            .count();

        let mut msg = format!("Imported {added} {}", noun(collection));
        if total > added {
            msg.push_str(&format!(", {} already added", total - added));
        }
        if failed > 0 {
            msg.push_str(&format!(", {failed} failed"));
        }
        self.toast = Some(if added == 0 && failed > 0 {
            Toast::error(msg)
        } else {
            Toast::success(msg)
        });

        if self.nav.current() == Screen::Import(collection) {
            self.nav.go_back();
        }
        Vec::new()
    }

    fn on_youtube_title(&mut self, video_id: String, title: Option<String>) -> Vec<Effect> {
        let on_form = self.nav.current() == Screen::AddYoutubeVideo
            && self.form.as_ref().is_some_and(|f| f.busy);
        if on_form && let Some(form) = self.form.as_mut() {
            form.busy = false;
        }

        let Some(title) = title else {
            match self.form.as_mut().filter(|_| on_form) {
                Some(form) => form.error = Some(YOUTUBE_LOOKUP_FAILED.to_string()),
                None => self.toast = Some(Toast::error(YOUTUBE_LOOKUP_FAILED)),
            }
            return Vec::new();
        };

        let video = Video::from_link(RemoteLink::Youtube {
            id: youtube_id(&video_id),
            name: title.clone(),
            video_id,
        });
        if !self.library.add(MediaItem::Video(video)) {
            return Vec::new();
        }
        self.toast = Some(Toast::success(format!("Added {title}")));
        if on_form {
            self.nav.go_back();
        }
        vec![Effect::Persist(PersistOp::SaveRemoteLinks(
            self.library.remote_links(),
        ))]
    }
}

fn player(cmds: Vec<PlayerCommand>) -> Vec<Effect> {
    cmds.into_iter().map(Effect::Player).collect()
}

fn game_input(ev: WheelEvent) -> GameInput {
    match ev {
        WheelEvent::Menu => GameInput::Up,
        WheelEvent::PlayPause => GameInput::Down,
        WheelEvent::Prev | WheelEvent::Scroll(ScrollDirection::Up) => GameInput::Left,
        WheelEvent::Next | WheelEvent::Scroll(ScrollDirection::Down) => GameInput::Right,
        WheelEvent::Select | WheelEvent::SecondaryAction => GameInput::Fire,
    }
}

pub fn youtube_id(video_id: &str) -> String {
    format!("yt-{video_id}")
}

fn noun(collection: Collection) -> &'static str {
    match collection {
        Collection::Songs => "songs",
        Collection::Photos => "photos",
        Collection::Videos => "videos",
        Collection::Apps => "apps",
    }
}

fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/")
        && let Some(dirs) = directories::BaseDirs::new()
    {
        return dirs.home_dir().join(rest);
    }
    PathBuf::from(raw)
}
