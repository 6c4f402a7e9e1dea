//! Now-playing state machine.
//!
//! The controller decides what should play and on which transport, and
//! expresses every side effect as a [`PlayerCommand`] for the app to carry
//! out. It never touches a process or socket itself.

use crate::app::events::PlayerEvent;
use crate::library::Library;
use crate::library::links::{is_hls, watch_url, with_proxy};
use crate::library::models::VideoSource;

pub const SEEK_STEP_SECS: f64 = 5.0;
/// `prev` restarts the current track instead once playback is past this.
pub const RESTART_THRESHOLD_SECS: f64 = 3.0;

/// The player backend a piece of media runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    /// Shared player for local files and plain remote streams.
    Native,
    /// Dedicated YouTube player; reports position only when polled.
    Embedded,
    /// Dedicated HLS player.
    Stream,
}

impl Transport {
    pub fn label(self) -> &'static str {
        match self {
            Transport::Native => "native",
            Transport::Embedded => "youtube",
            Transport::Stream => "hls",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaRef {
    Song(usize),
    Video(usize),
    Fm(usize),
}

impl MediaRef {
    pub fn index(self) -> usize {
        match self {
            MediaRef::Song(i) | MediaRef::Video(i) | MediaRef::Fm(i) => i,
        }
    }

    fn with_index(self, i: usize) -> Self {
        match self {
            MediaRef::Song(_) => MediaRef::Song(i),
            MediaRef::Video(_) => MediaRef::Video(i),
            MediaRef::Fm(_) => MediaRef::Fm(i),
        }
    }

    fn registry_len(self, lib: &Library) -> usize {
        match self {
            MediaRef::Song(_) => lib.songs.len(),
            MediaRef::Video(_) => lib.videos.len(),
            MediaRef::Fm(_) => lib.fm.len(),
        }
    }
}

/// What is playing. The id lets the index be re-resolved after the
/// registry changes underneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub media: MediaRef,
    pub id: String,
    pub transport: Transport,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackStatus {
    Idle,
    Loading,
    Playing,
    Paused,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    Load { transport: Transport, url: String },
    /// Stop whatever the transport is playing but keep it alive.
    Stop(Transport),
    /// Shut the transport's player down entirely.
    TearDown(Transport),
    SetPaused { transport: Transport, paused: bool },
    SeekBy { transport: Transport, seconds: f64 },
    SeekTo { transport: Transport, seconds: f64 },
    SetVolume { transport: Transport, volume: u8 },
    StartPolling,
    StopPolling,
    /// Fail the load if it has not started when the timer fires.
    ArmTimeout { generation: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekDirection {
    Forward,
    Back,
}

#[derive(Debug)]
pub struct PlaybackController {
    now_playing: Option<NowPlaying>,
    status: PlaybackStatus,
    position: f64,
    duration: f64,
    generation: u64,
    proxy: String,
    volume: u8,
}

impl PlaybackController {
    pub fn new(volume: u8) -> Self {
        Self {
            now_playing: None,
            status: PlaybackStatus::Idle,
            position: 0.0,
            duration: 0.0,
            generation: 0,
            proxy: String::new(),
            volume: volume.min(100),
        }
    }

    pub fn now_playing(&self) -> Option<&NowPlaying> {
        self.now_playing.as_ref()
    }

    pub fn status(&self) -> &PlaybackStatus {
        &self.status
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn set_proxy(&mut self, proxy: impl Into<String>) {
        self.proxy = proxy.into();
    }

    pub fn play_song(&mut self, lib: &Library, index: usize) -> Option<Vec<PlayerCommand>> {
        let song = lib.songs.get(index)?;
        let (id, url) = (song.id.clone(), song.url.as_url());
        Some(self.start(MediaRef::Song(index), id, Transport::Native, url, false))
    }

    pub fn play_video(&mut self, lib: &Library, index: usize) -> Option<Vec<PlayerCommand>> {
        let video = lib.videos.get(index)?;
        let (transport, url, remote) = match &video.source {
            VideoSource::Local { url, .. } => (Transport::Native, url.as_url(), false),
            VideoSource::YouTube { video_id } => (Transport::Embedded, watch_url(video_id), true),
            VideoSource::Iptv { url } | VideoSource::Online { url } => {
                (stream_transport(url), with_proxy(&self.proxy, url), true)
            }
        };
        let id = video.id.clone();
        Some(self.start(MediaRef::Video(index), id, transport, url, remote))
    }

    pub fn play_fm(&mut self, lib: &Library, index: usize) -> Option<Vec<PlayerCommand>> {
        let channel = lib.fm.get(index)?;
        let transport = stream_transport(&channel.url);
        let url = with_proxy(&self.proxy, &channel.url);
        let id = channel.id.clone();
        Some(self.start(MediaRef::Fm(index), id, transport, url, true))
    }

    fn play_ref(&mut self, lib: &Library, media: MediaRef) -> Option<Vec<PlayerCommand>> {
        match media {
            MediaRef::Song(i) => self.play_song(lib, i),
            MediaRef::Video(i) => self.play_video(lib, i),
            MediaRef::Fm(i) => self.play_fm(lib, i),
        }
    }

    fn start(
        &mut self,
        media: MediaRef,
        id: String,
        transport: Transport,
        url: String,
        remote: bool,
    ) -> Vec<PlayerCommand> {
        let mut cmds = self.release_current(Some(transport));
        self.generation += 1;
        cmds.push(PlayerCommand::Load { transport, url });
        if transport == Transport::Embedded {
            cmds.push(PlayerCommand::StartPolling);
        }
        if remote {
            cmds.push(PlayerCommand::ArmTimeout {
                generation: self.generation,
            });
        }
        self.now_playing = Some(NowPlaying {
            media,
            id,
            transport,
        });
        self.status = PlaybackStatus::Loading;
        self.position = 0.0;
        self.duration = 0.0;
        cmds
    }

    /// Commands that free the current transport before `next` takes over.
    /// Foreign players are always torn down; the native one is only stopped
    /// when playback moves elsewhere.
    fn release_current(&self, next: Option<Transport>) -> Vec<PlayerCommand> {
        let Some(np) = &self.now_playing else {
            return Vec::new();
        };
        match np.transport {
            Transport::Embedded => vec![
                PlayerCommand::StopPolling,
                PlayerCommand::TearDown(Transport::Embedded),
            ],
            Transport::Stream => vec![PlayerCommand::TearDown(Transport::Stream)],
            Transport::Native if next != Some(Transport::Native) => {
                vec![PlayerCommand::Stop(Transport::Native)]
            }
            Transport::Native => Vec::new(),
        }
    }

    /// Toggles play state. With nothing loaded it starts the first song, and
    /// a failed item is retried. `None` means there was nothing to do.
    pub fn play_pause(&mut self, lib: &Library) -> Option<Vec<PlayerCommand>> {
        let Some(np) = self.now_playing.clone() else {
            return self.play_song(lib, 0);
        };
        match self.status {
            PlaybackStatus::Failed(_) | PlaybackStatus::Idle => self.play_ref(lib, np.media),
            PlaybackStatus::Paused => {
                self.status = PlaybackStatus::Playing;
                Some(vec![PlayerCommand::SetPaused {
                    transport: np.transport,
                    paused: false,
                }])
            }
            PlaybackStatus::Playing | PlaybackStatus::Loading => {
                self.status = PlaybackStatus::Paused;
                Some(vec![PlayerCommand::SetPaused {
                    transport: np.transport,
                    paused: true,
                }])
            }
        }
    }

    /// Advances within the current media's own registry, wrapping.
    pub fn next(&mut self, lib: &Library) -> Option<Vec<PlayerCommand>> {
        let media = self.now_playing.as_ref()?.media;
        let len = media.registry_len(lib);
        if len == 0 {
            return None;
        }
        let i = (media.index() + 1) % len;
        self.play_ref(lib, media.with_index(i))
    }

    /// Restarts the current item when past the threshold, otherwise steps
    /// back, wrapping.
    pub fn prev(&mut self, lib: &Library) -> Option<Vec<PlayerCommand>> {
        let np = self.now_playing.as_ref()?;
        let (media, transport) = (np.media, np.transport);
        if self.position > RESTART_THRESHOLD_SECS {
            self.position = 0.0;
            return Some(vec![PlayerCommand::SeekTo {
                transport,
                seconds: 0.0,
            }]);
        }
        let len = media.registry_len(lib);
        if len == 0 {
            return None;
        }
        let i = (media.index() + len - 1) % len;
        self.play_ref(lib, media.with_index(i))
    }

    pub fn seek(&mut self, direction: SeekDirection) -> Vec<PlayerCommand> {
        let Some(np) = &self.now_playing else {
            return Vec::new();
        };
        let seconds = match direction {
            SeekDirection::Forward => SEEK_STEP_SECS,
            SeekDirection::Back => -SEEK_STEP_SECS,
        };
        vec![PlayerCommand::SeekBy {
            transport: np.transport,
            seconds,
        }]
    }

    pub fn set_volume(&mut self, volume: u8) -> Vec<PlayerCommand> {
        self.volume = volume.min(100);
        let transport = self
            .now_playing
            .as_ref()
            .map(|np| np.transport)
            .unwrap_or(Transport::Native);
        vec![PlayerCommand::SetVolume {
            transport,
            volume: self.volume,
        }]
    }

    pub fn adjust_volume(&mut self, delta: i16) -> Vec<PlayerCommand> {
        let v = (self.volume as i16 + delta).clamp(0, 100) as u8;
        self.set_volume(v)
    }

    /// Applies a transport event. Events from a transport that is no longer
    /// current are stale and ignored.
    pub fn handle_event(
        &mut self,
        lib: &Library,
        transport: Transport,
        event: PlayerEvent,
    ) -> Vec<PlayerCommand> {
        let Some(np) = &self.now_playing else {
            return Vec::new();
        };
        if np.transport != transport {
            return Vec::new();
        }
        match event {
            PlayerEvent::Loaded => {
                if self.status == PlaybackStatus::Loading {
                    self.status = PlaybackStatus::Playing;
                }
            }
            PlayerEvent::Started => {
                if self.status == PlaybackStatus::Paused {
                    self.status = PlaybackStatus::Playing;
                }
            }
            PlayerEvent::Paused => {
                if self.status == PlaybackStatus::Playing {
                    self.status = PlaybackStatus::Paused;
                }
            }
            PlayerEvent::Position { seconds } => {
                self.position = seconds;
                if self.status == PlaybackStatus::Loading && seconds > 0.0 {
                    self.status = PlaybackStatus::Playing;
                }
            }
            PlayerEvent::Duration { seconds } => self.duration = seconds,
            PlayerEvent::Ended => return self.next(lib).unwrap_or_default(),
            PlayerEvent::Error(msg) => {
                tracing::warn!("{} playback failed: {msg}", transport.label());
                self.status = PlaybackStatus::Failed(msg);
                if transport == Transport::Embedded {
                    return vec![PlayerCommand::StopPolling];
                }
            }
        }
        Vec::new()
    }

    /// The load timer for `generation` fired. Only a load that is still
    /// pending for that same generation is failed.
    pub fn on_load_timeout(&mut self, generation: u64) -> Vec<PlayerCommand> {
        if generation != self.generation || self.status != PlaybackStatus::Loading {
            return Vec::new();
        }
        let Some(np) = &self.now_playing else {
            return Vec::new();
        };
        tracing::warn!("{} load timed out", np.transport.label());
        let cmds = match np.transport {
            Transport::Native => vec![PlayerCommand::Stop(Transport::Native)],
            Transport::Embedded => vec![
                PlayerCommand::StopPolling,
                PlayerCommand::TearDown(Transport::Embedded),
            ],
            Transport::Stream => vec![PlayerCommand::TearDown(Transport::Stream)],
        };
        self.status = PlaybackStatus::Failed("Stream took too long to start".to_string());
        cmds
    }

    /// Re-resolves the now-playing index by id after a registry change;
    /// stops playback when the item is gone.
    pub fn reconcile(&mut self, lib: &Library) -> Vec<PlayerCommand> {
        let Some(np) = &self.now_playing else {
            return Vec::new();
        };
        let found = match np.media {
            MediaRef::Song(_) => lib.songs.position_of(&np.id),
            MediaRef::Video(_) => lib.videos.position_of(&np.id),
            MediaRef::Fm(_) => lib.fm.position_of(&np.id),
        };
        match found {
            Some(i) => {
                let media = np.media.with_index(i);
                if let Some(np) = self.now_playing.as_mut() {
                    np.media = media;
                }
                Vec::new()
            }
            None => self.stop(),
        }
    }

    pub fn stop(&mut self) -> Vec<PlayerCommand> {
        let cmds = self.release_current(None);
        self.now_playing = None;
        self.status = PlaybackStatus::Idle;
        self.position = 0.0;
        self.duration = 0.0;
        self.generation += 1;
        cmds
    }
}

fn stream_transport(url: &str) -> Transport {
    if is_hls(url) {
        Transport::Stream
    } else {
        Transport::Native
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::test_support::*;

    fn library(songs: usize, videos: usize) -> Library {
        let mut lib = Library::new();
        for i in 0..songs {
            lib.songs.push(song(&format!("s{i}"), "Album"));
        }
        for i in 0..videos {
            lib.videos.push(local_video(&format!("v{i}")));
        }
        lib
    }

    fn index_of(pc: &PlaybackController) -> Option<MediaRef> {
        pc.now_playing().map(|np| np.media)
    }

    fn armed(cmds: &[PlayerCommand]) -> u64 {
        cmds.iter()
            .find_map(|c| match c {
                PlayerCommand::ArmTimeout { generation } => Some(*generation),
                _ => None,
            })
            .expect("load timeout armed")
    }

    #[test]
    fn test_play_song_out_of_range_is_noop() {
        let lib = library(0, 0);
        let mut pc = PlaybackController::new(80);
        assert!(pc.play_song(&lib, 0).is_none());
        assert!(pc.now_playing().is_none());
    }

    #[test]
    fn test_play_pause_with_nothing_playing() {
        let mut pc = PlaybackController::new(80);
        assert!(pc.play_pause(&library(0, 0)).is_none());
        assert!(pc.now_playing().is_none());

        let lib = library(1, 0);
        let cmds = pc.play_pause(&lib).unwrap();
        assert_eq!(index_of(&pc), Some(MediaRef::Song(0)));
        assert!(matches!(cmds[0], PlayerCommand::Load { transport: Transport::Native, .. }));
    }

    #[test]
    fn test_play_pause_toggles() {
        let lib = library(1, 0);
        let mut pc = PlaybackController::new(80);
        pc.play_song(&lib, 0);
        assert_eq!(
            pc.play_pause(&lib).unwrap(),
            vec![PlayerCommand::SetPaused {
                transport: Transport::Native,
                paused: true
            }]
        );
        assert_eq!(pc.status(), &PlaybackStatus::Paused);
        pc.play_pause(&lib);
        assert_eq!(pc.status(), &PlaybackStatus::Playing);
    }

    #[test]
    fn test_next_wraps_after_len_calls() {
        let lib = library(4, 0);
        let mut pc = PlaybackController::new(80);
        pc.play_song(&lib, 2);
        for _ in 0..4 {
            pc.next(&lib);
        }
        assert_eq!(index_of(&pc), Some(MediaRef::Song(2)));
    }

    #[test]
    fn test_video_next_wraps_to_zero() {
        let lib = library(0, 3);
        let mut pc = PlaybackController::new(80);
        pc.play_video(&lib, 2);
        pc.next(&lib);
        assert_eq!(index_of(&pc), Some(MediaRef::Video(0)));
    }

    #[test]
    fn test_prev_restarts_after_threshold() {
        let lib = library(3, 0);
        let mut pc = PlaybackController::new(80);
        pc.play_song(&lib, 1);
        pc.handle_event(&lib, Transport::Native, PlayerEvent::Position { seconds: 12.0 });
        assert_eq!(
            pc.prev(&lib).unwrap(),
            vec![PlayerCommand::SeekTo {
                transport: Transport::Native,
                seconds: 0.0
            }]
        );
        assert_eq!(index_of(&pc), Some(MediaRef::Song(1)));

        pc.prev(&lib);
        assert_eq!(index_of(&pc), Some(MediaRef::Song(0)));
        pc.prev(&lib);
        assert_eq!(index_of(&pc), Some(MediaRef::Song(2)));
    }

    #[test]
    fn test_ended_advances() {
        let lib = library(2, 0);
        let mut pc = PlaybackController::new(80);
        pc.play_song(&lib, 1);
        let cmds = pc.handle_event(&lib, Transport::Native, PlayerEvent::Ended);
        assert!(!cmds.is_empty());
        assert_eq!(index_of(&pc), Some(MediaRef::Song(0)));
    }

    #[test]
    fn test_switching_from_youtube_tears_it_down() {
        let mut lib = library(1, 0);
        lib.videos.push(youtube("dQw4w9WgXcQ"));
        let mut pc = PlaybackController::new(80);

        let cmds = pc.play_video(&lib, 0).unwrap();
        assert!(cmds.contains(&PlayerCommand::StartPolling));
        assert!(cmds.contains(&PlayerCommand::ArmTimeout { generation: 1 }));

        let cmds = pc.play_song(&lib, 0).unwrap();
        assert_eq!(cmds[0], PlayerCommand::StopPolling);
        assert_eq!(cmds[1], PlayerCommand::TearDown(Transport::Embedded));
        assert!(matches!(cmds[2], PlayerCommand::Load { transport: Transport::Native, .. }));
    }

    #[test]
    fn test_native_to_stream_stops_native() {
        let mut lib = library(1, 0);
        lib.videos.push(iptv("t", "https://tv.example/live.m3u8"));
        let mut pc = PlaybackController::new(80);
        pc.play_song(&lib, 0);
        let cmds = pc.play_video(&lib, 0).unwrap();
        assert_eq!(cmds[0], PlayerCommand::Stop(Transport::Native));
        assert!(matches!(cmds[1], PlayerCommand::Load { transport: Transport::Stream, .. }));
    }

    #[test]
    fn test_proxy_applies_to_streams_only() {
        let mut lib = library(1, 0);
        lib.fm.push(fm("jazz"));
        let mut pc = PlaybackController::new(80);
        pc.set_proxy("https://proxy.example/");

        let cmds = pc.play_fm(&lib, 0).unwrap();
        assert_eq!(
            cmds[0],
            PlayerCommand::Load {
                transport: Transport::Native,
                url: "https://proxy.example/https://radio.example.com/jazz.mp3".into()
            }
        );
        let cmds = pc.play_song(&lib, 0).unwrap();
        let PlayerCommand::Load { url, .. } = cmds.last().unwrap() else {
            panic!("expected load");
        };
        assert_eq!(url, "/blobs/s0.mp3");
    }

    #[test]
    fn test_timeout_only_for_current_pending_load() {
        let mut lib = library(0, 0);
        lib.videos.push(iptv("a", "https://tv.example/a.m3u8"));
        lib.videos.push(iptv("b", "https://tv.example/b.m3u8"));
        let mut pc = PlaybackController::new(80);
        let stale = armed(&pc.play_video(&lib, 0).unwrap());
        let current = armed(&pc.play_video(&lib, 1).unwrap());
        assert_ne!(stale, current);
        assert!(pc.on_load_timeout(stale).is_empty());
        assert_eq!(pc.status(), &PlaybackStatus::Loading);

        let cmds = pc.on_load_timeout(current);
        assert_eq!(cmds, vec![PlayerCommand::TearDown(Transport::Stream)]);
        assert!(matches!(pc.status(), PlaybackStatus::Failed(_)));
    }

    #[test]
    fn test_loaded_stream_does_not_time_out() {
        let mut lib = library(0, 0);
        lib.videos.push(iptv("a", "https://tv.example/a.m3u8"));
        let mut pc = PlaybackController::new(80);
        let generation = armed(&pc.play_video(&lib, 0).unwrap());
        pc.handle_event(&lib, Transport::Stream, PlayerEvent::Loaded);
        assert!(pc.on_load_timeout(generation).is_empty());
        assert_eq!(pc.status(), &PlaybackStatus::Playing);
    }

    #[test]
    fn test_stale_transport_events_ignored() {
        let lib = library(1, 0);
        let mut pc = PlaybackController::new(80);
        pc.play_song(&lib, 0);
        pc.handle_event(&lib, Transport::Stream, PlayerEvent::Error("old".into()));
        assert_eq!(pc.status(), &PlaybackStatus::Loading);
    }

    #[test]
    fn test_error_then_play_pause_retries() {
        let lib = library(1, 0);
        let mut pc = PlaybackController::new(80);
        pc.play_song(&lib, 0);
        pc.handle_event(&lib, Transport::Native, PlayerEvent::Error("codec".into()));
        assert_eq!(pc.status(), &PlaybackStatus::Failed("codec".into()));
        let cmds = pc.play_pause(&lib).unwrap();
        assert!(matches!(cmds[0], PlayerCommand::Load { .. }));
        assert_eq!(pc.status(), &PlaybackStatus::Loading);
    }

    #[test]
    fn test_reconcile_follows_id_or_stops() {
        let mut lib = library(3, 0);
        let mut pc = PlaybackController::new(80);
        pc.play_song(&lib, 2);

        lib.songs.remove_where(|s| s.id == "s0");
        assert!(pc.reconcile(&lib).is_empty());
        assert_eq!(index_of(&pc), Some(MediaRef::Song(1)));

        let _ = lib.songs.clear();
        assert_eq!(pc.reconcile(&lib), vec![PlayerCommand::Stop(Transport::Native)]);
        assert!(pc.now_playing().is_none());
        assert!(pc.play_song(&lib, 0).is_none());
    }

    #[test]
    fn test_seek_uses_fixed_step() {
        let lib = library(1, 0);
        let mut pc = PlaybackController::new(80);
        assert!(pc.seek(SeekDirection::Forward).is_empty());
        pc.play_song(&lib, 0);
        assert_eq!(
            pc.seek(SeekDirection::Back),
            vec![PlayerCommand::SeekBy {
                transport: Transport::Native,
                seconds: -SEEK_STEP_SECS
            }]
        );
    }

    #[test]
    fn test_volume_clamps() {
        let mut pc = PlaybackController::new(95);
        pc.adjust_volume(10);
        assert_eq!(pc.volume(), 100);
        pc.adjust_volume(-120);
        assert_eq!(pc.volume(), 0);
    }
}
