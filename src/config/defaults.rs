use super::{AppsConfig, Config, InputConfig, PathsConfig, PlayerConfig, Theme};
use directories::ProjectDirs;
use std::path::PathBuf;

pub const THEME: &str = "classic";
pub const SCROLL_THRESHOLD_DEG: f64 = 15.0;
pub const DOUBLE_TAP_MS: u64 = 300;
pub const HOLD_DELAY_MS: u64 = 500;
pub const REPEAT_MS: u64 = 200;
pub const VOLUME: u8 = 80;
pub const STREAM_TIMEOUT_SECS: u64 = 20;
pub const YOUTUBE_POLL_MS: u64 = 250;

pub fn data_dir() -> PathBuf {
    ProjectDirs::from("dev", "wheelpod", "wheelpod")
        .map(|p| p.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("wheelpod"))
}

pub fn defaults() -> Config {
    Config {
        theme: Theme::default(),
        input: InputConfig::default(),
        paths: PathsConfig::default(),
        player: PlayerConfig::default(),
        apps: AppsConfig::default(),
    }
}
