use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub mod defaults;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: Theme,
    pub input: InputConfig,
    pub paths: PathsConfig,
    pub player: PlayerConfig,
    pub apps: AppsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    /// Theme used until one is picked on the device: classic, dark or gold.
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub mouse: bool,
    /// Degrees of wheel rotation per scroll tick.
    pub scroll_threshold_deg: f64,
    /// Window in which a second centre tap counts as a double tap.
    pub double_tap_ms: u64,
    /// How long Next/Prev must be held before repeating.
    pub hold_delay_ms: u64,
    pub repeat_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// mpv binary to launch.
    pub mpv_path: String,
    /// mpv audio device name (see `mpv --audio-device=help`)
    pub audio_device: Option<String>,
    /// Volume level (0-100)
    pub volume: u8,
    /// Remote streams that have not started after this long are failed.
    pub stream_timeout_secs: u64,
    /// Position poll interval for YouTube playback.
    pub youtube_poll_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppsConfig {
    /// Command used to run J2ME apps; the jar path is appended.
    /// e.g. "java -jar /opt/freej2me/freej2me.jar"
    pub emulator_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        defaults::defaults()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: defaults::THEME.to_string(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            mouse: true,
            scroll_threshold_deg: defaults::SCROLL_THRESHOLD_DEG,
            double_tap_ms: defaults::DOUBLE_TAP_MS,
            hold_delay_ms: defaults::HOLD_DELAY_MS,
            repeat_ms: defaults::REPEAT_MS,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            mpv_path: "mpv".to_string(),
            audio_device: None,
            volume: defaults::VOLUME,
            stream_timeout_secs: defaults::STREAM_TIMEOUT_SECS,
            youtube_poll_ms: defaults::YOUTUBE_POLL_MS,
        }
    }
}

impl Config {
    pub fn db_path(&self) -> PathBuf {
        self.paths.data_dir.join("library.sqlite3")
    }

    pub fn log_path(&self) -> PathBuf {
        self.paths.data_dir.join("wheelpod.log")
    }
}

pub fn save(cfg: &Config, override_path: Option<&Path>) -> anyhow::Result<()> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    write_config(cfg, &path)
}

fn write_config(cfg: &Config, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    let raw = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, raw).with_context(|| format!("write {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }
    Ok(())
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    let proj = ProjectDirs::from("dev", "wheelpod", "wheelpod").context("ProjectDirs unavailable")?;
    Ok(proj.config_dir().join("config.toml"))
}

/// Loads the config, writing the defaults on first run.
pub fn load(override_path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if !path.exists() {
        let cfg = defaults::defaults();
        write_config(&cfg, &path)?;
        return Ok(cfg);
    }

    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let cfg = toml::from_str::<Config>(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_writes_defaults_on_first_run() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("cfg").join("config.toml");
        let cfg = load(Some(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.input.scroll_threshold_deg, defaults::SCROLL_THRESHOLD_DEG);
        assert_eq!(cfg.player.stream_timeout_secs, defaults::STREAM_TIMEOUT_SECS);
    }

    #[test]
    fn test_partial_file_fills_missing_sections() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[input]\ndouble_tap_ms = 250\n").unwrap();

        let cfg = load(Some(&path)).unwrap();
        assert_eq!(cfg.input.double_tap_ms, 250);
        assert_eq!(cfg.input.repeat_ms, defaults::REPEAT_MS);
        assert_eq!(cfg.player.volume, defaults::VOLUME);
        assert!(cfg.apps.emulator_command.is_none());
    }

    #[test]
    fn test_save_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.apps.emulator_command = Some("freej2me".into());
        cfg.theme.name = "gold".into();
        save(&cfg, Some(&path)).unwrap();

        let back = load(Some(&path)).unwrap();
        assert_eq!(back.apps.emulator_command.as_deref(), Some("freej2me"));
        assert_eq!(back.theme.name, "gold");
    }
}
