pub mod actions;
pub mod events;
pub mod reduce;
pub mod state;

use crate::battery;
use crate::config::Config;
use crate::input;
use crate::input::wheel::{ClickWheel, WheelTiming};
use crate::library::Library;
use crate::library::import;
use crate::library::models::MediaItem;
use crate::oembed::OembedClient;
use crate::player::{MpvHandle, MpvOptions, PlayerCommand, Transport};
use crate::storage::blob::BlobStore;
use crate::storage::{Storage, keys};
use crate::tui::theme::ThemeName;
use crate::tui::{self, TuiTerminal};
use actions::{Action, Effect, PersistOp};
use anyhow::Context;
use events::{Event, PlayerEvent, TaskEvent};
use state::{AppState, Toast};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub struct App {
    cfg: Config,
    config_path: std::path::PathBuf,
    state: AppState,
    storage: Storage,
    blobs: Arc<BlobStore>,
    oembed: OembedClient,
    wheel: ClickWheel,
    players: HashMap<Transport, MpvHandle>,
    poll_task: Option<JoinHandle<()>>,
    timeout_task: Option<JoinHandle<()>>,
}

impl App {
    pub fn new(cfg: Config, config_path: std::path::PathBuf) -> anyhow::Result<Self> {
        let blobs = BlobStore::open(&cfg.paths.data_dir).context("open blob store")?;
        tracing::info!("session links in {}", blobs.session_dir().display());
        let mut state = AppState::new(cfg.player.volume);

        let storage = match Storage::open(&cfg.db_path()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!("storage unavailable, library will not be saved: {e:#}");
                state.toast = Some(Toast::error("Library storage unavailable"));
                Storage::open_in_memory()?
            }
        };

        state.library = Library::load(&storage, &blobs).unwrap_or_else(|e| {
            tracing::error!("load library: {e:#}");
            Library::new()
        });
        state.theme = match storage.get(keys::THEME) {
            Ok(Some(name)) => ThemeName::parse(&name),
            _ => ThemeName::parse(&cfg.theme.name),
        };
        if let Ok(Some(proxy)) = storage.get(keys::STREAM_PROXY) {
            state.playback.set_proxy(proxy.clone());
            state.stream_proxy = proxy;
        }

        let wheel = ClickWheel::new(WheelTiming::from(&cfg.input));
        Ok(Self {
            oembed: OembedClient::new()?,
            cfg,
            config_path,
            state,
            storage,
            blobs: Arc::new(blobs),
            wheel,
            players: HashMap::new(),
            poll_task: None,
            timeout_task: None,
        })
    }

    pub async fn run(&mut self, terminal: &mut TuiTerminal) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel::<Event>(256);

        input::spawn_input_task(tx.clone());
        let battery_task = battery::spawn_battery_task(tx.clone());

        // The shared player starts eagerly so the first song plays without delay.
        if let Err(e) = self.ensure_player(Transport::Native, &tx).await {
            self.state.toast = Some(Toast::error(format!("mpv disabled: {e:#}")));
        }

        tui::draw(terminal, &mut self.state)?;

        loop {
            let ev = match self.wheel.next_deadline() {
                Some(deadline) => {
                    tokio::select! {
                        ev = rx.recv() => ev,
                        _ = tokio::time::sleep_until(deadline.into()) => Some(Event::Tick),
                    }
                }
                None => rx.recv().await,
            };
            let Some(ev) = ev else { break };

            match ev {
                Event::Input(input_ev) => {
                    let now = std::time::Instant::now();
                    let actions = input::map_input(&self.state, &mut self.wheel, input_ev, now);
                    for action in actions {
                        self.handle_action(action, &tx).await;
                    }
                }
                Event::Tick => {
                    for wheel_ev in self.wheel.poll(std::time::Instant::now()) {
                        self.handle_action(Action::Wheel(wheel_ev), &tx).await;
                    }
                }
                Event::Player { transport, event } => {
                    self.handle_action(Action::Player { transport, event }, &tx)
                        .await;
                }
                Event::Task(task) => self.handle_task(task, &tx).await,
            }

            if self.state.should_quit {
                break;
            }

            tui::draw(terminal, &mut self.state)?;
        }

        battery_task.abort();
        self.shutdown();
        Ok(())
    }

    fn shutdown(&mut self) {
        if let Some(t) = self.poll_task.take() {
            t.abort();
        }
        if let Some(t) = self.timeout_task.take() {
            t.abort();
        }
        self.players.clear();

        self.cfg.player.volume = self.state.playback.volume();
        if let Err(e) = crate::config::save(&self.cfg, Some(self.config_path.as_path())) {
            tracing::warn!("save config: {e:#}");
        }
    }

    async fn handle_action(&mut self, action: Action, tx: &mpsc::Sender<Event>) {
        let before = (self.state.nav.current(), self.state.nav.depth());
        let effects = self.state.dispatch(action);
        if (self.state.nav.current(), self.state.nav.depth()) != before {
            self.wheel.reset();
        }
        for effect in effects {
            self.run_effect(effect, tx).await;
        }
    }

    async fn run_effect(&mut self, effect: Effect, tx: &mpsc::Sender<Event>) {
        match effect {
            Effect::Player(cmd) => self.run_player_command(cmd, tx).await,
            Effect::Persist(op) => self.persist(op),
            Effect::Import { collection, path } => {
                let blobs = Arc::clone(&self.blobs);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result = tokio::task::spawn_blocking(move || {
                        import::import_path(&blobs, collection, &path)
                    })
                    .await;
                    let result = match result {
                        Ok(Ok(batch)) => Ok(batch),
                        Ok(Err(e)) => Err(format!("{e:#}")),
                        Err(e) => Err(format!("import task failed: {e}")),
                    };
                    let _ = tx
                        .send(Event::Task(TaskEvent::Imported { collection, result }))
                        .await;
                });
            }
            Effect::LookupYoutubeTitle { video_id } => {
                let client = self.oembed.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let title = match client.video_title(&video_id).await {
                        Ok(t) => t,
                        Err(e) => {
                            tracing::warn!("oembed {video_id}: {e:#}");
                            None
                        }
                    };
                    let _ = tx
                        .send(Event::Task(TaskEvent::YoutubeTitle { video_id, title }))
                        .await;
                });
            }
            Effect::LaunchApp { name, jar } => self.launch_app(name, jar, tx),
            Effect::OpenExternal(path) => {
                let opener = if cfg!(target_os = "macos") { "open" } else { "xdg-open" };
                let spawned = tokio::process::Command::new(opener)
                    .arg(&path)
                    .stdin(std::process::Stdio::null())
                    .stdout(std::process::Stdio::null())
                    .stderr(std::process::Stdio::null())
                    .spawn();
                if let Err(e) = spawned {
                    tracing::warn!("{opener} {}: {e}", path.display());
                    self.state.toast = Some(Toast::error(format!("Could not open photo: {e}")));
                }
            }
        }
    }

    async fn run_player_command(&mut self, cmd: PlayerCommand, tx: &mpsc::Sender<Event>) {
        let result = match cmd {
            PlayerCommand::Load { transport, url } => {
                tracing::info!("load ({}) {url}", transport.label());
                let loaded = match self.ensure_player(transport, tx).await {
                    Ok(()) => match self.players.get(&transport) {
                        Some(p) => p.load_url(&url).await,
                        None => Ok(()),
                    },
                    Err(e) => Err(e),
                };
                loaded.map_err(|e| (transport, e))
            }
            PlayerCommand::Stop(transport) => match self.players.get(&transport) {
                Some(p) => p.stop().await.map_err(|e| (transport, e)),
                None => Ok(()),
            },
            PlayerCommand::TearDown(transport) => {
                if self.players.remove(&transport).is_some() {
                    tracing::debug!("tore down {} player", transport.label());
                }
                Ok(())
            }
            PlayerCommand::SetPaused { transport, paused } => match self.players.get(&transport) {
                Some(p) => p.set_pause(paused).await.map_err(|e| (transport, e)),
                None => Ok(()),
            },
            PlayerCommand::SeekBy { transport, seconds } => match self.players.get(&transport) {
                Some(p) => p.seek_relative(seconds).await.map_err(|e| (transport, e)),
                None => Ok(()),
            },
            PlayerCommand::SeekTo { transport, seconds } => match self.players.get(&transport) {
                Some(p) => p.seek_absolute(seconds).await.map_err(|e| (transport, e)),
                None => Ok(()),
            },
            PlayerCommand::SetVolume { transport, volume } => match self.players.get(&transport) {
                Some(p) => p.set_volume(volume).await.map_err(|e| (transport, e)),
                None => Ok(()),
            },
            PlayerCommand::StartPolling => {
                if let Some(t) = self.poll_task.take() {
                    t.abort();
                }
                let interval =
                    std::time::Duration::from_millis(self.cfg.player.youtube_poll_ms.max(50));
                let tx = tx.clone();
                self.poll_task = Some(tokio::spawn(async move {
                    let mut ticker = tokio::time::interval(interval);
                    loop {
                        ticker.tick().await;
                        if tx.send(Event::Task(TaskEvent::PollPosition)).await.is_err() {
                            break;
                        }
                    }
                }));
                Ok(())
            }
            PlayerCommand::StopPolling => {
                if let Some(t) = self.poll_task.take() {
                    t.abort();
                }
                Ok(())
            }
            PlayerCommand::ArmTimeout { generation } => {
                if let Some(t) = self.timeout_task.take() {
                    t.abort();
                }
                let timeout = std::time::Duration::from_secs(self.cfg.player.stream_timeout_secs);
                let tx = tx.clone();
                self.timeout_task = Some(tokio::spawn(async move {
                    tokio::time::sleep(timeout).await;
                    let _ = tx
                        .send(Event::Task(TaskEvent::LoadTimeout { generation }))
                        .await;
                }));
                Ok(())
            }
        };

        if let Err((transport, e)) = result {
            tracing::error!("{} player: {e:#}", transport.label());
            // Reported through the channel so the controller sees it like any
            // other playback failure.
            let _ = tx.try_send(Event::Player {
                transport,
                event: PlayerEvent::Error(format!("Player unavailable: {e}")),
            });
        }
    }

    async fn ensure_player(
        &mut self,
        transport: Transport,
        tx: &mpsc::Sender<Event>,
    ) -> anyhow::Result<()> {
        if self.players.contains_key(&transport) {
            return Ok(());
        }
        let opts = MpvOptions {
            binary: self.cfg.player.mpv_path.clone(),
            audio_device: self.cfg.player.audio_device.clone(),
            log_file: Some(self.cfg.paths.data_dir.join(format!("mpv-{}.log", transport.label()))),
            volume: self.state.playback.volume(),
        };
        let handle = MpvHandle::spawn(transport, tx.clone(), &opts).await?;
        self.players.insert(transport, handle);
        Ok(())
    }

    fn persist(&mut self, op: PersistOp) {
        let result = match &op {
            PersistOp::ClearCollection(collection) => self
                .storage
                .clear(*collection)
                .and_then(|()| self.blobs.purge(*collection)),
            PersistOp::SaveRemoteLinks(links) => self.storage.set_json(keys::REMOTE_VIDEOS, links),
            PersistOp::SaveFmChannels(channels) => {
                self.storage.set_json(keys::FM_CHANNELS, channels)
            }
            PersistOp::SetSetting { key, value } => self.storage.set(key, value),
        };
        if let Err(e) = result {
            tracing::error!("persist {op:?}: {e:#}");
            self.state.toast = Some(Toast::error("Could not save changes"));
        }
    }

    fn launch_app(&mut self, name: String, jar: std::path::PathBuf, tx: &mpsc::Sender<Event>) {
        let tx = tx.clone();
        let command = self.cfg.apps.emulator_command.clone();
        tokio::spawn(async move {
            let result = run_emulator(command.as_deref(), &jar).await;
            if let Err(e) = &result {
                tracing::warn!("run {name}: {e}");
            }
            let _ = tx
                .send(Event::Task(TaskEvent::AppExited { name, result }))
                .await;
        });
    }

    async fn handle_task(&mut self, task: TaskEvent, tx: &mpsc::Sender<Event>) {
        match task {
            TaskEvent::Imported { collection, result } => {
                let action = match result {
                    Ok(batch) => {
                        let now = time::OffsetDateTime::now_utc().unix_timestamp();
                        let mut items: Vec<MediaItem> = Vec::with_capacity(batch.records.len());
                        for record in batch.records {
                            if let Err(e) = self.storage.upsert(&record, now) {
                                tracing::error!("save {}: {e:#}", record.id);
                            }
                            let url = self.blobs.object_url(&record.blob);
                            items.push(record.into_item(url));
                        }
                        Action::MediaImported {
                            collection,
                            items,
                            failed: batch.failed.len(),
                        }
                    }
                    Err(message) => Action::ImportFailed {
                        collection,
                        message,
                    },
                };
                self.handle_action(action, tx).await;
            }
            TaskEvent::YoutubeTitle { video_id, title } => {
                self.handle_action(Action::YoutubeTitle { video_id, title }, tx)
                    .await;
            }
            TaskEvent::LoadTimeout { generation } => {
                self.handle_action(Action::LoadTimeout { generation }, tx).await;
            }
            TaskEvent::PollPosition => {
                if let Some(p) = self.players.get(&Transport::Embedded)
                    && let Err(e) = p.query_position().await
                {
                    tracing::debug!("poll youtube position: {e:#}");
                }
            }
            TaskEvent::Battery(status) => self.handle_action(Action::Battery(status), tx).await,
            TaskEvent::AppExited { name, result } => {
                self.handle_action(Action::AppExited { name, result }, tx).await;
            }
        }
    }
}

pub const EMULATOR_NOT_FOUND: &str = "Emulator Not Found";

/// Runs the configured emulator command with the jar appended and waits
/// for it to exit.
async fn run_emulator(command: Option<&str>, jar: &std::path::Path) -> Result<(), String> {
    let mut parts = command.unwrap_or("").split_whitespace();
    let Some(program) = parts.next() else {
        return Err(EMULATOR_NOT_FOUND.to_string());
    };
    let mut child = tokio::process::Command::new(program)
        .args(parts)
        .arg(jar)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map_err(|_| EMULATOR_NOT_FOUND.to_string())?;
    let status = child.wait().await.map_err(|e| e.to_string())?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("Emulator exited with {status}"))
    }
}
