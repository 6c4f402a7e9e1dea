use super::controller::Transport;
use crate::app::events::{Event, PlayerEvent};
use anyhow::Context;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::UnixStream,
    process::{Child, Command},
    sync::mpsc,
};

/// Request ids reserved for position queries so their replies can be told
/// apart from ordinary command acknowledgements.
const QUERY_TIME_POS: u64 = 1;
const QUERY_DURATION: u64 = 2;
const FIRST_REQUEST_ID: u64 = 100;

#[derive(Debug, Clone)]
pub struct MpvOptions {
    pub binary: String,
    pub audio_device: Option<String>,
    pub log_file: Option<PathBuf>,
    pub volume: u8,
}

#[derive(Debug)]
pub struct MpvHandle {
    transport: Transport,
    child: Child,
    socket_path: PathBuf,
    writer: tokio::sync::Mutex<tokio::io::WriteHalf<UnixStream>>,
    request_id: AtomicU64,
}

impl MpvHandle {
    pub async fn spawn(
        transport: Transport,
        event_tx: mpsc::Sender<Event>,
        opts: &MpvOptions,
    ) -> anyhow::Result<Self> {
        let socket_path = std::env::temp_dir().join(format!(
            "wheelpod-{}-{}.sock",
            std::process::id(),
            transport.label()
        ));
        let _ = std::fs::remove_file(&socket_path);

        let mut cmd = Command::new(&opts.binary);
        cmd.args(["--idle=yes", "--input-terminal=no", "--really-quiet"]);
        cmd.args(transport_args(transport));
        cmd.arg(format!("--volume={}", opts.volume.min(100)));
        if let Some(dev) = &opts.audio_device {
            cmd.arg(format!("--audio-device={dev}"));
        }
        if let Some(p) = &opts.log_file {
            cmd.arg(format!("--log-file={}", p.display()));
        }
        let child = cmd
            .arg(format!("--input-ipc-server={}", socket_path.display()))
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("spawn {} for {} playback", opts.binary, transport.label()))?;

        let stream = connect_with_retry(&socket_path).await?;
        let (reader, writer) = tokio::io::split(stream);

        tokio::spawn(read_events_loop(reader, transport, event_tx));

        let this = Self {
            transport,
            child,
            socket_path,
            writer: tokio::sync::Mutex::new(writer),
            request_id: AtomicU64::new(FIRST_REQUEST_ID),
        };

        this.command(json!({"command":["request_log_messages", "warn"]}))
            .await?;
        this.command(json!({"command":["observe_property", 3, "pause"]}))
            .await?;
        // The embedded player is polled for position instead.
        if transport != Transport::Embedded {
            this.command(json!({"command":["observe_property", 1, "time-pos"]}))
                .await?;
            this.command(json!({"command":["observe_property", 2, "duration"]}))
                .await?;
        }

        tracing::debug!("mpv ({}) ready on {}", transport.label(), this.socket_path.display());
        Ok(this)
    }

    pub async fn load_url(&self, url: &str) -> anyhow::Result<()> {
        self.command(json!({"command":["loadfile", url, "replace"]})).await?;
        self.set_pause(false).await
    }

    pub async fn set_pause(&self, paused: bool) -> anyhow::Result<()> {
        self.command(json!({"command":["set_property", "pause", paused]}))
            .await
    }

    pub async fn seek_relative(&self, seconds: f64) -> anyhow::Result<()> {
        self.command(json!({"command":["seek", seconds, "relative"]}))
            .await
    }

    pub async fn seek_absolute(&self, seconds: f64) -> anyhow::Result<()> {
        self.command(json!({"command":["seek", seconds, "absolute"]}))
            .await
    }

    pub async fn stop(&self) -> anyhow::Result<()> {
        self.command(json!({"command":["stop"]})).await
    }

    pub async fn set_volume(&self, volume_0_100: u8) -> anyhow::Result<()> {
        self.command(json!({"command":["set_property", "volume", volume_0_100]}))
            .await
    }

    /// Asks for the current position and duration. Replies arrive on the
    /// event channel like observed property changes do.
    pub async fn query_position(&self) -> anyhow::Result<()> {
        self.command(json!({"command":["get_property", "time-pos"], "request_id": QUERY_TIME_POS}))
            .await?;
        self.command(json!({"command":["get_property", "duration"], "request_id": QUERY_DURATION}))
            .await
    }

    async fn command(&self, mut v: serde_json::Value) -> anyhow::Result<()> {
        if v.get("request_id").is_none() {
            let id = self.request_id.fetch_add(1, Ordering::Relaxed);
            if let serde_json::Value::Object(ref mut o) = v {
                o.insert("request_id".to_string(), serde_json::Value::from(id));
            }
        }
        let mut w = self.writer.lock().await;
        let mut line = serde_json::to_vec(&v).context("encode mpv json")?;
        line.push(b'\n');
        w.write_all(&line).await.context("write mpv ipc")?;
        w.flush().await.context("flush mpv ipc")?;
        Ok(())
    }
}

impl Drop for MpvHandle {
    fn drop(&mut self) {
        tracing::debug!("mpv ({}) shutting down", self.transport.label());
        let _ = self.child.start_kill();
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

fn transport_args(transport: Transport) -> &'static [&'static str] {
    match transport {
        Transport::Native => &["--audio-display=no", "--ytdl=no"],
        Transport::Embedded => &["--ytdl=yes", "--ytdl-format=best[height<=720]/best"],
        Transport::Stream => &["--cache=yes", "--ytdl=no"],
    }
}

async fn connect_with_retry(path: &Path) -> anyhow::Result<UnixStream> {
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
    loop {
        match UnixStream::connect(path).await {
            Ok(s) => return Ok(s),
            Err(e) => {
                if tokio::time::Instant::now() > deadline {
                    return Err(e).with_context(|| format!("connect to mpv ipc {}", path.display()));
                }
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            }
        }
    }
}

async fn read_events_loop(
    reader: tokio::io::ReadHalf<UnixStream>,
    transport: Transport,
    event_tx: mpsc::Sender<Event>,
) {
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let Ok(v) = serde_json::from_str::<serde_json::Value>(&line) else {
            continue;
        };
        if let Some(err) = v.get("error").and_then(|e| e.as_str())
            && err != "success"
        {
            // get_property on time-pos fails while nothing is loaded.
            tracing::debug!("mpv ({}) ipc error: {err}", transport.label());
        }
        if let Some(level) = v.get("level").and_then(|l| l.as_str()) {
            let text = v.get("text").and_then(|t| t.as_str()).unwrap_or("").trim();
            tracing::warn!("mpv ({}) {level}: {text}", transport.label());
        }
        if let Some(event) = map_mpv_message(&v)
            && event_tx.send(Event::Player { transport, event }).await.is_err()
        {
            break;
        }
    }
}

/// Turns one line of mpv IPC output into a player event, if it carries one.
fn map_mpv_message(v: &serde_json::Value) -> Option<PlayerEvent> {
    if v.get("event").is_none() {
        return map_query_reply(v);
    }
    match v.get("event")?.as_str()? {
        "property-change" => {
            let name = v.get("name")?.as_str()?;
            match name {
                "time-pos" => Some(PlayerEvent::Position {
                    seconds: v.get("data")?.as_f64()?,
                }),
                "duration" => Some(PlayerEvent::Duration {
                    seconds: v.get("data")?.as_f64()?,
                }),
                "pause" => {
                    let paused = v.get("data")?.as_bool().unwrap_or(false);
                    Some(if paused { PlayerEvent::Paused } else { PlayerEvent::Started })
                }
                _ => None,
            }
        }
        "file-loaded" => Some(PlayerEvent::Loaded),
        "end-file" => match v.get("reason").and_then(|x| x.as_str()).unwrap_or("") {
            "eof" => Some(PlayerEvent::Ended),
            "error" => {
                let err = v.get("file_error").or_else(|| v.get("error"));
                let err = err.and_then(|x| x.as_str()).unwrap_or("unknown error");
                Some(PlayerEvent::Error(format!("Playback failed: {err}")))
            }
            // stop/quit/redirect come from our own loadfile and stop commands
            _ => None,
        },
        _ => None,
    }
}

fn map_query_reply(v: &serde_json::Value) -> Option<PlayerEvent> {
    let seconds = v.get("data")?.as_f64()?;
    match v.get("request_id")?.as_u64()? {
        QUERY_TIME_POS => Some(PlayerEvent::Position { seconds }),
        QUERY_DURATION => Some(PlayerEvent::Duration { seconds }),
        _ => None,
    }
}
