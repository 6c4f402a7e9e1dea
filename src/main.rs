mod app;
mod battery;
mod config;
mod input;
mod library;
mod menu;
mod nav;
mod oembed;
mod player;
mod storage;
mod tui;

use anyhow::Context;
use clap::{Parser, Subcommand};
use library::Library;
use library::import;
use library::links;
use library::models::{Collection, FmChannel, MediaItem, RemoteLink, Video, VideoSource};
use storage::blob::BlobStore;
use storage::{Storage, keys};

#[derive(Debug, Parser)]
#[command(name = "wheelpod", version, about = "Click-wheel media player for the terminal")]
struct Cli {
    /// Override config file path.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the interactive TUI (default).
    Tui,
    /// Print a collection to stdout (headless).
    List {
        #[arg(value_enum)]
        collection: Collection,
    },
    /// Import a file or every matching file in a folder (headless).
    Import {
        #[arg(value_enum)]
        collection: Collection,
        path: std::path::PathBuf,
    },
    /// Delete every item in a collection.
    Clear {
        #[arg(value_enum)]
        collection: Collection,
    },
    /// Add an FM radio station.
    AddFm { name: String, url: String },
    /// Add an IPTV channel.
    AddIptv { name: String, url: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref()).context("load config")?;
    let cfg_path = match cli.config.clone() {
        Some(p) => p,
        None => config::default_config_path().context("default config path")?,
    };

    let command = cli.command.unwrap_or(Command::Tui);
    init_logging(&cfg, matches!(command, Command::Tui))?;

    match command {
        Command::Tui => {
            let mut app = app::App::new(cfg.clone(), cfg_path)?;
            let mut terminal = tui::TerminalGuard::enter(cfg.input.mouse).context("init terminal")?;
            app.run(terminal.terminal_mut()).await?;
        }
        Command::List { collection } => {
            let (storage, blobs) = open_store(&cfg)?;
            let lib = Library::load(&storage, &blobs)?;
            print_collection(&lib, collection);
        }
        Command::Import { collection, path } => {
            let (storage, blobs) = open_store(&cfg)?;
            let batch = import::import_path(&blobs, collection, &path)
                .with_context(|| format!("import {}", path.display()))?;
            let now = time::OffsetDateTime::now_utc().unix_timestamp();
            for record in &batch.records {
                storage
                    .upsert(record, now)
                    .with_context(|| format!("save {}", record.id))?;
                println!("+ {}", record.meta.name());
            }
            for (file, err) in &batch.failed {
                eprintln!("! {}: {err}", file.display());
            }
            println!(
                "Imported {} {}, {} failed.",
                batch.records.len(),
                collection.label().to_lowercase(),
                batch.failed.len()
            );
        }
        Command::Clear { collection } => {
            let (storage, blobs) = open_store(&cfg)?;
            let n = storage.count(collection)?;
            storage.clear(collection)?;
            blobs.purge(collection)?;
            // Remote videos share the Videos screen but live in the kv table.
            if collection == Collection::Videos {
                storage.set_json(keys::REMOTE_VIDEOS, &Vec::<RemoteLink>::new())?;
            }
            println!("Cleared {n} {}.", collection.label().to_lowercase());
        }
        Command::AddFm { name, url } => {
            let (storage, blobs) = open_store(&cfg)?;
            let mut lib = Library::load(&storage, &blobs)?;
            let (name, url) = links::validate_stream_link(&name, &url)?;
            let id = lib.fresh_link_id("fm");
            lib.fm.push(FmChannel {
                id,
                name: name.clone(),
                url,
            });
            storage.set_json(keys::FM_CHANNELS, &lib.fm_channels())?;
            println!("Added station {name}.");
        }
        Command::AddIptv { name, url } => {
            let (storage, blobs) = open_store(&cfg)?;
            let mut lib = Library::load(&storage, &blobs)?;
            let (name, url) = links::validate_stream_link(&name, &url)?;
            let id = lib.fresh_link_id("iptv");
            lib.add(MediaItem::Video(Video::from_link(RemoteLink::Iptv {
                id,
                name: name.clone(),
                url,
            })));
            storage.set_json(keys::REMOTE_VIDEOS, &lib.remote_links())?;
            println!("Added channel {name}.");
        }
    }

    Ok(())
}

/// The TUI owns the terminal, so it logs to a file; headless commands log
/// to stderr.
fn init_logging(cfg: &config::Config, tui: bool) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(tracing::Level::INFO);
    if tui {
        let path = cfg.log_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open log {}", path.display()))?;
        builder
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init();
    } else {
        builder.with_writer(std::io::stderr).init();
    }
    Ok(())
}

fn open_store(cfg: &config::Config) -> anyhow::Result<(Storage, BlobStore)> {
    let blobs = BlobStore::open(&cfg.paths.data_dir).context("open blob store")?;
    let storage = Storage::open(&cfg.db_path()).context("open library")?;
    Ok((storage, blobs))
}

fn print_collection(lib: &Library, collection: Collection) {
    match collection {
        Collection::Songs => {
            for (i, s) in lib.songs.iter().enumerate() {
                println!("{:02}. {} - {} ({})  id={}", i + 1, s.name, s.artist, s.album, s.id);
            }
        }
        Collection::Photos => {
            for (i, p) in lib.photos.iter().enumerate() {
                println!("{:02}. {}  id={}", i + 1, p.name, p.id);
            }
        }
        Collection::Videos => {
            for (i, v) in lib.videos.iter().enumerate() {
                let location = match &v.source {
                    VideoSource::Local { blob, .. } => blob.display().to_string(),
                    VideoSource::YouTube { video_id } => links::watch_url(video_id),
                    VideoSource::Iptv { url } | VideoSource::Online { url } => url.clone(),
                };
                println!(
                    "{:02}. [{}] {}  {location}",
                    i + 1,
                    v.origin_label(),
                    v.name
                );
            }
        }
        Collection::Apps => {
            for (i, a) in lib.apps.iter().enumerate() {
                println!("{:02}. {}  id={}", i + 1, a.name, a.id);
            }
        }
    }
}
