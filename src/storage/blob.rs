//! On-disk blobs for imported media and the per-session links that stand in
//! for playable URLs.

use crate::library::models::Collection;
use anyhow::Context;
use sha1::{Digest, Sha1};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Exclusively owned handle to a playable file.
///
/// Links created by [`BlobStore::object_url`] live in the session directory
/// and are removed when the handle drops, so every link is released exactly
/// once. The type is deliberately not `Clone`.
#[derive(Debug)]
pub struct ObjectUrl {
    path: PathBuf,
    owned: bool,
}

impl ObjectUrl {
    /// Points straight at a file without creating (or later removing) a link.
    pub fn direct(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            owned: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn as_url(&self) -> String {
        self.path.display().to_string()
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        if self.owned
            && let Err(e) = fs::remove_file(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::debug!("release {}: {e}", self.path.display());
        }
    }
}

#[derive(Debug)]
pub struct BlobStore {
    root: PathBuf,
    session: PathBuf,
    next_link: AtomicU64,
}

/// Numbers the stores opened by this process, so each gets its own session.
static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

impl BlobStore {
    /// Opens the blob directory under `data_dir` and starts a session of
    /// its own under `session/<pid>-<n>`. Sessions left behind by processes
    /// that are no longer running are removed; live ones are left alone.
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let root = data_dir.join("blobs");
        let sessions = data_dir.join("session");
        fs::create_dir_all(&root).with_context(|| format!("create dir {}", root.display()))?;
        sweep_sessions(&sessions);

        let n = NEXT_SESSION.fetch_add(1, Ordering::Relaxed);
        let session = sessions.join(format!("{}-{n}", std::process::id()));
        fs::create_dir_all(&session)
            .with_context(|| format!("create dir {}", session.display()))?;
        Ok(Self {
            root,
            session,
            next_link: AtomicU64::new(1),
        })
    }

    fn collection_dir(&self, collection: Collection) -> PathBuf {
        self.root.join(collection.table())
    }

    /// Copies `src` into the store, named by content hash. Re-importing the
    /// same bytes reuses the existing blob.
    pub fn ingest(&self, collection: Collection, src: &Path) -> anyhow::Result<PathBuf> {
        let mut file = fs::File::open(src).with_context(|| format!("open {}", src.display()))?;
        let mut hasher = Sha1::new();
        std::io::copy(&mut file, &mut hasher)
            .with_context(|| format!("hash {}", src.display()))?;
        let digest = hex::encode(hasher.finalize());

        let dir = self.collection_dir(collection);
        fs::create_dir_all(&dir).with_context(|| format!("create dir {}", dir.display()))?;

        let name = match src.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{digest}.{}", ext.to_ascii_lowercase()),
            None => digest,
        };
        let dest = dir.join(name);
        if !dest.exists() {
            fs::copy(src, &dest)
                .with_context(|| format!("copy {} -> {}", src.display(), dest.display()))?;
        }
        Ok(dest)
    }

    /// Creates a session link to `blob`. Falls back to pointing at the blob
    /// itself when neither a hard link nor a copy can be made.
    pub fn object_url(&self, blob: &Path) -> ObjectUrl {
        let n = self.next_link.fetch_add(1, Ordering::Relaxed);
        let file_name = blob
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| "blob".to_string());
        let link = self.session.join(format!("{n}-{file_name}"));

        let made = fs::hard_link(blob, &link).or_else(|_| fs::copy(blob, &link).map(|_| ()));
        match made {
            Ok(()) => ObjectUrl {
                path: link,
                owned: true,
            },
            Err(e) => {
                tracing::warn!("link {}: {e}", blob.display());
                ObjectUrl::direct(blob)
            }
        }
    }

    /// Deletes every blob stored for `collection`.
    pub fn purge(&self, collection: Collection) -> anyhow::Result<()> {
        let dir = self.collection_dir(collection);
        if dir.exists() {
            fs::remove_dir_all(&dir).with_context(|| format!("remove {}", dir.display()))?;
        }
        Ok(())
    }

    pub fn session_dir(&self) -> &Path {
        &self.session
    }
}

/// Without `/proc` there is no way to tell, so every pid counts as running.
fn pid_alive(pid: u32) -> bool {
    let proc = Path::new("/proc");
    !proc.is_dir() || proc.join(pid.to_string()).exists()
}

fn sweep_sessions(sessions: &Path) {
    let Ok(entries) = fs::read_dir(sessions) else { return };
    for entry in entries.flatten() {
        let path = entry.path();
        let owner = entry
            .file_name()
            .to_str()
            .and_then(|name| name.split_once('-'))
            .and_then(|(pid, _)| pid.parse::<u32>().ok());
        if path.is_dir() && owner.is_some_and(pid_alive) {
            continue;
        }
        let removed = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        match removed {
            Ok(()) => tracing::debug!("removed stale session {}", path.display()),
            Err(e) => tracing::warn!("remove stale session {}: {e}", path.display()),
        }
    }
}

impl Drop for BlobStore {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.session);
    }
}
