pub mod blob;

use crate::library::models::{Collection, CoverArt, MediaMeta, MediaRecord};
use anyhow::Context;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};

/// Well-known keys in the `kv` table.
pub mod keys {
    pub const REMOTE_VIDEOS: &str = "remote_videos";
    pub const FM_CHANNELS: &str = "fm_channels";
    pub const THEME: &str = "theme";
    pub const STREAM_PROXY: &str = "stream_proxy";
}

pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }

        let conn = Connection::open(path).with_context(|| format!("open {}", path.display()))?;
        let s = Self { conn };
        s.init_schema()?;
        Ok(s)
    }

    /// A throwaway store, used when the database file cannot be opened and
    /// as the test double.
    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory db")?;
        let s = Self { conn };
        s.init_schema()?;
        Ok(s)
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        let mut sql = String::new();
        for c in Collection::ALL {
            sql.push_str(&format!(
                r#"
CREATE TABLE IF NOT EXISTS {table} (
  id TEXT PRIMARY KEY,
  record_json TEXT NOT NULL,
  blob_path TEXT NOT NULL,
  cover BLOB,
  added_at INTEGER NOT NULL
);
"#,
                table = c.table()
            ));
        }
        sql.push_str(
            r#"
CREATE TABLE IF NOT EXISTS kv (
  key TEXT PRIMARY KEY,
  value TEXT NOT NULL
);
"#,
        );
        self.conn.execute_batch(&sql).context("init schema")?;
        Ok(())
    }

    pub fn upsert(&self, record: &MediaRecord, now_unix: i64) -> anyhow::Result<()> {
        let record_json = serde_json::to_string(&record.meta).context("encode record")?;
        let cover = record.cover.as_ref().map(|c| c.data.as_slice());
        self.conn
            .execute(
                &format!(
                    r#"
INSERT INTO {table}(id, record_json, blob_path, cover, added_at)
VALUES(?1, ?2, ?3, ?4, ?5)
ON CONFLICT(id) DO UPDATE SET
  record_json=excluded.record_json,
  blob_path=excluded.blob_path,
  cover=excluded.cover
"#,
                    table = record.collection.table()
                ),
                params![
                    record.id,
                    record_json,
                    record.blob.to_string_lossy().into_owned(),
                    cover,
                    now_unix
                ],
            )
            .with_context(|| format!("upsert {}", record.id))?;
        Ok(())
    }

    /// All records of `collection`, in insertion order. Rows whose metadata
    /// no longer decodes are skipped.
    pub fn get_all(&self, collection: Collection) -> anyhow::Result<Vec<MediaRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT id, record_json, blob_path, cover FROM {} ORDER BY rowid",
                collection.table()
            ))
            .context("prepare get_all")?;

        let rows = stmt
            .query_map([], |row| {
                let id: String = row.get(0)?;
                let record_json: String = row.get(1)?;
                let blob_path: String = row.get(2)?;
                let cover: Option<Vec<u8>> = row.get(3)?;
                Ok((id, record_json, blob_path, cover))
            })
            .context("query get_all")?;

        let mut out = Vec::new();
        for row in rows {
            let (id, record_json, blob_path, cover) = row.context("read row")?;
            let meta: MediaMeta = match serde_json::from_str(&record_json) {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!("skip {} in {}: {e}", id, collection.table());
                    continue;
                }
            };
            let cover = match (&meta, cover) {
                (
                    MediaMeta::Song {
                        cover_mime: Some(mime),
                        ..
                    },
                    Some(data),
                ) => Some(CoverArt {
                    mime: mime.clone(),
                    data,
                }),
                _ => None,
            };
            out.push(MediaRecord {
                collection,
                id,
                meta,
                blob: PathBuf::from(blob_path),
                cover,
            });
        }
        Ok(out)
    }

    pub fn clear(&self, collection: Collection) -> anyhow::Result<()> {
        self.conn
            .execute(&format!("DELETE FROM {}", collection.table()), [])
            .with_context(|| format!("clear {}", collection.table()))?;
        Ok(())
    }

    pub fn count(&self, collection: Collection) -> anyhow::Result<usize> {
        let n: i64 = self
            .conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {}", collection.table()),
                [],
                |r| r.get(0),
            )
            .context("count")?;
        Ok(n as usize)
    }

    pub fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key=?1", params![key], |r| {
                r.get(0)
            })
            .optional()
            .with_context(|| format!("get {key}"))
    }

    pub fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.conn
            .execute(
                r#"
INSERT INTO kv(key, value) VALUES(?1, ?2)
ON CONFLICT(key) DO UPDATE SET value=excluded.value
"#,
                params![key, value],
            )
            .with_context(|| format!("set {key}"))?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key=?1", params![key])
            .with_context(|| format!("remove {key}"))?;
        Ok(())
    }

    /// Reads a JSON value; a missing key or an undecodable value yields `None`.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> anyhow::Result<Option<T>> {
        let Some(raw) = self.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                tracing::warn!("ignoring malformed {key}: {e}");
                Ok(None)
            }
        }
    }

    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        let raw = serde_json::to_string(value).with_context(|| format!("encode {key}"))?;
        self.set(key, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::models::{FmChannel, RemoteLink};

    fn song(id: &str, cover: bool) -> MediaRecord {
        MediaRecord {
            collection: Collection::Songs,
            id: id.to_string(),
            meta: MediaMeta::Song {
                name: format!("Song {id}"),
                artist: "Artist".into(),
                album: "Album".into(),
                cover_mime: cover.then(|| "image/png".to_string()),
            },
            blob: PathBuf::from(format!("/blobs/{id}.mp3")),
            cover: cover.then(|| CoverArt {
                mime: "image/png".into(),
                data: vec![1, 2, 3],
            }),
        }
    }

    #[test]
    fn test_upsert_and_get_all_keeps_order() {
        let s = Storage::open_in_memory().unwrap();
        s.upsert(&song("b", false), 1).unwrap();
        s.upsert(&song("a", true), 2).unwrap();

        let all = s.get_all(Collection::Songs).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "b");
        assert_eq!(all[1], song("a", true));
    }

    #[test]
    fn test_upsert_same_id_replaces() {
        let s = Storage::open_in_memory().unwrap();
        s.upsert(&song("a", false), 1).unwrap();
        s.upsert(&song("a", true), 2).unwrap();
        let all = s.get_all(Collection::Songs).unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].cover.is_some());
    }

    #[test]
    fn test_clear_only_touches_one_collection() {
        let s = Storage::open_in_memory().unwrap();
        s.upsert(&song("a", false), 1).unwrap();
        let photo = MediaRecord {
            collection: Collection::Photos,
            id: "p".into(),
            meta: MediaMeta::File { name: "p.jpg".into() },
            blob: PathBuf::from("/blobs/p.jpg"),
            cover: None,
        };
        s.upsert(&photo, 1).unwrap();

        s.clear(Collection::Songs).unwrap();
        assert_eq!(s.count(Collection::Songs).unwrap(), 0);
        assert_eq!(s.count(Collection::Photos).unwrap(), 1);
    }

    #[test]
    fn test_kv_json_roundtrip() {
        let s = Storage::open_in_memory().unwrap();
        assert_eq!(s.get_json::<Vec<FmChannel>>(keys::FM_CHANNELS).unwrap(), None);

        let links = vec![RemoteLink::Online {
            id: "online-1".into(),
            name: "Clip".into(),
            url: "https://example.com/clip.mp4".into(),
        }];
        s.set_json(keys::REMOTE_VIDEOS, &links).unwrap();
        assert_eq!(
            s.get_json::<Vec<RemoteLink>>(keys::REMOTE_VIDEOS).unwrap(),
            Some(links)
        );

        s.set(keys::THEME, "gold").unwrap();
        s.remove(keys::THEME).unwrap();
        assert_eq!(s.get(keys::THEME).unwrap(), None);
    }

    #[test]
    fn test_malformed_json_reads_as_none() {
        let s = Storage::open_in_memory().unwrap();
        s.set(keys::FM_CHANNELS, "not json").unwrap();
        assert_eq!(s.get_json::<Vec<FmChannel>>(keys::FM_CHANNELS).unwrap(), None);
    }

    #[test]
    fn test_open_creates_parent_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("library.sqlite3");
        let s = Storage::open(&path).unwrap();
        s.set("k", "v").unwrap();
        assert!(path.exists());
    }
}
