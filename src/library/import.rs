//! Turning files on disk into media records.

use super::models::{Collection, MediaMeta, MediaRecord};
use super::tags::{self, read_song_tags};
use crate::storage::blob::BlobStore;
use anyhow::Context;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

#[derive(Debug, Default)]
pub struct ImportBatch {
    pub records: Vec<MediaRecord>,
    pub failed: Vec<(PathBuf, String)>,
}

/// Expands `path` into the files an import would take: the file itself, or
/// the accepted files directly inside a directory, sorted by name.
pub fn collect_files(collection: Collection, path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let meta = std::fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
    if meta.is_file() {
        if !has_accepted_extension(collection, path) {
            anyhow::bail!(
                "{} is not a supported {} file",
                path.display(),
                collection.label().to_lowercase()
            );
        }
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(path).with_context(|| format!("read {}", path.display()))? {
        let entry = entry.with_context(|| format!("read {}", path.display()))?;
        let p = entry.path();
        if p.is_file() && has_accepted_extension(collection, &p) {
            files.push(p);
        }
    }
    files.sort();
    Ok(files)
}

fn has_accepted_extension(collection: Collection, path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| collection.accepts(e))
}

/// `"{file name}-{modified ms}"`, stable across re-imports of an unchanged file.
pub fn media_id(path: &Path) -> anyhow::Result<String> {
    let modified = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .with_context(|| format!("mtime {}", path.display()))?;
    let ms = modified
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    Ok(format!("{}-{ms}", tags::file_name(path)))
}

/// Stages one file: copies it into the blob store and reads its metadata.
pub fn stage_file(
    blobs: &BlobStore,
    collection: Collection,
    path: &Path,
) -> anyhow::Result<MediaRecord> {
    let id = media_id(path)?;
    let blob = blobs.ingest(collection, path)?;
    let (meta, cover) = match collection {
        Collection::Songs => {
            let t = read_song_tags(path);
            let cover_mime = t.cover.as_ref().map(|c| c.mime.clone());
            (
                MediaMeta::Song {
                    name: t.title,
                    artist: t.artist,
                    album: t.album,
                    cover_mime,
                },
                t.cover,
            )
        }
        _ => (
            MediaMeta::File {
                name: tags::file_name(path),
            },
            None,
        ),
    };
    Ok(MediaRecord {
        collection,
        id,
        meta,
        blob,
        cover,
    })
}

/// Stages every file under `path`. Individual failures are collected, not
/// fatal; only an unreadable `path` is an error.
pub fn import_path(
    blobs: &BlobStore,
    collection: Collection,
    path: &Path,
) -> anyhow::Result<ImportBatch> {
    let files = collect_files(collection, path)?;
    let mut batch = ImportBatch::default();
    for file in files {
        match stage_file(blobs, collection, &file) {
            Ok(record) => batch.records.push(record),
            Err(e) => {
                tracing::warn!("import {}: {e:#}", file.display());
                batch.failed.push((file, format!("{e:#}")));
            }
        }
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn setup() -> (tempfile::TempDir, BlobStore, PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let store = BlobStore::open(&tmp.path().join("data")).unwrap();
        let inbox = tmp.path().join("inbox");
        fs::create_dir_all(&inbox).unwrap();
        (tmp, store, inbox)
    }

    #[test]
    fn test_collect_filters_by_extension() {
        let (_tmp, _store, inbox) = setup();
        fs::write(inbox.join("b.mp3"), b"1").unwrap();
        fs::write(inbox.join("a.flac"), b"2").unwrap();
        fs::write(inbox.join("notes.txt"), b"3").unwrap();
        fs::create_dir_all(inbox.join("nested.mp3")).unwrap();

        let files = collect_files(Collection::Songs, &inbox).unwrap();
        let names: Vec<_> = files.iter().map(|p| tags::file_name(p)).collect();
        assert_eq!(names, vec!["a.flac", "b.mp3"]);
    }

    #[test]
    fn test_collect_rejects_wrong_single_file() {
        let (_tmp, _store, inbox) = setup();
        let f = inbox.join("cover.png");
        fs::write(&f, b"png").unwrap();
        assert!(collect_files(Collection::Songs, &f).is_err());
        assert_eq!(collect_files(Collection::Photos, &f).unwrap(), vec![f]);
    }

    #[test]
    fn test_media_id_uses_name_and_mtime() {
        let (_tmp, _store, inbox) = setup();
        let f = inbox.join("clip.mp4");
        fs::write(&f, b"v").unwrap();
        let id = media_id(&f).unwrap();
        assert!(id.starts_with("clip.mp4-"));
        assert_eq!(id, media_id(&f).unwrap());
    }

    #[test]
    fn test_import_song_without_tags_uses_defaults() {
        let (_tmp, store, inbox) = setup();
        fs::write(inbox.join("demo.mp3"), b"not really mp3").unwrap();

        let batch = import_path(&store, Collection::Songs, &inbox).unwrap();
        assert!(batch.failed.is_empty());
        assert_eq!(batch.records.len(), 1);
        let r = &batch.records[0];
        assert_eq!(r.meta.name(), "demo.mp3");
        assert!(r.blob.exists());
        match &r.meta {
            MediaMeta::Song { artist, .. } => assert_eq!(artist, "Unknown Artist"),
            other => panic!("unexpected meta {other:?}"),
        }
    }

    #[test]
    fn test_import_missing_path_is_error() {
        let (_tmp, store, inbox) = setup();
        assert!(import_path(&store, Collection::Photos, &inbox.join("missing")).is_err());
    }
}
