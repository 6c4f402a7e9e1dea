//! Song tag extraction. Any failure falls back to filename-derived defaults.

use super::models::{CoverArt, UNKNOWN_ALBUM, UNKNOWN_ARTIST};
use anyhow::Context;
use std::path::Path;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::{StandardTagKey, Value};
use symphonia::core::probe::Hint;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongTags {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub cover: Option<CoverArt>,
}

impl SongTags {
    pub fn fallback(path: &Path) -> Self {
        Self {
            title: file_name(path),
            artist: UNKNOWN_ARTIST.to_string(),
            album: UNKNOWN_ALBUM.to_string(),
            cover: None,
        }
    }

    fn apply(&mut self, key: StandardTagKey, value: &Value) {
        let text = value.to_string();
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        match key {
            StandardTagKey::TrackTitle => self.title = text.to_string(),
            StandardTagKey::Artist => self.artist = text.to_string(),
            StandardTagKey::AlbumArtist if self.artist == UNKNOWN_ARTIST => {
                self.artist = text.to_string()
            }
            StandardTagKey::Album => self.album = text.to_string(),
            _ => {}
        }
    }
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Reads title, artist, album and the first embedded picture.
pub fn read_song_tags(path: &Path) -> SongTags {
    match probe_tags(path) {
        Ok(tags) => tags,
        Err(e) => {
            tracing::debug!("no tags for {}: {e:#}", path.display());
            SongTags::fallback(path)
        }
    }
}

fn probe_tags(path: &Path) -> anyhow::Result<SongTags> {
    let src = std::fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let mut probed = symphonia::default::get_probe()
        .format(&hint, mss, &Default::default(), &Default::default())
        .context("probe format")?;

    let metadata = match probed.metadata.get() {
        Some(m) => m,
        None => probed.format.metadata(),
    };
    let revision = metadata.current().context("no metadata revision")?;

    let mut tags = SongTags::fallback(path);
    for tag in revision.tags() {
        if let Some(key) = tag.std_key {
            tags.apply(key, &tag.value);
        }
    }
    tags.cover = revision.visuals().first().map(|v| CoverArt {
        mime: v.media_type.clone(),
        data: v.data.to_vec(),
    });
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreadable_file_falls_back_to_filename() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("Track 01.mp3");
        std::fs::write(&path, b"definitely not audio").unwrap();

        let tags = read_song_tags(&path);
        assert_eq!(tags.title, "Track 01.mp3");
        assert_eq!(tags.artist, UNKNOWN_ARTIST);
        assert_eq!(tags.album, UNKNOWN_ALBUM);
        assert!(tags.cover.is_none());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let tags = read_song_tags(Path::new("/nonexistent/song.flac"));
        assert_eq!(tags.title, "song.flac");
    }

    #[test]
    fn test_blank_tag_values_are_ignored() {
        let mut tags = SongTags::fallback(Path::new("a.mp3"));
        tags.apply(StandardTagKey::Artist, &Value::String("  ".into()));
        tags.apply(StandardTagKey::Album, &Value::String("Blue".into()));
        assert_eq!(tags.artist, UNKNOWN_ARTIST);
        assert_eq!(tags.album, "Blue");
    }
}
