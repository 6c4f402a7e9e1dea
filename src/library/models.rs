use crate::storage::blob::ObjectUrl;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// File-backed collections persisted in the media store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Songs,
    Photos,
    Videos,
    Apps,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Songs,
        Collection::Photos,
        Collection::Videos,
        Collection::Apps,
    ];

    pub fn table(self) -> &'static str {
        match self {
            Collection::Songs => "songs",
            Collection::Photos => "photos",
            Collection::Videos => "videos",
            Collection::Apps => "j2me_apps",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Collection::Songs => "Music",
            Collection::Photos => "Photos",
            Collection::Videos => "Videos",
            Collection::Apps => "Apps",
        }
    }

    /// Lowercase file extensions accepted by the import form.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Collection::Songs => &["mp3", "m4a", "aac", "flac", "ogg", "opus", "wav"],
            Collection::Photos => &["jpg", "jpeg", "png", "gif", "webp", "bmp"],
            Collection::Videos => &["mp4", "m4v", "mkv", "webm", "mov", "avi"],
            Collection::Apps => &["jar", "jad", "zip"],
        }
    }

    pub fn accepts(self, ext: &str) -> bool {
        let ext = ext.to_ascii_lowercase();
        self.extensions().iter().any(|e| *e == ext)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverArt {
    pub mime: String,
    pub data: Vec<u8>,
}

/// Metadata stored alongside each persisted blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaMeta {
    Song {
        name: String,
        artist: String,
        album: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cover_mime: Option<String>,
    },
    File {
        name: String,
    },
}

impl MediaMeta {
    pub fn name(&self) -> &str {
        match self {
            MediaMeta::Song { name, .. } | MediaMeta::File { name } => name,
        }
    }
}

/// A persisted media record: what the store hands back at startup and what
/// an import produces before it is materialized into a registry item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRecord {
    pub collection: Collection,
    pub id: String,
    pub meta: MediaMeta,
    pub blob: PathBuf,
    pub cover: Option<CoverArt>,
}

impl MediaRecord {
    /// Attach a session link, producing the in-memory item for its registry.
    pub fn into_item(self, url: ObjectUrl) -> MediaItem {
        let name = self.meta.name().to_string();
        match (self.collection, self.meta) {
            (Collection::Songs, MediaMeta::Song { artist, album, .. }) => MediaItem::Song(Song {
                id: self.id,
                name,
                artist,
                album,
                cover: self.cover,
                url,
            }),
            (Collection::Songs, MediaMeta::File { .. }) => MediaItem::Song(Song {
                id: self.id,
                name,
                artist: UNKNOWN_ARTIST.to_string(),
                album: UNKNOWN_ALBUM.to_string(),
                cover: self.cover,
                url,
            }),
            (Collection::Photos, _) => MediaItem::Photo(Photo {
                id: self.id,
                name,
                url,
            }),
            (Collection::Videos, _) => MediaItem::Video(Video {
                id: self.id,
                name,
                source: VideoSource::Local {
                    blob: self.blob,
                    url,
                },
            }),
            (Collection::Apps, _) => MediaItem::App(J2meApp {
                id: self.id,
                name,
                url,
            }),
        }
    }
}

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

#[derive(Debug)]
pub enum MediaItem {
    Song(Song),
    Photo(Photo),
    Video(Video),
    App(J2meApp),
}

#[derive(Debug)]
pub struct Song {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub cover: Option<CoverArt>,
    pub url: ObjectUrl,
}

#[derive(Debug)]
pub struct Photo {
    pub id: String,
    pub name: String,
    pub url: ObjectUrl,
}

#[derive(Debug)]
pub struct J2meApp {
    pub id: String,
    pub name: String,
    pub url: ObjectUrl,
}

#[derive(Debug)]
pub struct Video {
    pub id: String,
    pub name: String,
    pub source: VideoSource,
}

/// Where a video plays from. Exactly one origin per video.
#[derive(Debug)]
pub enum VideoSource {
    Local { blob: PathBuf, url: ObjectUrl },
    YouTube { video_id: String },
    Iptv { url: String },
    Online { url: String },
}

impl Video {
    pub fn from_link(link: RemoteLink) -> Self {
        match link {
            RemoteLink::Youtube { id, name, video_id } => Self {
                id,
                name,
                source: VideoSource::YouTube { video_id },
            },
            RemoteLink::Iptv { id, name, url } => Self {
                id,
                name,
                source: VideoSource::Iptv { url },
            },
            RemoteLink::Online { id, name, url } => Self {
                id,
                name,
                source: VideoSource::Online { url },
            },
        }
    }

    /// The persisted form of a remote video; `None` for local files.
    pub fn to_link(&self) -> Option<RemoteLink> {
        let id = self.id.clone();
        let name = self.name.clone();
        match &self.source {
            VideoSource::Local { .. } => None,
            VideoSource::YouTube { video_id } => Some(RemoteLink::Youtube {
                id,
                name,
                video_id: video_id.clone(),
            }),
            VideoSource::Iptv { url } => Some(RemoteLink::Iptv {
                id,
                name,
                url: url.clone(),
            }),
            VideoSource::Online { url } => Some(RemoteLink::Online {
                id,
                name,
                url: url.clone(),
            }),
        }
    }

    pub fn is_iptv(&self) -> bool {
        matches!(self.source, VideoSource::Iptv { .. })
    }

    pub fn origin_label(&self) -> &'static str {
        match self.source {
            VideoSource::Local { .. } => "Local",
            VideoSource::YouTube { .. } => "YouTube",
            VideoSource::Iptv { .. } => "Live TV",
            VideoSource::Online { .. } => "Online",
        }
    }
}

/// Remote videos as kept in the key-value table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RemoteLink {
    Youtube {
        id: String,
        name: String,
        video_id: String,
    },
    Iptv {
        id: String,
        name: String,
        url: String,
    },
    Online {
        id: String,
        name: String,
        url: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FmChannel {
    pub id: String,
    pub name: String,
    pub url: String,
}

/// One album as shown by Cover Flow, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub name: String,
    pub artist: String,
    pub first_song: usize,
    pub song_count: usize,
}
