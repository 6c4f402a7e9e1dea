pub mod import;
pub mod links;
pub mod models;
pub mod tags;

use crate::storage::blob::BlobStore;
use crate::storage::{Storage, keys};
use models::{Album, Collection, FmChannel, J2meApp, MediaItem, Photo, RemoteLink, Song, Video};

/// Anything kept in a registry is addressable by a stable id.
pub trait Entry {
    fn id(&self) -> &str;
}

macro_rules! impl_entry {
    ($($t:ty),*) => {
        $(impl Entry for $t {
            fn id(&self) -> &str {
                &self.id
            }
        })*
    };
}

impl_entry!(Song, Photo, Video, J2meApp, FmChannel);

/// Ordered content list; insertion order is display order.
#[derive(Debug)]
pub struct Registry<T> {
    items: Vec<T>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Extend<T> for Registry<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, items: I) {
        self.items.extend(items);
    }
}

impl<T: Entry> Registry<T> {
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Empties the registry and hands back the removed items. Dropping them
    /// releases whatever they own.
    pub fn clear(&mut self) -> Vec<T> {
        std::mem::take(&mut self.items)
    }

    /// Removes every item matching `pred`, keeping the order of the rest.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> Vec<T> {
        let (removed, kept): (Vec<T>, Vec<T>) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|item| pred(item));
        self.items = kept;
        removed
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position_of(id).is_some()
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }
}

/// Every content registry the device knows about.
#[derive(Debug, Default)]
pub struct Library {
    pub songs: Registry<Song>,
    pub photos: Registry<Photo>,
    pub videos: Registry<Video>,
    pub fm: Registry<FmChannel>,
    pub apps: Registry<J2meApp>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds every registry from the store. Each local record gets a
    /// fresh session link.
    pub fn load(storage: &Storage, blobs: &BlobStore) -> anyhow::Result<Self> {
        let mut lib = Self::new();
        for collection in Collection::ALL {
            for record in storage.get_all(collection)? {
                let url = blobs.object_url(&record.blob);
                lib.add(record.into_item(url));
            }
        }
        let links: Vec<RemoteLink> = storage.get_json(keys::REMOTE_VIDEOS)?.unwrap_or_default();
        for link in links {
            lib.add(MediaItem::Video(Video::from_link(link)));
        }
        let channels: Vec<FmChannel> = storage.get_json(keys::FM_CHANNELS)?.unwrap_or_default();
        for channel in channels {
            push_unique(&mut lib.fm, channel);
        }
        tracing::info!(
            "library loaded: {} songs, {} photos, {} videos, {} stations, {} apps",
            lib.songs.len(),
            lib.photos.len(),
            lib.videos.len(),
            lib.fm.len(),
            lib.apps.len()
        );
        Ok(lib)
    }

    /// Appends an item to its registry unless one with the same id exists.
    /// Returns whether it was added.
    pub fn add(&mut self, item: MediaItem) -> bool {
        match item {
            MediaItem::Song(s) => push_unique(&mut self.songs, s),
            MediaItem::Photo(p) => push_unique(&mut self.photos, p),
            MediaItem::Video(v) => push_unique(&mut self.videos, v),
            MediaItem::App(a) => push_unique(&mut self.apps, a),
        }
    }

    /// Unique albums in order of first appearance.
    pub fn albums(&self) -> Vec<Album> {
        let mut albums: Vec<Album> = Vec::new();
        for (i, song) in self.songs.iter().enumerate() {
            match albums.iter_mut().find(|a| a.name == song.album) {
                Some(a) => a.song_count += 1,
                None => albums.push(Album {
                    name: song.album.clone(),
                    artist: song.artist.clone(),
                    first_song: i,
                    song_count: 1,
                }),
            }
        }
        albums
    }

    /// Registry indices of the IPTV entries among the videos.
    pub fn iptv_indices(&self) -> Vec<usize> {
        self.videos
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_iptv())
            .map(|(i, _)| i)
            .collect()
    }

    /// The remote videos, in the shape persisted to the key-value table.
    pub fn remote_links(&self) -> Vec<RemoteLink> {
        self.videos.iter().filter_map(Video::to_link).collect()
    }

    pub fn fm_channels(&self) -> Vec<FmChannel> {
        self.fm.iter().cloned().collect()
    }

    /// `"{prefix}-{unix millis}"` for a new link or station, bumped until
    /// unused.
    pub fn fresh_link_id(&self, prefix: &str) -> String {
        let mut ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        loop {
            let id = format!("{prefix}-{ms}");
            if !self.videos.contains(&id) && !self.fm.contains(&id) {
                return id;
            }
            ms += 1;
        }
    }
}

fn push_unique<T: Entry>(registry: &mut Registry<T>, item: T) -> bool {
    if registry.contains(item.id()) {
        return false;
    }
    registry.push(item);
    true
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::models::*;
    use crate::storage::blob::ObjectUrl;
    use std::path::PathBuf;

    pub fn song(id: &str, album: &str) -> Song {
        Song {
            id: id.to_string(),
            name: format!("Song {id}"),
            artist: "Artist".into(),
            album: album.to_string(),
            cover: None,
            url: ObjectUrl::direct(format!("/blobs/{id}.mp3")),
        }
    }

    pub fn local_video(id: &str) -> Video {
        Video {
            id: id.to_string(),
            name: format!("Video {id}"),
            source: VideoSource::Local {
                blob: PathBuf::from(format!("/blobs/{id}.mp4")),
                url: ObjectUrl::direct(format!("/blobs/{id}.mp4")),
            },
        }
    }

    pub fn iptv(id: &str, url: &str) -> Video {
        Video::from_link(RemoteLink::Iptv {
            id: id.to_string(),
            name: format!("Channel {id}"),
            url: url.to_string(),
        })
    }

    pub fn youtube(video_id: &str) -> Video {
        Video::from_link(RemoteLink::Youtube {
            id: format!("yt-{video_id}"),
            name: format!("Clip {video_id}"),
            video_id: video_id.to_string(),
        })
    }

    pub fn fm(id: &str) -> FmChannel {
        FmChannel {
            id: id.to_string(),
            name: format!("Radio {id}"),
            url: format!("https://radio.example.com/{id}.mp3"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_registry_keeps_insertion_order() {
        let mut r = Registry::default();
        r.push(song("b", "X"));
        r.push(song("a", "X"));
        assert_eq!(r.get(0).unwrap().id, "b");
        assert_eq!(r.position_of("a"), Some(1));
        assert_eq!(r.position_of("zzz"), None);
    }

    #[test]
    fn test_clear_returns_removed_items() {
        let mut r = Registry::default();
        r.extend([song("a", "X"), song("b", "Y")]);
        let removed = r.clear();
        assert_eq!(removed.len(), 2);
        assert!(r.is_empty());
    }

    #[test]
    fn test_remove_where_keeps_others_in_order() {
        let mut r = Registry::default();
        r.extend([
            local_video("v1"),
            iptv("t1", "https://a/1.m3u8"),
            youtube("dQw4w9WgXcQ"),
            iptv("t2", "https://a/2.m3u8"),
        ]);
        let removed = r.remove_where(|v| v.is_iptv());
        assert_eq!(removed.len(), 2);
        let ids: Vec<_> = r.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["v1", "yt-dQw4w9WgXcQ"]);
    }

    #[test]
    fn test_add_skips_duplicate_ids() {
        let mut lib = Library::new();
        assert!(lib.add(MediaItem::Song(song("a", "X"))));
        assert!(!lib.add(MediaItem::Song(song("a", "X"))));
        assert_eq!(lib.songs.len(), 1);
    }

    #[test]
    fn test_albums_are_unique_in_first_seen_order() {
        let mut lib = Library::new();
        lib.songs.extend([song("1", "B"), song("2", "A"), song("3", "B")]);
        let albums = lib.albums();
        assert_eq!(albums.len(), 2);
        assert_eq!(albums[0].name, "B");
        assert_eq!(albums[0].first_song, 0);
        assert_eq!(albums[0].song_count, 2);
        assert_eq!(albums[1].first_song, 1);
    }

    #[test]
    fn test_remote_links_skip_local_videos() {
        let mut lib = Library::new();
        lib.videos.extend([local_video("v"), youtube("dQw4w9WgXcQ")]);
        assert_eq!(lib.remote_links().len(), 1);
        assert_eq!(lib.iptv_indices(), Vec::<usize>::new());
    }

    #[test]
    fn test_load_restores_files_and_links() {
        let tmp = tempfile::tempdir().unwrap();
        let blobs = BlobStore::open(&tmp.path().join("data")).unwrap();
        let storage = Storage::open_in_memory().unwrap();

        let src = tmp.path().join("holiday.png");
        std::fs::write(&src, b"not really a png").unwrap();
        let record = import::stage_file(&blobs, Collection::Photos, &src).unwrap();
        storage.upsert(&record, 0).unwrap();

        let mut remote = Library::new();
        remote.videos.extend([youtube("dQw4w9WgXcQ"), iptv("t", "https://tv/t.m3u8")]);
        storage
            .set_json(keys::REMOTE_VIDEOS, &remote.remote_links())
            .unwrap();
        storage
            .set_json(keys::FM_CHANNELS, &vec![fm("a"), fm("a"), fm("b")])
            .unwrap();

        let lib = Library::load(&storage, &blobs).unwrap();
        assert_eq!(lib.photos.len(), 1);
        let photo = lib.photos.get(0).unwrap();
        assert_eq!(photo.name, "holiday.png");
        assert!(photo.url.path().starts_with(blobs.session_dir()));
        assert_eq!(lib.videos.len(), 2);
        assert_eq!(lib.iptv_indices(), vec![1]);
        assert_eq!(lib.fm.len(), 2);
    }
}
