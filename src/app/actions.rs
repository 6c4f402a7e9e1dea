use crate::app::events::PlayerEvent;
use crate::battery::BatteryStatus;
use crate::input::wheel::WheelEvent;
use crate::library::models::{Collection, FmChannel, MediaItem, RemoteLink};
use crate::menu::EntryId;
use crate::player::PlayerCommand;
use crate::player::controller::{SeekDirection, Transport};
use std::path::PathBuf;

#[derive(Debug)]
pub enum Action {
    Quit,
    Resize,
    Wheel(WheelEvent),
    /// A row was clicked directly.
    SelectId(EntryId),
    Seek(SeekDirection),
    Volume(i16),

    FormChar(char),
    FormBackspace,
    FormNextField,
    FormPrevField,
    FormSubmit,

    MediaImported {
        collection: Collection,
        items: Vec<MediaItem>,
        failed: usize,
    },
    ImportFailed {
        collection: Collection,
        message: String,
    },
    YoutubeTitle {
        video_id: String,
        title: Option<String>,
    },
    Player {
        transport: Transport,
        event: PlayerEvent,
    },
    LoadTimeout {
        generation: u64,
    },
    Battery(Option<BatteryStatus>),
    AppExited {
        name: String,
        result: Result<(), String>,
    },
}

/// Side effects requested by the reducer, carried out by the app loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Player(PlayerCommand),
    Persist(PersistOp),
    Import { collection: Collection, path: PathBuf },
    LookupYoutubeTitle { video_id: String },
    LaunchApp { name: String, jar: PathBuf },
    OpenExternal(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PersistOp {
    /// Drop a collection's records and blobs.
    ClearCollection(Collection),
    SaveRemoteLinks(Vec<RemoteLink>),
    SaveFmChannels(Vec<FmChannel>),
    SetSetting { key: &'static str, value: String },
}
