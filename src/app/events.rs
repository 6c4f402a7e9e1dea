use crate::library::import::ImportBatch;
use crate::library::models::Collection;
use crate::player::controller::Transport;

#[derive(Debug)]
pub enum Event {
    Input(InputEvent),
    Player { transport: Transport, event: PlayerEvent },
    Task(TaskEvent),
    /// Drives wheel tap deadlines and hold-repeat.
    Tick,
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Key(crossterm::event::KeyEvent),
    Mouse(crossterm::event::MouseEvent),
    Resize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    Loaded,
    Started,
    Paused,
    Position { seconds: f64 },
    Duration { seconds: f64 },
    Ended,
    Error(String),
}

/// Results of background work spawned by the app.
#[derive(Debug)]
pub enum TaskEvent {
    Imported {
        collection: Collection,
        result: Result<ImportBatch, String>,
    },
    YoutubeTitle {
        video_id: String,
        title: Option<String>,
    },
    LoadTimeout {
        generation: u64,
    },
    /// Time to ask the embedded player where it is.
    PollPosition,
    Battery(Option<crate::battery::BatteryStatus>),
    AppExited {
        name: String,
        result: Result<(), String>,
    },
}
