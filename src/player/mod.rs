pub mod controller;
pub mod mpv;

pub use controller::{PlaybackController, PlayerCommand, Transport};
pub use mpv::{MpvHandle, MpvOptions};
