//! Looping background audio: the playlist controller and the playback surfaces it drives.

pub mod controller;
pub mod ffplay;
pub mod mix;
pub mod player;
pub mod timeline;

pub use controller::{AudioLoopController, LoopState};
pub use ffplay::FfplayPlayer;
pub use player::{AudioEvent, AudioPlayer, SilentPlayer};
pub use timeline::{PlaybackLog, PlaybackSegment, TimelinePlayer};
