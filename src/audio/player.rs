use std::{path::Path, time::Duration};

use crate::foundation::error::ShowError;

/// Completion messages from an [`AudioPlayer`].
///
/// Every event carries the generation of the `load` it answers; the controller drops events
/// whose generation is no longer current.
#[derive(Debug)]
pub enum AudioEvent {
    Loaded { generation: u64 },
    LoadFailed { generation: u64, error: ShowError },
    Ended { generation: u64 },
    PlaybackFailed { generation: u64, error: ShowError },
}

impl AudioEvent {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Loaded { generation }
            | Self::LoadFailed { generation, .. }
            | Self::Ended { generation }
            | Self::PlaybackFailed { generation, .. } => *generation,
        }
    }
}

/// Media-playback surface for audio tracks.
///
/// `load` and `play` return immediately; their outcomes arrive through `poll_events`.
pub trait AudioPlayer {
    fn load(&mut self, generation: u64, path: &Path);

    /// Start the track most recently loaded under `generation`.
    fn play(&mut self, generation: u64);

    /// Halt whatever is playing. Must be safe to call at any time.
    fn stop(&mut self);

    fn poll_events(&mut self, now: Duration) -> Vec<AudioEvent>;
}

/// Player that never produces sound or events; for runs without an audio surface.
#[derive(Debug, Default)]
pub struct SilentPlayer;

impl AudioPlayer for SilentPlayer {
    fn load(&mut self, _generation: u64, _path: &Path) {}

    fn play(&mut self, _generation: u64) {}

    fn stop(&mut self) {}

    fn poll_events(&mut self, _now: Duration) -> Vec<AudioEvent> {
        Vec::new()
    }
}
