use std::path::PathBuf;

use crate::{
    foundation::{core::TickRate, error::ShowResult},
    render::FrameRGBA,
};

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    pub width: u32,
    pub height: u32,
    pub fps: TickRate,
    pub audio: Option<AudioInputConfig>,
}

/// Raw PCM soundtrack for sinks that can encode audio.
#[derive(Debug, Clone)]
pub struct AudioInputConfig {
    /// Interleaved `f32le` samples.
    pub path: PathBuf,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Consumer of rendered frames in tick order.
///
/// `push_frame` is called with strictly increasing tick indices between `begin` and `end`.
pub trait FrameSink {
    fn begin(&mut self, cfg: SinkConfig) -> ShowResult<()>;
    fn push_frame(&mut self, tick: u64, frame: &FrameRGBA) -> ShowResult<()>;
    fn end(&mut self) -> ShowResult<()>;
}

/// Keeps every frame; for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(u64, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    pub fn frames(&self) -> &[(u64, FrameRGBA)] {
        &self.frames
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ShowResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, tick: u64, frame: &FrameRGBA) -> ShowResult<()> {
        self.frames.push((tick, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> ShowResult<()> {
        self.ended = true;
        Ok(())
    }
}
