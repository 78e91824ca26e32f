use std::process::Command;

use crate::{
    encode::{
        pipe::{FramePipe, OpaqueFrames},
        sink::{FrameSink, SinkConfig},
    },
    foundation::error::{ShowError, ShowResult},
    render::FrameRGBA,
};

/// Live preview: raw frames piped into an `ffplay` window.
#[derive(Debug)]
pub struct FfplaySink {
    title: String,
    pipe: Option<FramePipe>,
    frames: Option<OpaqueFrames>,
}

impl FfplaySink {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            pipe: None,
            frames: None,
        }
    }

    /// Tear the window down immediately instead of letting it play out buffered frames.
    pub fn close(&mut self) {
        self.frames = None;
        if let Some(pipe) = self.pipe.take() {
            pipe.kill();
            tracing::debug!("preview window closed");
        }
    }
}

impl FrameSink for FfplaySink {
    fn begin(&mut self, cfg: SinkConfig) -> ShowResult<()> {
        let frames = OpaqueFrames::new(&cfg, [0, 0, 0])?;
        let mut cmd = Command::new("ffplay");
        cmd.args(["-loglevel", "error", "-autoexit", "-window_title", &self.title])
            .args(["-f", "rawvideo", "-pixel_format", "rgba"])
            .args(["-video_size", &format!("{}x{}", cfg.width, cfg.height)])
            .args(["-framerate", &cfg.fps.0.to_string(), "-i", "pipe:0"]);
        self.pipe = Some(FramePipe::spawn("ffplay", cmd)?);
        self.frames = Some(frames);
        Ok(())
    }

    fn push_frame(&mut self, tick: u64, frame: &FrameRGBA) -> ShowResult<()> {
        let (Some(frames), Some(pipe)) = (self.frames.as_mut(), self.pipe.as_mut()) else {
            return Err(ShowError::encode("preview window is closed"));
        };
        pipe.write(frames.flatten(tick, frame)?)
    }

    fn end(&mut self) -> ShowResult<()> {
        self.frames = None;
        match self.pipe.take() {
            Some(pipe) => pipe.finish(),
            None => Ok(()),
        }
    }
}

impl Drop for FfplaySink {
    fn drop(&mut self) {
        self.close();
    }
}
