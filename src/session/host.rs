use crate::{
    encode::{FfplaySink, FrameSink, SinkConfig},
    foundation::error::ShowResult,
    render::FrameRGBA,
};

/// The window or process hosting the show.
pub trait HostShell {
    /// Ask for the display to be closed. Sent once, at the natural end of the show.
    fn request_close(&mut self);
}

/// Counts close requests; used for offline runs and tests.
#[derive(Debug, Default)]
pub struct RecordingHost {
    close_requests: usize,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn close_requests(&self) -> usize {
        self.close_requests
    }
}

impl HostShell for RecordingHost {
    fn request_close(&mut self) {
        self.close_requests += 1;
    }
}

/// `ffplay` preview window that is both the frame sink and the host shell of a live show.
#[derive(Debug)]
pub struct PreviewWindow {
    sink: FfplaySink,
    closed: bool,
}

impl PreviewWindow {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            sink: FfplaySink::new(title),
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl FrameSink for PreviewWindow {
    fn begin(&mut self, cfg: SinkConfig) -> ShowResult<()> {
        self.closed = false;
        self.sink.begin(cfg)
    }

    fn push_frame(&mut self, tick: u64, frame: &FrameRGBA) -> ShowResult<()> {
        self.sink.push_frame(tick, frame)
    }

    fn end(&mut self) -> ShowResult<()> {
        self.sink.end()
    }
}

impl HostShell for PreviewWindow {
    fn request_close(&mut self) {
        tracing::info!("closing preview window");
        self.sink.close();
        self.closed = true;
    }
}
