//! Per-run orchestration: the session object, its clocks and hosts, and the end-to-end pipelines.

pub mod clock;
pub mod host;
pub mod pipeline;
pub mod show;

pub use clock::{RealtimePacer, TickClock};
pub use host::{HostShell, PreviewWindow, RecordingHost};
pub use pipeline::{
    PlayReport, RenderReport, Timeline, drive, play_show, render_frames, render_show,
    schedule_audio, simulate_timeline,
};
pub use show::{SessionState, SlideshowSession};
