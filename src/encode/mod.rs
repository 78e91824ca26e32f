//! Frame sinks: where composited frames go (MP4 file, live preview window, memory).

pub mod ffmpeg;
pub mod ffplay;
mod pipe;
pub mod sink;

pub use ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use ffplay::FfplaySink;
pub use sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
