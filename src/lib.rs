//! Kenburns is a folder slideshow player.
//!
//! Images from one folder are shown in name order with crossfades and a slow Ken Burns drift,
//! while the files of an optional audio folder loop underneath. The core is a per-tick
//! presentation state machine:
//!
//! - Build a [`ShowConfig`] (JSON, a [`Variant`] preset, or both)
//! - Scan the [`Catalogs`]
//! - Drive a [`SlideshowSession`] once per tick, live ([`play_show`]) or offline
//!   ([`render_show`], [`simulate_timeline`])
#![forbid(unsafe_code)]

pub mod assets;
pub mod audio;
pub mod catalog;
pub mod config;
pub mod encode;
mod foundation;
pub mod pan;
pub mod playlist;
pub mod render;
pub mod session;
pub mod transition;

pub use crate::foundation::core::{Point, Size, TickRate, Vec2, Viewport};
pub use crate::foundation::error::{ShowError, ShowResult};

pub use crate::assets::{AssetLoader, InlineLoader, NullLoader, PooledLoader, PreparedImage};
pub use crate::audio::{AudioEvent, AudioLoopController, AudioPlayer, PlaybackLog, TimelinePlayer};
pub use crate::catalog::{AssetList, Catalogs, MediaKind};
pub use crate::config::{ShowConfig, Variant};
pub use crate::encode::{FfmpegSink, FfmpegSinkOpts, FrameSink, InMemorySink, SinkConfig};
pub use crate::playlist::PlaylistCursor;
pub use crate::render::{CpuCompositor, DrawList, FrameRGBA};
pub use crate::session::{
    HostShell, RecordingHost, SlideshowSession, play_show, render_show, simulate_timeline,
};
pub use crate::transition::{Phase, PhaseChange, TransitionMachine};
