//! Render surface: per-tick draw lists and a software compositor for them.

pub mod composite;
pub mod cpu;
pub mod draw;

pub use cpu::{CpuCompositor, FrameRGBA, RenderSettings};
pub use draw::{DrawList, SlotDraw};
