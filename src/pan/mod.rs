//! Pan ("Ken Burns") direction sequencing and per-slot drift state.

pub mod sequencer;
pub mod state;

pub use sequencer::{AngleStrategy, PanAngleSequencer, STATIC_ANGLE, is_static_angle};
pub use state::{PanRequest, PanState, cover_size};
