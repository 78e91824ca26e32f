//! Presentation timing state machine.
//!
//! Advanced once per render tick, the machine decides slot alphas and pan drift, when the
//! current/next slots rotate, and when the show ends.

pub mod machine;
pub mod phase;
pub mod profile;
pub mod slot;

pub use machine::TransitionMachine;
pub use phase::{Phase, PhaseChange};
pub use profile::{ProfileKind, TimingProfile};
pub use slot::{Slot, SlotRole};
