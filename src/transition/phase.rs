#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    FadeIn,
    SecondImageFadeIn,
    CrossfadePlay,
    CrossfadeOut,
    /// Both slots fade to black at a group boundary.
    AllFadeOut,
    /// Black hold after the final image.
    Pause,
    Ended,
}

impl Phase {
    /// Whether the `next` slot takes part in drawing during this phase.
    pub fn shows_next(self) -> bool {
        matches!(
            self,
            Self::SecondImageFadeIn | Self::CrossfadePlay | Self::CrossfadeOut | Self::AllFadeOut
        )
    }

    pub fn is_ended(self) -> bool {
        self == Self::Ended
    }
}

/// One phase transition, as reported by `TransitionMachine::step`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PhaseChange {
    pub at_ms: f64,
    pub from: Phase,
    pub to: Phase,
    /// Playlist position after the transition.
    pub position: usize,
}
