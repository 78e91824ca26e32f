use crate::{config::TimingConfig, foundation::core::TickRate};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    First,
    Default,
    SecondToLast,
    Final,
}

/// Timing bundle for the image at one playlist position.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct TimingProfile {
    pub kind: ProfileKind,
    pub fade_ms: f64,
    pub display_ms: f64,
    pub pause_ms: f64,
    /// Alpha change per tick for this profile's fades.
    pub alpha_step: f64,
}

impl TimingProfile {
    /// Select the profile for position `index` in a list of `len` images.
    ///
    /// The final image wins over the first when the list has one entry.
    pub fn for_position(index: usize, len: usize, timing: &TimingConfig, rate: TickRate) -> Self {
        let is_final = len > 0 && index + 1 >= len;
        let is_second_to_last = len >= 2 && index + 2 == len;

        let (kind, fade_ms, display_ms, pause_ms) = if is_final {
            (
                ProfileKind::Final,
                timing.final_fade_ms,
                timing.final_image_ms,
                timing.final_pause_ms,
            )
        } else if is_second_to_last && timing.linger_second_to_last {
            (
                ProfileKind::SecondToLast,
                timing.final_fade_ms,
                timing.final_image_ms,
                0,
            )
        } else if index == 0
            && let Some(first_ms) = timing.first_image_ms
        {
            (ProfileKind::First, timing.fade_ms, first_ms, 0)
        } else {
            (ProfileKind::Default, timing.fade_ms, timing.image_ms, 0)
        };

        let fade_ms = fade_ms as f64;
        Self {
            kind,
            fade_ms,
            display_ms: display_ms as f64,
            pause_ms: pause_ms as f64,
            alpha_step: rate.alpha_step(fade_ms),
        }
    }

    /// Approximate on-screen time used to size the pan drift.
    pub fn on_screen_ms(&self) -> f64 {
        self.display_ms + self.fade_ms
    }
}
