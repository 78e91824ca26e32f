use std::f64::consts::TAU;

use crate::foundation::error::{ShowError, ShowResult};

/// Angle reserved for "no drift": the slot is shown static and slightly zoomed.
pub const STATIC_ANGLE: f64 = 0.0;

pub fn is_static_angle(angle: f64) -> bool {
    angle == STATIC_ANGLE
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AngleStrategy {
    /// Uniform angles in `[0, 2π)` from a seeded generator.
    Random { seed: u64 },
    /// Fixed cycle of angles in radians; repeated `0.0` entries slow the rotation of special angles.
    Preset { angles: Vec<f64> },
}

impl AngleStrategy {
    pub fn validate(&self) -> ShowResult<()> {
        match self {
            Self::Random { .. } => Ok(()),
            Self::Preset { angles } => {
                if angles.is_empty() {
                    return Err(ShowError::validation("preset angle list must be non-empty"));
                }
                if angles.iter().any(|a| !a.is_finite()) {
                    return Err(ShowError::validation("preset angles must be finite"));
                }
                Ok(())
            }
        }
    }
}

#[derive(Clone, Debug)]
enum Source {
    Random(fastrand::Rng),
    Preset { angles: Vec<f64>, position: usize },
}

/// Deterministic, cyclic source of pan angles.
#[derive(Clone, Debug)]
pub struct PanAngleSequencer {
    source: Source,
}

impl PanAngleSequencer {
    pub fn new(strategy: &AngleStrategy) -> ShowResult<Self> {
        strategy.validate()?;
        let source = match strategy {
            AngleStrategy::Random { seed } => Source::Random(fastrand::Rng::with_seed(*seed)),
            AngleStrategy::Preset { angles } => Source::Preset {
                angles: angles.clone(),
                position: 0,
            },
        };
        Ok(Self { source })
    }

    pub fn next_angle(&mut self) -> f64 {
        match &mut self.source {
            Source::Random(rng) => rng.f64() * TAU,
            Source::Preset { angles, position } => {
                let angle = angles[*position % angles.len()];
                *position = (*position + 1) % angles.len();
                angle
            }
        }
    }
}

impl Iterator for PanAngleSequencer {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_angle())
    }
}
