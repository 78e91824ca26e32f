use std::time::Duration;

use crate::foundation::error::{ShowError, ShowResult};

pub use kurbo::{Point, Size, Vec2};

/// Fully opaque slot alpha.
pub const ALPHA_MAX: f64 = 255.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> ShowResult<Self> {
        if width == 0 || height == 0 {
            return Err(ShowError::validation("viewport width/height must be non-zero"));
        }
        Ok(Self { width, height })
    }

    pub fn size(self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }

    pub fn aspect(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1600,
            height: 900,
        }
    }
}

/// Fixed rate of the driving render tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct TickRate(pub u32);

impl TickRate {
    pub fn new(per_sec: u32) -> ShowResult<Self> {
        if per_sec == 0 {
            return Err(ShowError::validation("tick rate must be > 0"));
        }
        Ok(Self(per_sec))
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }

    pub fn tick_duration(self) -> Duration {
        self.ticks_to_time(1)
    }

    /// Start time of tick `ticks`, truncated to whole nanoseconds.
    pub fn ticks_to_time(self, ticks: u64) -> Duration {
        let nanos = u128::from(ticks) * 1_000_000_000 / u128::from(self.0.max(1));
        Duration::from_nanos(nanos as u64)
    }

    /// Number of ticks covering `ms` milliseconds (fractional).
    pub fn ticks_in_ms(self, ms: f64) -> f64 {
        ms / 1000.0 * self.as_f64()
    }

    /// Per-tick alpha increment that takes a slot from 0 to 255 in `fade_ms`.
    pub fn alpha_step(self, fade_ms: f64) -> f64 {
        let ticks = self.ticks_in_ms(fade_ms);
        if ticks <= 1.0 {
            return ALPHA_MAX;
        }
        ALPHA_MAX / ticks
    }
}

impl Default for TickRate {
    fn default() -> Self {
        Self(60)
    }
}

pub fn clamp_alpha(a: f64) -> f64 {
    if a.is_nan() {
        return 0.0;
    }
    a.clamp(0.0, ALPHA_MAX)
}

pub fn alpha_to_u8(a: f64) -> u8 {
    clamp_alpha(a).round() as u8
}

pub fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
