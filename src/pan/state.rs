use crate::{
    config::{PanConfig, VerticalDamping},
    foundation::core::{Size, TickRate, Vec2, Viewport},
    pan::sequencer::is_static_angle,
};

/// Size an image must be drawn at to cover `viewport` (aspect preserved), times `overscan`.
///
/// Without known image dimensions the viewport's own aspect is assumed.
pub fn cover_size(viewport: Viewport, image: Option<(u32, u32)>, overscan: f64) -> Size {
    let vp = viewport.size();
    let img_ratio = match image {
        Some((w, h)) if w > 0 && h > 0 => f64::from(w) / f64::from(h),
        _ => viewport.aspect(),
    };
    if img_ratio > viewport.aspect() {
        let h = vp.height * overscan;
        Size::new(h * img_ratio, h)
    } else {
        let w = vp.width * overscan;
        Size::new(w, w / img_ratio)
    }
}

/// Inputs for deriving one slot's drift.
#[derive(Clone, Copy, Debug)]
pub struct PanRequest {
    pub angle: f64,
    /// Signed horizontal bias added to the starting offset.
    pub bias: f64,
    /// Keep the starting offset but do not move.
    pub still: bool,
    /// Time the image is expected to be on screen, in milliseconds.
    pub on_screen_ms: f64,
    pub image: Option<(u32, u32)>,
}

/// Drift of one slot, always derived from the angle that produced it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PanState {
    pub angle: f64,
    pub bias: f64,
    pub still: bool,
    pub offset: Vec2,
    pub velocity: Vec2,
    pub max_offset: Vec2,
    pub overscan: f64,
}

impl PanState {
    pub fn cleared() -> Self {
        Self {
            angle: 0.0,
            bias: 0.0,
            still: true,
            offset: Vec2::ZERO,
            velocity: Vec2::ZERO,
            max_offset: Vec2::ZERO,
            overscan: 1.0,
        }
    }

    pub fn derive(
        req: &PanRequest,
        cfg: &PanConfig,
        viewport: Viewport,
        tick_rate: TickRate,
    ) -> Self {
        let vp = viewport.size();

        if is_static_angle(req.angle) {
            let overscan = cfg.scale_factor * cfg.static_zoom;
            return Self {
                angle: req.angle,
                bias: 0.0,
                still: true,
                offset: Vec2::ZERO,
                velocity: Vec2::ZERO,
                max_offset: Vec2::ZERO,
                overscan,
            };
        }

        let cover = cover_size(viewport, req.image, cfg.scale_factor);
        let max_offset = Vec2::new(
            ((cover.width - vp.width) / 4.0).max(0.0),
            ((cover.height - vp.height) / 4.0).max(0.0),
        );

        let (sin, cos) = req.angle.sin_cos();
        let frames = tick_rate.ticks_in_ms(req.on_screen_ms).max(1.0);

        let mut velocity = Vec2::ZERO;
        if !req.still {
            let vx = if max_offset.x > 0.0 {
                2.0 * max_offset.x / frames * cos
            } else {
                0.0
            };
            let vy = if max_offset.y > 0.0 {
                2.0 * max_offset.y / frames * sin
            } else {
                0.0
            };
            velocity = Vec2::new(
                vx * cfg.speed_scale,
                damp_vertical(vy * cfg.speed_scale, &cfg.vertical),
            );
        }

        let mut state = Self {
            angle: req.angle,
            bias: req.bias,
            still: req.still,
            offset: Vec2::new(-max_offset.x * cos + req.bias, -max_offset.y * sin),
            velocity,
            max_offset,
            overscan: cfg.scale_factor,
        };
        state.clamp();
        state
    }

    pub fn is_static(&self) -> bool {
        is_static_angle(self.angle)
    }

    /// Move one tick along the drift direction.
    pub fn advance(&mut self) {
        self.offset += self.velocity;
        self.clamp();
    }

    /// Offsets stay within half of the overscan slack so the frame edge never shows.
    fn clamp(&mut self) {
        let lim = self.max_offset * 2.0;
        self.offset = Vec2::new(
            self.offset.x.clamp(-lim.x, lim.x),
            self.offset.y.clamp(-lim.y, lim.y),
        );
    }
}

fn damp_vertical(mut vy: f64, damping: &VerticalDamping) -> f64 {
    while vy.abs() > damping.ceiling {
        vy *= damping.decay;
    }
    if vy.abs() > damping.soft_limit {
        vy *= damping.soft_scale;
    }
    vy
}

#[cfg(test)]
#[path = "../../tests/unit/pan/state.rs"]
mod tests;
