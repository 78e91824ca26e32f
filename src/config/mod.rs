//! Run configuration.
//!
//! A [`ShowConfig`] is the flat, immutable record a run is started with: folders, viewport, tick
//! rate and every numeric constant the presentation machine uses. It can be read from JSON, built
//! from a [`Variant`] preset, or both (a JSON file may omit any field).

mod variant;

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::{
    foundation::core::{TickRate, Viewport},
    foundation::error::{ShowError, ShowResult},
    pan::sequencer::AngleStrategy,
};

pub use variant::Variant;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShowConfig {
    pub image_dir: PathBuf,
    /// Optional; a missing or empty folder runs the show silently.
    pub audio_dir: Option<PathBuf>,
    pub image_extensions: Vec<String>,
    pub audio_extensions: Vec<String>,
    pub viewport: Viewport,
    pub tick_rate: TickRate,
    pub timing: TimingConfig,
    pub pan: PanConfig,
    pub grouping: Option<GroupingConfig>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeInCompletion {
    /// Leave `FadeIn` as soon as the current slot is fully opaque.
    Alpha,
    /// Leave `FadeIn` once the fade duration has elapsed.
    Elapsed,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    pub fade_ms: u64,
    pub image_ms: u64,
    pub first_image_ms: Option<u64>,
    pub final_fade_ms: u64,
    pub final_image_ms: u64,
    pub final_pause_ms: u64,
    pub display_multiplier: f64,
    pub linger_second_to_last: bool,
    pub fade_in_completion: FadeInCompletion,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fade_ms: 800,
            image_ms: 3800,
            first_image_ms: Some(2500),
            final_fade_ms: 1200,
            final_image_ms: 5000,
            final_pause_ms: 1000,
            display_multiplier: 1.0,
            linger_second_to_last: false,
            fade_in_completion: FadeInCompletion::Alpha,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerticalDamping {
    pub decay: f64,
    /// Per-tick speed the vertical component is decayed under.
    pub ceiling: f64,
    pub soft_limit: f64,
    pub soft_scale: f64,
}

impl Default for VerticalDamping {
    fn default() -> Self {
        Self {
            decay: 0.85,
            ceiling: 0.6,
            soft_limit: 0.35,
            soft_scale: 0.7,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PanConfig {
    pub angles: AngleStrategy,
    /// Cover-fit overscan applied to every image (>= 1).
    pub scale_factor: f64,
    pub speed_scale: f64,
    /// Extra zoom for slots given the static sentinel angle.
    pub static_zoom: f64,
    /// Horizontal ping-pong bias in pixels; 0 disables it.
    pub alternate_bias: f64,
    pub still_first_image: bool,
    pub vertical: VerticalDamping,
}

impl Default for PanConfig {
    fn default() -> Self {
        Self {
            angles: AngleStrategy::Random { seed: 0x5eed },
            scale_factor: 1.05,
            speed_scale: 1.0,
            static_zoom: 1.08,
            alternate_bias: 0.0,
            still_first_image: true,
            vertical: VerticalDamping::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroupingConfig {
    /// Images per subject before the black pause.
    pub group_size: u32,
    /// Display multiplier for the first image of every group.
    pub lead_multiplier: f64,
    pub grace_ms: u64,
    pub floor_ms: u64,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            group_size: 3,
            lead_multiplier: 2.0,
            grace_ms: 2800,
            floor_ms: 3600,
        }
    }
}

impl Default for ShowConfig {
    fn default() -> Self {
        Variant::Classic.config()
    }
}

impl ShowConfig {
    pub fn from_json_file(path: &Path) -> ShowResult<Self> {
        Self::from_json_file_over(path, &Self::default())
    }

    /// Read a JSON config whose omitted fields, at any depth, are taken from `base`.
    pub fn from_json_file_over(path: &Path, base: &ShowConfig) -> ShowResult<Self> {
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        let overlay: serde_json::Value = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse config JSON '{}'", path.display()))?;
        Self::from_json_value_over(overlay, base)
            .with_context(|| format!("apply config '{}'", path.display()))
            .map_err(Into::into)
    }

    pub fn from_json_value_over(
        overlay: serde_json::Value,
        base: &ShowConfig,
    ) -> anyhow::Result<Self> {
        let mut merged = serde_json::to_value(base).context("serialize base config")?;
        merge_json(&mut merged, overlay);
        Ok(serde_json::from_value(merged)?)
    }

    pub fn validate(&self) -> ShowResult<()> {
        Viewport::new(self.viewport.width, self.viewport.height)?;
        TickRate::new(self.tick_rate.0)?;
        if self.image_extensions.is_empty() {
            return Err(ShowError::validation("image_extensions must be non-empty"));
        }

        let t = &self.timing;
        if t.image_ms == 0 || t.final_image_ms == 0 {
            return Err(ShowError::validation("image durations must be > 0"));
        }
        if t.first_image_ms == Some(0) {
            return Err(ShowError::validation("first_image_ms must be > 0 when set"));
        }
        if t.fade_ms == 0 || t.final_fade_ms == 0 {
            return Err(ShowError::validation("fade durations must be > 0"));
        }
        positive_finite("timing.display_multiplier", t.display_multiplier)?;

        let p = &self.pan;
        if !p.scale_factor.is_finite() || p.scale_factor < 1.0 {
            return Err(ShowError::validation("pan.scale_factor must be >= 1"));
        }
        if !p.static_zoom.is_finite() || p.static_zoom < 1.0 {
            return Err(ShowError::validation("pan.static_zoom must be >= 1"));
        }
        if !p.speed_scale.is_finite() || p.speed_scale < 0.0 {
            return Err(ShowError::validation("pan.speed_scale must be >= 0"));
        }
        if !p.alternate_bias.is_finite() {
            return Err(ShowError::validation("pan.alternate_bias must be finite"));
        }
        let v = &p.vertical;
        if !(v.decay > 0.0 && v.decay < 1.0) {
            return Err(ShowError::validation(
                "pan.vertical.decay must be within (0, 1)",
            ));
        }
        positive_finite("pan.vertical.ceiling", v.ceiling)?;
        positive_finite("pan.vertical.soft_limit", v.soft_limit)?;
        if !(v.soft_scale > 0.0 && v.soft_scale <= 1.0) {
            return Err(ShowError::validation(
                "pan.vertical.soft_scale must be within (0, 1]",
            ));
        }
        p.angles.validate()?;

        if let Some(g) = &self.grouping {
            if g.group_size == 0 {
                return Err(ShowError::validation("grouping.group_size must be > 0"));
            }
            positive_finite("grouping.lead_multiplier", g.lead_multiplier)?;
            if g.floor_ms < g.grace_ms {
                return Err(ShowError::validation(
                    "grouping.floor_ms must be >= grouping.grace_ms",
                ));
            }
        }
        Ok(())
    }
}

/// Objects merge key by key; everything else is replaced. A tagged object whose `kind` changes is
/// replaced whole so fields of the old variant do not leak into the new one.
fn merge_json(base: &mut serde_json::Value, overlay: serde_json::Value) {
    let serde_json::Value::Object(overlay) = overlay else {
        *base = overlay;
        return;
    };
    let replace = match &*base {
        serde_json::Value::Object(current) => {
            matches!((current.get("kind"), overlay.get("kind")), (Some(a), Some(b)) if a != b)
        }
        _ => true,
    };
    if replace {
        *base = serde_json::Value::Object(overlay);
        return;
    }
    if let serde_json::Value::Object(current) = base {
        for (key, value) in overlay {
            match current.get_mut(&key) {
                Some(slot) => merge_json(slot, value),
                None => {
                    current.insert(key, value);
                }
            }
        }
    }
}

fn positive_finite(name: &str, v: f64) -> ShowResult<()> {
    if !v.is_finite() || v <= 0.0 {
        return Err(ShowError::validation(format!(
            "{name} must be finite and > 0"
        )));
    }
    Ok(())
}
