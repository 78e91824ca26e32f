use std::path::PathBuf;

use crate::{
    config::{
        FadeInCompletion, GroupingConfig, PanConfig, ShowConfig, TimingConfig, VerticalDamping,
    },
    foundation::core::{TickRate, Viewport},
    pan::sequencer::AngleStrategy,
};

/// Named parameter sets for the player's presentation styles.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Random drift, quick first image, lingering fade-to-black ending.
    Classic,
    /// Preset angle cycle with static showcase slots, ping-pong bias, slower pacing.
    Gallery,
    /// Images grouped per subject with a black pause between groups.
    Personal,
}

const QUARTER_TURNS: [f64; 4] = [
    std::f64::consts::FRAC_PI_4,
    3.0 * std::f64::consts::FRAC_PI_4,
    5.0 * std::f64::consts::FRAC_PI_4,
    7.0 * std::f64::consts::FRAC_PI_4,
];

impl Variant {
    pub fn config(self) -> ShowConfig {
        let base = ShowConfig {
            image_dir: PathBuf::from("images"),
            audio_dir: None,
            image_extensions: vec!["jpg".to_string(), "jpeg".to_string()],
            audio_extensions: vec!["mp3".to_string()],
            viewport: Viewport::default(),
            tick_rate: TickRate::default(),
            timing: TimingConfig::default(),
            pan: PanConfig::default(),
            grouping: None,
        };

        match self {
            Self::Classic => base,
            Self::Gallery => {
                // Two zero entries per cycle keep the static showcase from repeating too often.
                let mut angles = vec![0.0];
                angles.extend_from_slice(&QUARTER_TURNS);
                angles.push(0.0);
                angles.extend([0.0, std::f64::consts::PI]);
                ShowConfig {
                    timing: TimingConfig {
                        image_ms: 2400,
                        display_multiplier: 1.35,
                        linger_second_to_last: true,
                        ..TimingConfig::default()
                    },
                    pan: PanConfig {
                        angles: AngleStrategy::Preset { angles },
                        scale_factor: 1.15,
                        alternate_bias: 40.0,
                        still_first_image: false,
                        ..PanConfig::default()
                    },
                    ..base
                }
            }
            Self::Personal => ShowConfig {
                timing: TimingConfig {
                    image_ms: 2400,
                    first_image_ms: None,
                    fade_in_completion: FadeInCompletion::Elapsed,
                    ..TimingConfig::default()
                },
                pan: PanConfig {
                    scale_factor: 1.2,
                    speed_scale: 0.8,
                    alternate_bias: 25.0,
                    vertical: VerticalDamping {
                        ceiling: 0.45,
                        ..VerticalDamping::default()
                    },
                    ..PanConfig::default()
                },
                grouping: Some(GroupingConfig::default()),
                ..base
            },
        }
    }
}
