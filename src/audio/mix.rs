//! Offline soundtrack mixing from a [`PlaybackLog`].

use std::{
    collections::HashMap,
    fs::File,
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Context as _;

use crate::{
    assets::media::{MIX_SAMPLE_RATE, StereoPcm},
    audio::timeline::PlaybackLog,
    foundation::error::ShowResult,
};

/// Fade applied to the tail of a track that `stop` cut short.
const CUT_FADE: Duration = Duration::from_millis(250);

/// One decoded stretch of audio placed on the mix timeline, in frames at [`MIX_SAMPLE_RATE`].
#[derive(Clone, Debug)]
pub struct MixSegment {
    pub start: u64,
    pub len: u64,
    pub fade_frames: u64,
    pub source: Arc<StereoPcm>,
}

/// Resolve a playback log into mixable segments.
///
/// Each distinct track is decoded once. Tracks that fail to decode are left silent.
pub fn build_segments(
    log: &PlaybackLog,
    mut decode: impl FnMut(&Path) -> ShowResult<StereoPcm>,
) -> Vec<MixSegment> {
    let mut cache: HashMap<PathBuf, Option<Arc<StereoPcm>>> = HashMap::new();
    log.segments
        .iter()
        .filter_map(|seg| {
            let source = cache
                .entry(seg.path.clone())
                .or_insert_with(|| match decode(&seg.path) {
                    Ok(pcm) => Some(Arc::new(pcm)),
                    Err(err) => {
                        tracing::warn!(path = %seg.path.display(), error = %err, "track left silent in mix");
                        None
                    }
                })
                .clone()?;
            let start = time_to_sample(seg.start, MIX_SAMPLE_RATE);
            let end = time_to_sample(seg.end, MIX_SAMPLE_RATE);
            Some(MixSegment {
                start,
                len: end.saturating_sub(start),
                fade_frames: if seg.truncated {
                    time_to_sample(CUT_FADE, MIX_SAMPLE_RATE)
                } else {
                    0
                },
                source,
            })
        })
        .collect()
}

/// Sum `segments` into interleaved stereo of exactly `total_frames` frames, clamped to [-1, 1].
pub fn mix_segments(segments: &[MixSegment], total_frames: u64) -> Vec<f32> {
    let mut out = vec![0.0f32; total_frames as usize * 2];
    for seg in segments {
        let room = total_frames.saturating_sub(seg.start);
        let len = seg.len.min(room).min(seg.source.frames() as u64);
        let first = seg.start as usize;
        for rel in 0..len {
            let Some((l, r)) = seg.source.frame(rel as usize) else {
                break;
            };
            let gain = tail_gain(seg.len - rel, seg.fade_frames);
            let dst = (first + rel as usize) * 2;
            out[dst] += l * gain;
            out[dst + 1] += r * gain;
        }
    }
    out.iter_mut().for_each(|s| *s = s.clamp(-1.0, 1.0));
    out
}

fn tail_gain(remaining: u64, fade_frames: u64) -> f32 {
    if fade_frames == 0 || remaining >= fade_frames {
        return 1.0;
    }
    remaining as f32 / fade_frames as f32
}

pub fn write_mix_to_f32le_file(samples: &[f32], out_path: &Path) -> ShowResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create mix directory '{}'", parent.display()))?;
    }
    let file = File::create(out_path)
        .with_context(|| format!("create mix file '{}'", out_path.display()))?;
    let mut w = BufWriter::new(file);
    for s in samples {
        w.write_all(&s.to_le_bytes())
            .with_context(|| format!("write mix file '{}'", out_path.display()))?;
    }
    w.flush()
        .with_context(|| format!("flush mix file '{}'", out_path.display()))?;
    Ok(())
}

/// Nearest sample index of `t` at `sample_rate`.
pub fn time_to_sample(t: Duration, sample_rate: u32) -> u64 {
    let num = t.as_nanos() * u128::from(sample_rate);
    ((num + 500_000_000) / 1_000_000_000) as u64
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
