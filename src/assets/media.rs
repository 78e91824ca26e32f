//! External media tools: `ffprobe` for track lengths, `ffmpeg` for PCM decoding.

use std::{
    path::Path,
    process::{Command, Stdio},
    time::Duration,
};

use crate::foundation::error::{ShowError, ShowResult};

/// Rate the soundtrack of a rendered show is mixed at.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

/// Interleaved stereo `f32` PCM (L, R, L, R, ...).
#[derive(Clone, Debug, Default)]
pub struct StereoPcm {
    pub sample_rate: u32,
    pub samples: Vec<f32>,
}

impl StereoPcm {
    pub fn frames(&self) -> usize {
        self.samples.len() / 2
    }

    pub fn frame(&self, index: usize) -> Option<(f32, f32)> {
        let i = index.checked_mul(2)?;
        Some((*self.samples.get(i)?, *self.samples.get(i + 1)?))
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / f64::from(self.sample_rate))
    }
}

pub fn is_tool_on_path(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdin(Stdio::null())
        .output()
        .is_ok_and(|out| out.status.success())
}

fn capture(tool: &str, cmd: &mut Command, input: &Path) -> ShowResult<Vec<u8>> {
    let out = cmd
        .stdin(Stdio::null())
        .output()
        .map_err(|e| ShowError::asset_load(format!("cannot run {tool}: {e}")))?;
    if !out.status.success() {
        return Err(ShowError::asset_load(format!(
            "{tool} failed on '{}': {}",
            input.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    Ok(out.stdout)
}

/// Length of an audio file in seconds.
pub fn probe_duration_sec(path: &Path) -> ShowResult<f64> {
    let stdout = capture(
        "ffprobe",
        Command::new("ffprobe")
            .args(["-v", "error", "-show_entries", "format=duration"])
            .args(["-of", "default=noprint_wrappers=1:nokey=1"])
            .arg(path),
        path,
    )?;
    let secs = parse_duration(&String::from_utf8_lossy(&stdout)).ok_or_else(|| {
        ShowError::asset_load(format!("'{}' reports no usable duration", path.display()))
    })?;
    tracing::trace!(path = %path.display(), secs, "probed track");
    Ok(secs)
}

fn parse_duration(raw: &str) -> Option<f64> {
    let secs: f64 = raw.lines().next()?.trim().parse().ok()?;
    (secs.is_finite() && secs > 0.0).then_some(secs)
}

/// Decode any ffmpeg-readable audio file to stereo PCM at `sample_rate`.
pub fn decode_stereo(path: &Path, sample_rate: u32) -> ShowResult<StereoPcm> {
    let stdout = capture(
        "ffmpeg",
        Command::new("ffmpeg")
            .args(["-v", "error", "-i"])
            .arg(path)
            .args(["-vn", "-ac", "2", "-ar", &sample_rate.to_string()])
            .args(["-f", "f32le", "-acodec", "pcm_f32le", "pipe:1"]),
        path,
    )?;
    Ok(StereoPcm {
        sample_rate,
        samples: stereo_samples(&stdout)?,
    })
}

fn stereo_samples(bytes: &[u8]) -> ShowResult<Vec<f32>> {
    let frames = bytes.chunks_exact(8);
    if !frames.remainder().is_empty() {
        return Err(ShowError::asset_load(
            "decoded audio ends in a partial stereo frame",
        ));
    }
    Ok(frames
        .flat_map(|f| [&f[..4], &f[4..]])
        .map(|s| f32::from_le_bytes([s[0], s[1], s[2], s[3]]))
        .collect())
}
