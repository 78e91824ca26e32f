use std::{
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::Context as _;

use crate::{
    assets::media::is_tool_on_path,
    encode::{
        pipe::{FramePipe, OpaqueFrames},
        sink::{FrameSink, SinkConfig},
    },
    foundation::error::{ShowError, ShowResult},
    render::FrameRGBA,
};

#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    pub out_path: PathBuf,
    pub overwrite: bool,
    /// x264 constant rate factor, 0..=51.
    pub crf: u8,
    pub preset: String,
    /// Pass `-tune stillimage`; slideshows are mostly slow pans over still pictures.
    pub tune_still: bool,
    pub background: [u8; 3],
}

impl FfmpegSinkOpts {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            crf: 20,
            preset: "medium".to_string(),
            tune_still: true,
            background: [0, 0, 0],
        }
    }
}

/// Streams frames into the system `ffmpeg`, producing an H.264 MP4 with an optional AAC soundtrack
/// taken from the raw `f32le` file in `SinkConfig::audio`.
#[derive(Debug)]
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    pipe: Option<FramePipe>,
    frames: Option<OpaqueFrames>,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            pipe: None,
            frames: None,
        }
    }

    fn encoder_command(&self, cfg: &SinkConfig) -> ShowResult<Command> {
        let mut cmd = Command::new("ffmpeg");
        cmd.arg(if self.opts.overwrite { "-y" } else { "-n" })
            .args(["-loglevel", "error", "-f", "rawvideo", "-pix_fmt", "rgba"])
            .args(["-s", &format!("{}x{}", cfg.width, cfg.height)])
            .args(["-r", &cfg.fps.0.to_string(), "-i", "pipe:0"]);

        if let Some(audio) = &cfg.audio {
            if audio.sample_rate == 0 || audio.channels == 0 {
                return Err(ShowError::validation(
                    "soundtrack sample_rate and channels must be non-zero",
                ));
            }
            cmd.args(["-f", "f32le", "-ar", &audio.sample_rate.to_string()])
                .args(["-ac", &audio.channels.to_string(), "-i"])
                .arg(&audio.path);
        }

        cmd.args(["-c:v", "libx264", "-pix_fmt", "yuv420p"])
            .args(["-preset", &self.opts.preset, "-crf", &self.opts.crf.to_string()]);
        if self.opts.tune_still {
            cmd.args(["-tune", "stillimage"]);
        }
        match cfg.audio {
            Some(_) => cmd.args(["-c:a", "aac", "-b:a", "192k", "-shortest"]),
            None => cmd.arg("-an"),
        };
        cmd.args(["-movflags", "+faststart"]).arg(&self.opts.out_path);
        Ok(cmd)
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> ShowResult<()> {
        let frames = OpaqueFrames::new(&cfg, self.opts.background)?;
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(ShowError::validation(
                "mp4 output needs even width and height (yuv420p)",
            ));
        }
        if self.opts.crf > 51 {
            return Err(ShowError::validation("crf must be within 0..=51"));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(ShowError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }
        if !is_tool_on_path("ffmpeg") {
            return Err(ShowError::encode("ffmpeg was not found on PATH"));
        }

        let cmd = self.encoder_command(&cfg)?;
        self.pipe = Some(FramePipe::spawn("ffmpeg", cmd)?);
        self.frames = Some(frames);
        tracing::info!(
            out = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            fps = cfg.fps.0,
            audio = cfg.audio.is_some(),
            "encoding started"
        );
        Ok(())
    }

    fn push_frame(&mut self, tick: u64, frame: &FrameRGBA) -> ShowResult<()> {
        let (Some(frames), Some(pipe)) = (self.frames.as_mut(), self.pipe.as_mut()) else {
            return Err(ShowError::encode("ffmpeg sink is not running"));
        };
        pipe.write(frames.flatten(tick, frame)?)
    }

    fn end(&mut self) -> ShowResult<()> {
        self.frames = None;
        let pipe = self
            .pipe
            .take()
            .ok_or_else(|| ShowError::encode("ffmpeg sink is not running"))?;
        pipe.finish()?;
        tracing::info!(out = %self.opts.out_path.display(), "encoding finished");
        Ok(())
    }
}

fn ensure_parent_dir(path: &Path) -> ShowResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory '{}'", parent.display()))?;
    }
    Ok(())
}
