use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    assets::{
        AssetLoader, InlineLoader, NullLoader, PooledLoader,
        media::{MIX_SAMPLE_RATE, decode_stereo},
    },
    audio::{
        AudioPlayer, FfplayPlayer, PlaybackLog, SilentPlayer, TimelinePlayer,
        mix::{build_segments, mix_segments, time_to_sample, write_mix_to_f32le_file},
    },
    catalog::{AssetList, Catalogs, MediaKind},
    config::ShowConfig,
    encode::{AudioInputConfig, FfmpegSink, FfmpegSinkOpts, FrameSink, SinkConfig},
    foundation::{
        core::millis,
        error::{ShowError, ShowResult},
    },
    render::CpuCompositor,
    session::{
        clock::{RealtimePacer, TickClock},
        host::{HostShell, PreviewWindow, RecordingHost},
        show::SlideshowSession,
    },
    transition::PhaseChange,
};

/// No show runs longer than a day of ticks.
const MAX_RUN_SECS: u64 = 24 * 60 * 60;

/// Phase changes of a timing-only run.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Timeline {
    pub images: usize,
    pub ticks: u64,
    pub duration_ms: f64,
    pub events: Vec<PhaseChange>,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct RenderReport {
    pub out: PathBuf,
    pub frames: u64,
    pub duration_ms: f64,
    pub audio_segments: usize,
}

#[derive(Clone, Copy, Debug, serde::Serialize)]
pub struct PlayReport {
    pub ticks: u64,
    /// `false` when the window was closed before the end.
    pub finished: bool,
}

/// Run `session` on the simulated clock until it is done, calling `per_tick` after every tick.
///
/// Returns the number of ticks driven and the phase changes in order.
pub fn drive<L, P, H>(
    session: &mut SlideshowSession<L, P, H>,
    config: &ShowConfig,
    mut per_tick: impl FnMut(u64, &mut SlideshowSession<L, P, H>) -> ShowResult<()>,
) -> ShowResult<(u64, Vec<PhaseChange>)>
where
    L: AssetLoader,
    P: AudioPlayer,
    H: HostShell,
{
    let limit = u64::from(config.tick_rate.0) * MAX_RUN_SECS;
    let mut clock = TickClock::new(config.tick_rate);
    let mut events = Vec::new();

    session.start(Duration::ZERO);
    loop {
        let (tick, now) = clock.advance();
        if let Some(change) = session.tick(now) {
            events.push(change);
        }
        per_tick(tick, session)?;
        if session.is_done() {
            break;
        }
        if tick >= limit {
            return Err(ShowError::playback(format!(
                "show did not finish within {MAX_RUN_SECS} s of simulated time"
            )));
        }
    }
    Ok((clock.ticks(), events))
}

fn placeholder_images(count: usize) -> AssetList {
    AssetList::new(
        MediaKind::Image,
        (0..count)
            .map(|i| PathBuf::from(format!("image-{i:04}")))
            .collect(),
    )
}

/// Timing-only run over `image_count` placeholder images; nothing is loaded or played.
pub fn simulate_timeline(config: &ShowConfig, image_count: usize) -> ShowResult<Timeline> {
    let catalogs = Catalogs {
        images: placeholder_images(image_count),
        audio: AssetList::empty(MediaKind::Audio),
    };
    let mut session = SlideshowSession::new(
        config,
        catalogs,
        NullLoader::new(),
        SilentPlayer,
        RecordingHost::new(),
    )?;
    let (ticks, events) = drive(&mut session, config, |_, _| Ok(()))?;
    Ok(Timeline {
        images: image_count,
        ticks,
        duration_ms: millis(config.tick_rate.ticks_to_time(ticks)),
        events,
    })
}

/// First render pass: play the audio loop against the show's timing without drawing anything.
pub fn schedule_audio(
    config: &ShowConfig,
    catalogs: &Catalogs,
    player: TimelinePlayer,
) -> ShowResult<(PlaybackLog, u64)> {
    let mut session = SlideshowSession::new(
        config,
        catalogs.clone(),
        NullLoader::new(),
        player,
        RecordingHost::new(),
    )?;
    let (ticks, _) = drive(&mut session, config, |_, _| Ok(()))?;
    let (_, player, _) = session.into_parts();
    let log = player.into_log();
    tracing::debug!(segments = log.segments.len(), ticks, "audio scheduled");
    Ok((log, ticks))
}

/// Second render pass: composite every tick into `sink`. Returns the number of frames pushed.
pub fn render_frames(
    config: &ShowConfig,
    images: AssetList,
    sink: &mut dyn FrameSink,
    audio: Option<AudioInputConfig>,
) -> ShowResult<u64> {
    let catalogs = Catalogs {
        images,
        audio: AssetList::empty(MediaKind::Audio),
    };
    let mut session = SlideshowSession::new(
        config,
        catalogs,
        InlineLoader::new(),
        SilentPlayer,
        RecordingHost::new(),
    )?;
    let compositor = CpuCompositor::default();

    sink.begin(SinkConfig {
        width: config.viewport.width,
        height: config.viewport.height,
        fps: config.tick_rate,
        audio,
    })?;
    let (ticks, _) = drive(&mut session, config, |tick, s| {
        let frame = compositor.render(&s.draw_list())?;
        sink.push_frame(tick, &frame)
    })?;
    sink.end()?;
    Ok(ticks)
}

/// Render the configured folders to an MP4 at `out`, soundtrack included when audio exists.
#[tracing::instrument(skip(config), fields(out = %out.display()))]
pub fn render_show(config: &ShowConfig, out: &Path) -> ShowResult<RenderReport> {
    let catalogs = Catalogs::scan(config)?;

    let mut audio_segments = 0;
    let audio_input = if catalogs.audio.is_empty() {
        None
    } else {
        let (log, ticks) = schedule_audio(config, &catalogs, TimelinePlayer::probing())?;
        audio_segments = log.segments.len();
        if log.segments.is_empty() {
            None
        } else {
            let total = time_to_sample(config.tick_rate.ticks_to_time(ticks), MIX_SAMPLE_RATE);
            let segments = build_segments(&log, |p| decode_stereo(p, MIX_SAMPLE_RATE));
            let mix = mix_segments(&segments, total);
            let path = out.with_extension("mix.f32le");
            write_mix_to_f32le_file(&mix, &path)?;
            Some(AudioInputConfig {
                path,
                sample_rate: MIX_SAMPLE_RATE,
                channels: 2,
            })
        }
    };

    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(out));
    let frames = render_frames(config, catalogs.images, &mut sink, audio_input.clone());
    if let Some(audio) = &audio_input
        && let Err(e) = std::fs::remove_file(&audio.path)
    {
        tracing::warn!(path = %audio.path.display(), error = %e, "could not remove intermediate audio mix");
    }
    let frames = frames?;

    let report = RenderReport {
        out: out.to_path_buf(),
        frames,
        duration_ms: millis(config.tick_rate.ticks_to_time(frames)),
        audio_segments,
    };
    tracing::info!(frames = report.frames, duration_ms = report.duration_ms, "render finished");
    Ok(report)
}

/// Play the show live: real-time ticks, background decoding, `ffplay` for sound and picture.
#[tracing::instrument(skip(config), fields(images = %config.image_dir.display()))]
pub fn play_show(config: &ShowConfig) -> ShowResult<PlayReport> {
    let catalogs = Catalogs::scan(config)?;
    if !catalogs.audio.is_empty() && !FfplayPlayer::is_available() {
        tracing::warn!("ffplay not found on PATH; audio tracks will be skipped");
    }

    let mut session = SlideshowSession::new(
        config,
        catalogs,
        PooledLoader::new(),
        FfplayPlayer::new(),
        PreviewWindow::new("kenburns"),
    )?;
    session.host_mut().begin(SinkConfig {
        width: config.viewport.width,
        height: config.viewport.height,
        fps: config.tick_rate,
        audio: None,
    })?;

    let compositor = CpuCompositor::default();
    let mut pacer = RealtimePacer::new(config.tick_rate);
    let mut ticks = 0;
    session.start(Duration::ZERO);
    while !session.is_done() {
        let (tick, now) = pacer.wait_next();
        ticks = tick + 1;
        session.tick(now);
        if session.is_done() {
            break;
        }

        let frame = match compositor.render(&session.draw_list()) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(tick, error = %e, "frame skipped");
                continue;
            }
        };
        if let Err(e) = session.host_mut().push_frame(tick, &frame) {
            tracing::info!(error = %e, "preview window closed by user");
            session.stop();
        }
    }

    Ok(PlayReport {
        ticks,
        finished: session.host().is_closed(),
    })
}
