use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    assets::media::probe_duration_sec,
    audio::player::{AudioEvent, AudioPlayer},
    foundation::error::{ShowError, ShowResult},
};

/// One stretch of a track on the show's clock.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PlaybackSegment {
    pub path: PathBuf,
    pub start: Duration,
    pub end: Duration,
    /// Cut short by `stop` rather than played to its end.
    pub truncated: bool,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct PlaybackLog {
    pub segments: Vec<PlaybackSegment>,
}

impl PlaybackLog {
    pub fn end(&self) -> Duration {
        self.segments
            .iter()
            .map(|s| s.end)
            .max()
            .unwrap_or(Duration::ZERO)
    }
}

type DurationProbe = Box<dyn FnMut(&Path) -> ShowResult<f64>>;

struct Playing {
    generation: u64,
    path: PathBuf,
    start: Duration,
    length: Duration,
}

/// Offline audio surface that "plays" tracks on the simulated clock.
///
/// Track lengths come from a probe (by default `ffprobe`); every play is recorded so the run's
/// soundtrack can be mixed afterwards. Tracks follow each other without gaps.
pub struct TimelinePlayer {
    probe: DurationProbe,
    now: Duration,
    resume_at: Option<Duration>,
    loaded: Option<(u64, PathBuf, Duration)>,
    playing: Option<Playing>,
    pending: Vec<AudioEvent>,
    log: PlaybackLog,
}

impl std::fmt::Debug for TimelinePlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelinePlayer")
            .field("now", &self.now)
            .field("segments", &self.log.segments.len())
            .finish_non_exhaustive()
    }
}

impl TimelinePlayer {
    pub fn new(probe: impl FnMut(&Path) -> ShowResult<f64> + 'static) -> Self {
        Self {
            probe: Box::new(probe),
            now: Duration::ZERO,
            resume_at: None,
            loaded: None,
            playing: None,
            pending: Vec::new(),
            log: PlaybackLog::default(),
        }
    }

    /// Lengths from `ffprobe`.
    pub fn probing() -> Self {
        Self::new(probe_duration_sec)
    }

    pub fn log(&self) -> &PlaybackLog {
        &self.log
    }

    pub fn into_log(self) -> PlaybackLog {
        self.log
    }
}

impl AudioPlayer for TimelinePlayer {
    fn load(&mut self, generation: u64, path: &Path) {
        match (self.probe)(path) {
            Ok(secs) if secs.is_finite() && secs > 0.0 => {
                self.loaded = Some((generation, path.to_path_buf(), Duration::from_secs_f64(secs)));
                self.pending.push(AudioEvent::Loaded { generation });
            }
            Ok(secs) => self.pending.push(AudioEvent::LoadFailed {
                generation,
                error: ShowError::asset_load(format!(
                    "'{}' has unusable duration {secs}",
                    path.display()
                )),
            }),
            Err(error) => self.pending.push(AudioEvent::LoadFailed { generation, error }),
        }
    }

    fn play(&mut self, generation: u64) {
        let Some((loaded_gen, path, length)) = self.loaded.take() else {
            return;
        };
        if loaded_gen != generation {
            return;
        }
        let start = self.resume_at.take().unwrap_or(self.now);
        self.playing = Some(Playing {
            generation,
            path,
            start,
            length,
        });
    }

    fn stop(&mut self) {
        self.loaded = None;
        self.resume_at = None;
        if let Some(p) = self.playing.take() {
            let end = self.now.clamp(p.start, p.start + p.length);
            self.log.segments.push(PlaybackSegment {
                path: p.path,
                start: p.start,
                end,
                truncated: end < p.start + p.length,
            });
        }
    }

    fn poll_events(&mut self, now: Duration) -> Vec<AudioEvent> {
        self.now = now;
        if let Some(p) = &self.playing
            && now >= p.start + p.length
        {
            let end = p.start + p.length;
            let generation = p.generation;
            if let Some(p) = self.playing.take() {
                self.log.segments.push(PlaybackSegment {
                    path: p.path,
                    start: p.start,
                    end,
                    truncated: false,
                });
            }
            self.resume_at = Some(end);
            self.pending.push(AudioEvent::Ended { generation });
        }
        std::mem::take(&mut self.pending)
    }
}
