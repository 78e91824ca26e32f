use std::{
    path::{Path, PathBuf},
    process::{Child, Command, Stdio},
    time::Duration,
};

use crate::{
    assets::media::is_tool_on_path,
    audio::player::{AudioEvent, AudioPlayer},
    foundation::error::ShowError,
};

/// Real-time audio through the system `ffplay` (no window, exits at end of track).
#[derive(Debug, Default)]
pub struct FfplayPlayer {
    loaded: Option<(u64, PathBuf)>,
    child: Option<(u64, Child)>,
    pending: Vec<AudioEvent>,
}

impl FfplayPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_available() -> bool {
        is_tool_on_path("ffplay")
    }

    fn kill_child(&mut self) {
        if let Some((generation, mut child)) = self.child.take() {
            if let Err(e) = child.kill() {
                tracing::debug!(generation, error = %e, "ffplay already exited");
            }
            let _ = child.wait();
        }
    }
}

impl AudioPlayer for FfplayPlayer {
    fn load(&mut self, generation: u64, path: &Path) {
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_file() => {
                self.loaded = Some((generation, path.to_path_buf()));
                self.pending.push(AudioEvent::Loaded { generation });
            }
            Ok(_) => self.pending.push(AudioEvent::LoadFailed {
                generation,
                error: ShowError::asset_load(format!("'{}' is not a file", path.display())),
            }),
            Err(e) => self.pending.push(AudioEvent::LoadFailed {
                generation,
                error: ShowError::asset_load(format!("cannot read '{}': {e}", path.display())),
            }),
        }
    }

    fn play(&mut self, generation: u64) {
        let Some((loaded_gen, path)) = self.loaded.take() else {
            return;
        };
        if loaded_gen != generation {
            return;
        }
        self.kill_child();

        let spawned = Command::new("ffplay")
            .args(["-nodisp", "-autoexit", "-loglevel", "error"])
            .arg(&path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(child) => self.child = Some((generation, child)),
            Err(e) => self.pending.push(AudioEvent::PlaybackFailed {
                generation,
                error: ShowError::playback(format!(
                    "failed to spawn ffplay (is it installed and on PATH?): {e}"
                )),
            }),
        }
    }

    fn stop(&mut self) {
        self.loaded = None;
        self.kill_child();
    }

    fn poll_events(&mut self, _now: Duration) -> Vec<AudioEvent> {
        if let Some((generation, child)) = self.child.as_mut() {
            let generation = *generation;
            match child.try_wait() {
                Ok(None) => {}
                Ok(Some(status)) => {
                    self.child = None;
                    self.pending.push(if status.success() {
                        AudioEvent::Ended { generation }
                    } else {
                        AudioEvent::PlaybackFailed {
                            generation,
                            error: ShowError::playback(format!("ffplay exited with status {status}")),
                        }
                    });
                }
                Err(e) => {
                    self.kill_child();
                    self.pending.push(AudioEvent::PlaybackFailed {
                        generation,
                        error: ShowError::playback(format!("failed to poll ffplay: {e}")),
                    });
                }
            }
        }
        std::mem::take(&mut self.pending)
    }
}

impl Drop for FfplayPlayer {
    fn drop(&mut self) {
        self.kill_child();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_fails_to_load_without_spawning() {
        let mut p = FfplayPlayer::new();
        p.load(4, Path::new("/definitely/not/here.mp3"));
        p.play(4);
        let events = p.poll_events(Duration::ZERO);
        assert!(matches!(
            events[..],
            [AudioEvent::LoadFailed { generation: 4, .. }]
        ));
        assert!(p.child.is_none());
    }
}
