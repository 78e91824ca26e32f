use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use crate::{
    audio::player::{AudioEvent, AudioPlayer},
    catalog::AssetList,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Loading,
    Playing,
    Stopped,
}

/// Playback failures are retried for this many full passes over the list before audio is dropped.
pub const MAX_FAILED_ROUNDS: usize = 3;

/// Plays the audio list in order, forever, until stopped.
///
/// The loop only reads the shared `active` flag; it never touches image-side state.
#[derive(Debug)]
pub struct AudioLoopController {
    tracks: AssetList,
    cursor: usize,
    generation: u64,
    state: LoopState,
    failures_in_row: usize,
    load_failures_in_row: usize,
    active: Arc<AtomicBool>,
}

impl AudioLoopController {
    pub fn new(tracks: AssetList, active: Arc<AtomicBool>) -> Self {
        Self {
            tracks,
            cursor: 0,
            generation: 0,
            state: LoopState::Idle,
            failures_in_row: 0,
            load_failures_in_row: 0,
            active,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_playing(&self) -> bool {
        self.state == LoopState::Playing
    }

    /// Begin with the first track. Without tracks this does nothing.
    pub fn start(&mut self, player: &mut dyn AudioPlayer) {
        if self.tracks.is_empty() {
            tracing::info!("no audio tracks, show runs silent");
            return;
        }
        if self.state != LoopState::Idle {
            return;
        }
        self.cursor = 0;
        self.failures_in_row = 0;
        self.load_failures_in_row = 0;
        self.begin(player);
    }

    /// Halt playback. Later events are ignored; calling again is a no-op.
    pub fn stop(&mut self, player: &mut dyn AudioPlayer) {
        if self.state == LoopState::Stopped {
            return;
        }
        let was_running = self.state != LoopState::Idle;
        self.state = LoopState::Stopped;
        self.generation += 1;
        if was_running {
            player.stop();
            tracing::info!(track = self.cursor, "audio stopped");
        }
    }

    /// Deliver every pending player event, including ones caused by handling earlier events.
    pub fn pump(&mut self, now: Duration, player: &mut dyn AudioPlayer) {
        // One load and one play per track at most, so this bounds a run of instant failures.
        for _ in 0..=2 * self.tracks.len() {
            let events = player.poll_events(now);
            if events.is_empty() {
                return;
            }
            for event in events {
                self.handle(event, player);
            }
        }
    }

    pub fn handle(&mut self, event: AudioEvent, player: &mut dyn AudioPlayer) {
        if event.generation() != self.generation || self.state == LoopState::Stopped {
            tracing::debug!(
                event_generation = event.generation(),
                current = self.generation,
                "ignoring stale audio event"
            );
            return;
        }

        match event {
            AudioEvent::Loaded { .. } => {
                if !self.active.load(Ordering::SeqCst) {
                    self.stop(player);
                    return;
                }
                self.load_failures_in_row = 0;
                player.play(self.generation);
                self.state = LoopState::Playing;
                tracing::info!(track = self.cursor, path = ?self.tracks.get(self.cursor), "audio track playing");
            }
            AudioEvent::Ended { .. } => {
                self.failures_in_row = 0;
                self.advance(player);
            }
            AudioEvent::LoadFailed { error, .. } => {
                tracing::warn!(track = self.cursor, error = %error, "audio track failed to load, skipping");
                self.load_failures_in_row += 1;
                self.failures_in_row += 1;
                // Unreadable files stay unreadable; one pass over the list is enough to tell.
                if self.load_failures_in_row >= self.tracks.len() {
                    tracing::error!("no audio track could be loaded, giving up on audio");
                    self.stop(player);
                    return;
                }
                self.advance(player);
            }
            AudioEvent::PlaybackFailed { error, .. } => {
                tracing::warn!(track = self.cursor, error = %error, "audio playback failed, moving on");
                self.failures_in_row += 1;
                if self.failures_in_row >= MAX_FAILED_ROUNDS * self.tracks.len() {
                    tracing::error!(
                        rounds = MAX_FAILED_ROUNDS,
                        "audio kept failing across the whole list, giving up on audio"
                    );
                    self.stop(player);
                    return;
                }
                self.advance(player);
            }
        }
    }

    fn advance(&mut self, player: &mut dyn AudioPlayer) {
        self.cursor = (self.cursor + 1) % self.tracks.len();
        self.begin(player);
    }

    fn begin(&mut self, player: &mut dyn AudioPlayer) {
        if !self.active.load(Ordering::SeqCst) {
            self.stop(player);
            return;
        }
        let Some(path) = self.tracks.get(self.cursor) else {
            return;
        };
        self.generation += 1;
        self.state = LoopState::Loading;
        tracing::debug!(track = self.cursor, generation = self.generation, "loading audio track");
        player.load(self.generation, path);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/controller.rs"]
mod tests;
