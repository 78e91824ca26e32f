use std::{collections::VecDeque, path::Path, path::PathBuf};

use super::*;
use crate::{catalog::MediaKind, foundation::error::ShowError};

#[derive(Debug, PartialEq)]
enum Call {
    Load(u64, PathBuf),
    Play(u64),
    Stop,
}

/// Loads succeed instantly; tracks end only when the test says so.
#[derive(Default)]
struct ScriptedPlayer {
    calls: Vec<Call>,
    pending: VecDeque<AudioEvent>,
    broken: Vec<PathBuf>,
}

impl AudioPlayer for ScriptedPlayer {
    fn load(&mut self, generation: u64, path: &Path) {
        self.calls.push(Call::Load(generation, path.to_path_buf()));
        if self.broken.iter().any(|b| b == path) {
            self.pending.push_back(AudioEvent::LoadFailed {
                generation,
                error: ShowError::asset_load("unreadable"),
            });
        } else {
            self.pending.push_back(AudioEvent::Loaded { generation });
        }
    }

    fn play(&mut self, generation: u64) {
        self.calls.push(Call::Play(generation));
    }

    fn stop(&mut self) {
        self.calls.push(Call::Stop);
    }

    fn poll_events(&mut self, _now: Duration) -> Vec<AudioEvent> {
        self.pending.drain(..).collect()
    }
}

fn tracks(n: usize) -> AssetList {
    AssetList::new(
        MediaKind::Audio,
        (0..n).map(|i| PathBuf::from(format!("{i}.mp3"))).collect(),
    )
}

fn controller(n: usize) -> AudioLoopController {
    AudioLoopController::new(tracks(n), Arc::new(AtomicBool::new(true)))
}

#[test]
fn empty_playlist_start_is_a_no_op() {
    let mut c = controller(0);
    let mut p = ScriptedPlayer::default();
    c.start(&mut p);
    c.pump(Duration::ZERO, &mut p);
    assert_eq!(c.state(), LoopState::Idle);
    assert!(p.calls.is_empty());
}

#[test]
fn cursor_wraps_after_one_completion_per_track() {
    let mut c = controller(3);
    let mut p = ScriptedPlayer::default();
    c.start(&mut p);
    c.pump(Duration::ZERO, &mut p);
    assert!(c.is_playing());
    assert_eq!(c.cursor(), 0);

    for expected in [1, 2, 0] {
        let generation = c.generation();
        c.handle(AudioEvent::Ended { generation }, &mut p);
        c.pump(Duration::ZERO, &mut p);
        assert_eq!(c.cursor(), expected);
        assert!(c.is_playing());
    }
    assert_eq!(
        p.calls.iter().filter(|c| matches!(c, Call::Play(_))).count(),
        4
    );
}

#[test]
fn stale_completion_is_ignored() {
    let mut c = controller(2);
    let mut p = ScriptedPlayer::default();
    c.start(&mut p);
    c.pump(Duration::ZERO, &mut p);
    let old = c.generation();
    c.handle(AudioEvent::Ended { generation: old }, &mut p);
    c.pump(Duration::ZERO, &mut p);
    assert_eq!(c.cursor(), 1);

    c.handle(AudioEvent::Ended { generation: old }, &mut p);
    assert_eq!(c.cursor(), 1);
    assert!(c.is_playing());
}

#[test]
fn stop_is_immediate_and_idempotent() {
    let mut c = controller(2);
    let mut p = ScriptedPlayer::default();
    c.start(&mut p);
    c.pump(Duration::ZERO, &mut p);
    let generation = c.generation();

    c.stop(&mut p);
    c.stop(&mut p);
    assert_eq!(c.state(), LoopState::Stopped);
    assert_eq!(p.calls.iter().filter(|c| **c == Call::Stop).count(), 1);

    // A completion racing the stop must not restart the loop.
    c.handle(AudioEvent::Ended { generation }, &mut p);
    assert_eq!(c.state(), LoopState::Stopped);
    assert!(!p.calls.iter().skip_while(|c| **c != Call::Stop).any(|c| matches!(c, Call::Load(..))));
}

#[test]
fn failed_tracks_are_skipped() {
    let mut c = controller(3);
    let mut p = ScriptedPlayer {
        broken: vec![PathBuf::from("0.mp3")],
        ..ScriptedPlayer::default()
    };
    c.start(&mut p);
    c.pump(Duration::ZERO, &mut p);
    assert_eq!(c.cursor(), 1);
    assert!(c.is_playing());

    let generation = c.generation();
    c.handle(
        AudioEvent::PlaybackFailed {
            generation,
            error: ShowError::playback("device busy"),
        },
        &mut p,
    );
    c.pump(Duration::ZERO, &mut p);
    assert_eq!(c.cursor(), 2);
    assert!(c.is_playing());
}

#[test]
fn all_tracks_failing_stops_the_loop() {
    let mut c = controller(2);
    let mut p = ScriptedPlayer {
        broken: vec![PathBuf::from("0.mp3"), PathBuf::from("1.mp3")],
        ..ScriptedPlayer::default()
    };
    c.start(&mut p);
    c.pump(Duration::ZERO, &mut p);
    assert_eq!(c.state(), LoopState::Stopped);
    assert_eq!(
        p.calls.iter().filter(|c| matches!(c, Call::Load(..))).count(),
        2
    );
}

#[test]
fn inactive_show_blocks_the_next_track() {
    let active = Arc::new(AtomicBool::new(true));
    let mut c = AudioLoopController::new(tracks(2), Arc::clone(&active));
    let mut p = ScriptedPlayer::default();
    c.start(&mut p);
    c.pump(Duration::ZERO, &mut p);

    active.store(false, Ordering::SeqCst);
    let generation = c.generation();
    c.handle(AudioEvent::Ended { generation }, &mut p);
    assert_eq!(c.state(), LoopState::Stopped);
    assert_eq!(
        p.calls.iter().filter(|c| matches!(c, Call::Load(..))).count(),
        1
    );
}

fn fail_playback(c: &mut AudioLoopController, p: &mut ScriptedPlayer) {
    let generation = c.generation();
    c.handle(
        AudioEvent::PlaybackFailed {
            generation,
            error: ShowError::playback("ffplay exited with status 1"),
        },
        p,
    );
    c.pump(Duration::ZERO, p);
}

#[test]
fn single_track_survives_a_playback_failure() {
    let mut c = controller(1);
    let mut p = ScriptedPlayer::default();
    c.start(&mut p);
    c.pump(Duration::ZERO, &mut p);

    fail_playback(&mut c, &mut p);
    assert!(c.is_playing());
    assert_eq!(c.cursor(), 0);
    assert_eq!(
        p.calls.iter().filter(|c| matches!(c, Call::Load(..))).count(),
        2
    );

    // A clean finish clears the failure streak.
    let generation = c.generation();
    c.handle(AudioEvent::Ended { generation }, &mut p);
    c.pump(Duration::ZERO, &mut p);
    for _ in 1..MAX_FAILED_ROUNDS {
        fail_playback(&mut c, &mut p);
    }
    assert!(c.is_playing());
}

#[test]
fn playback_failing_every_round_eventually_goes_silent() {
    let mut c = controller(2);
    let mut p = ScriptedPlayer::default();
    c.start(&mut p);
    c.pump(Duration::ZERO, &mut p);

    for _ in 1..MAX_FAILED_ROUNDS * 2 {
        fail_playback(&mut c, &mut p);
        assert!(c.is_playing());
    }
    fail_playback(&mut c, &mut p);
    assert_eq!(c.state(), LoopState::Stopped);
}
