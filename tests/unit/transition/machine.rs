use std::{path::PathBuf, sync::Arc};

use super::*;
use crate::{
    assets::{LoadRequest, NullLoader, PreparedImage},
    catalog::{AssetList, MediaKind},
    config::Variant,
    foundation::core::Vec2,
    pan::AngleStrategy,
};

fn cursor(n: usize) -> PlaylistCursor {
    PlaylistCursor::new(AssetList::new(
        MediaKind::Image,
        (0..n).map(|i| PathBuf::from(format!("{i}.jpg"))).collect(),
    ))
}

fn drifting(mut cfg: ShowConfig) -> ShowConfig {
    cfg.pan.angles = AngleStrategy::Preset { angles: vec![1.0] };
    cfg
}

fn image(w: u32, h: u32) -> Arc<PreparedImage> {
    Arc::new(PreparedImage {
        width: w,
        height: h,
        pixels: vec![255; (w * h * 4) as usize],
    })
}

/// Answers every request on the next poll with a small opaque image.
#[derive(Default)]
struct ReadyLoader {
    queue: Vec<LoadCompletion>,
}

impl AssetLoader for ReadyLoader {
    fn request(&mut self, req: LoadRequest) {
        self.queue.push(LoadCompletion {
            index: req.index,
            path: req.path,
            result: Ok(image(8, 4)),
        });
    }

    fn poll(&mut self) -> Vec<LoadCompletion> {
        std::mem::take(&mut self.queue)
    }
}

fn run_with(
    cfg: &ShowConfig,
    n: usize,
    tick: impl Fn(u64) -> Duration,
    mut each: impl FnMut(&TransitionMachine, &PlaylistCursor),
) -> Vec<PhaseChange> {
    let mut m = TransitionMachine::new(cfg).unwrap();
    let mut c = cursor(n);
    let mut loader = NullLoader::new();
    m.start(Duration::ZERO, &mut c, &mut loader);

    let mut changes = Vec::new();
    for k in 1..200_000 {
        if let Some(change) = m.step(tick(k), &mut c, &mut loader) {
            changes.push(change);
        }
        each(&m, &c);
        if m.is_ended() {
            break;
        }
    }
    assert!(m.is_ended(), "run did not finish");
    assert!(c.is_finished());
    changes
}

fn run(cfg: &ShowConfig, n: usize) -> Vec<PhaseChange> {
    let rate = cfg.tick_rate;
    run_with(cfg, n, |k| rate.ticks_to_time(k), |_, _| {})
}

#[test]
fn normal_run_visits_every_phase_in_order() {
    let cfg = drifting(ShowConfig::default());
    let to: Vec<Phase> = run(&cfg, 3).iter().map(|c| c.to).collect();
    use Phase::*;
    assert_eq!(
        to,
        vec![
            SecondImageFadeIn,
            CrossfadePlay,
            CrossfadeOut,
            FadeIn,
            SecondImageFadeIn,
            CrossfadePlay,
            CrossfadeOut,
            FadeIn,
            SecondImageFadeIn,
            CrossfadePlay,
            CrossfadeOut,
            Pause,
            Ended,
        ]
    );
}

#[test]
fn single_image_fades_in_holds_and_fades_to_black() {
    let cfg = drifting(ShowConfig::default());
    let changes = run(&cfg, 1);
    assert_eq!(changes.last().map(|c| c.to), Some(Phase::Ended));
    assert!(changes.iter().all(|c| c.to != Phase::AllFadeOut));
}

#[test]
fn alphas_stay_clamped_for_every_variant() {
    for variant in [Variant::Classic, Variant::Gallery, Variant::Personal] {
        let cfg = variant.config();
        let rate = cfg.tick_rate;
        run_with(
            &cfg,
            8,
            |k| rate.ticks_to_time(k),
            |m, _| {
                for slot in [m.current(), m.next()] {
                    assert!((0.0..=ALPHA_MAX).contains(&slot.alpha()), "{variant:?}");
                }
            },
        );
    }
}

#[test]
fn final_image_fades_to_black_before_pause() {
    let cfg = drifting(ShowConfig::default());
    let rate = cfg.tick_rate;
    let mut saw_final_fade = false;
    let changes = run_with(
        &cfg,
        3,
        |k| rate.ticks_to_time(k),
        |m, c| {
            if m.phase() == Phase::CrossfadeOut && c.is_final() {
                // Both ramp together; the empty next slot is never drawn.
                assert_eq!(m.current().alpha(), m.next().alpha());
                assert!(m.draw_list().get(SlotRole::Next).is_none());
                saw_final_fade |= m.current().alpha() > 0.0;
            }
            if m.phase() == Phase::Pause {
                assert_eq!(m.current().alpha(), 0.0);
                assert_eq!(m.next().alpha(), 0.0);
            }
        },
    );
    assert!(saw_final_fade);

    let out = changes
        .iter()
        .rposition(|c| c.to == Phase::CrossfadeOut)
        .unwrap();
    assert_eq!(changes[out + 1].to, Phase::Pause);
    let pause = &changes[out + 1];
    let ended = &changes[out + 2];
    assert!(ended.at_ms - pause.at_ms >= 1000.0);
    assert_eq!(ended.position, 3);
}

#[test]
fn non_final_rotation_happens_when_current_is_transparent() {
    let cfg = drifting(ShowConfig::default());
    let mut m = TransitionMachine::new(&cfg).unwrap();
    let mut c = cursor(3);
    let mut loader = NullLoader::new();
    m.start(Duration::ZERO, &mut c, &mut loader);
    let rate = cfg.tick_rate;

    let mut k = 0;
    while m.phase() != Phase::CrossfadeOut {
        k += 1;
        m.step(rate.ticks_to_time(k), &mut c, &mut loader);
    }
    loop {
        k += 1;
        let change = m.step(rate.ticks_to_time(k), &mut c, &mut loader);
        if let Some(change) = change {
            assert_eq!(change.from, Phase::CrossfadeOut);
            assert_eq!(change.to, Phase::FadeIn);
            break;
        }
        assert_eq!(m.next().alpha(), ALPHA_MAX);
    }
    // The incoming image keeps its opacity and drift across the rotation.
    assert_eq!(m.current().index(), Some(1));
    assert_eq!(m.current().alpha(), ALPHA_MAX);
    assert_ne!(m.current().pan().velocity, Vec2::ZERO);
    assert_eq!(m.next().index(), Some(2));
    assert_eq!(m.next().alpha(), 0.0);
}

#[test]
fn first_rotation_respects_fade_and_display_time() {
    let mut cfg = drifting(ShowConfig::default());
    cfg.timing.fade_ms = 800;
    cfg.timing.image_ms = 2400;
    cfg.timing.first_image_ms = None;

    let mut rotated_to = None;
    let changes = run_with(
        &cfg,
        3,
        |k| Duration::from_secs_f64(k as f64 * 0.0166),
        |m, _| {
            if rotated_to.is_none() && m.current().index() != Some(0) {
                rotated_to = m.current().index();
            }
        },
    );
    let first = changes
        .iter()
        .find(|c| c.from == Phase::CrossfadeOut && c.to == Phase::FadeIn)
        .unwrap();
    assert!(first.at_ms >= 800.0 / 2.0 + 2400.0, "rotated at {}", first.at_ms);
    assert_eq!(first.position, 1);
    assert_eq!(rotated_to, Some(1));
}

#[test]
fn static_sentinel_shows_only_the_incoming_image() {
    let mut cfg = ShowConfig::default();
    cfg.pan.angles = AngleStrategy::Preset { angles: vec![0.0] };
    cfg.pan.alternate_bias = 30.0;
    let rate = cfg.tick_rate;
    let mut played = false;
    run_with(
        &cfg,
        3,
        |k| rate.ticks_to_time(k),
        |m, _| {
            for slot in [m.current(), m.next()] {
                if slot.index().is_some() {
                    assert_eq!(slot.pan().offset, Vec2::ZERO);
                    assert_eq!(slot.pan().velocity, Vec2::ZERO);
                }
            }
            if m.phase() == Phase::CrossfadePlay && m.next().index().is_some() {
                played = true;
                assert_eq!(m.current().alpha(), 0.0);
                assert_eq!(m.next().alpha(), ALPHA_MAX);
            }
        },
    );
    assert!(played);
}

#[test]
fn next_assignments_alternate_the_horizontal_bias() {
    let mut cfg = drifting(ShowConfig::default());
    cfg.pan.alternate_bias = 40.0;
    cfg.pan.still_first_image = false;
    let rate = cfg.tick_rate;
    let mut biases = Vec::new();
    let mut last_phase = Phase::FadeIn;
    run_with(
        &cfg,
        4,
        |k| rate.ticks_to_time(k),
        |m, _| {
            if m.phase() == Phase::SecondImageFadeIn
                && last_phase != Phase::SecondImageFadeIn
                && m.next().index().is_some()
            {
                biases.push(m.next().pan().bias);
            }
            last_phase = m.phase();
        },
    );
    assert_eq!(biases, vec![-40.0, 40.0, -40.0]);
}

#[test]
fn grouping_inserts_black_pause_and_skips_one_image() {
    let mut cfg = drifting(Variant::Personal.config());
    cfg.grouping = Some(GroupingConfig {
        group_size: 2,
        ..GroupingConfig::default()
    });
    let changes = run(&cfg, 7);

    let skips: Vec<&PhaseChange> = changes
        .iter()
        .filter(|c| c.from == Phase::AllFadeOut)
        .collect();
    assert_eq!(skips.len(), 2);
    assert_eq!(skips[0].position, 3);
    assert_eq!(skips[1].position, 6);
    assert!(skips.iter().all(|c| c.to == Phase::FadeIn));

    for (i, c) in changes.iter().enumerate() {
        if c.to == Phase::AllFadeOut {
            assert_eq!(c.from, Phase::CrossfadePlay);
            assert!(changes[i + 1].at_ms - c.at_ms >= 3600.0);
        }
    }
    assert_eq!(changes.last().map(|c| c.to), Some(Phase::Ended));
}

#[test]
fn group_boundary_near_the_end_falls_back_to_crossfade() {
    let mut cfg = drifting(Variant::Personal.config());
    cfg.grouping = Some(GroupingConfig {
        group_size: 1,
        ..GroupingConfig::default()
    });
    // Positions 0 and 2 skip ahead; the final image crossfades out normally.
    let changes = run(&cfg, 5);
    let skips: Vec<usize> = changes
        .iter()
        .filter(|c| c.from == Phase::AllFadeOut)
        .map(|c| c.position)
        .collect();
    assert_eq!(skips, vec![2, 4]);
}

#[test]
fn stale_and_failed_completions_leave_slots_alone() {
    let cfg = drifting(ShowConfig::default());
    let mut m = TransitionMachine::new(&cfg).unwrap();
    let mut c = cursor(3);
    let mut loader = NullLoader::new();
    m.start(Duration::ZERO, &mut c, &mut loader);
    assert_eq!(loader.requested(), &[0, 1]);

    m.accept(LoadCompletion {
        index: 2,
        path: PathBuf::from("2.jpg"),
        result: Ok(image(8, 4)),
    });
    assert!(m.current().image().is_none());
    assert!(m.next().image().is_none());

    m.accept(LoadCompletion {
        index: 1,
        path: PathBuf::from("1.jpg"),
        result: Err(crate::ShowError::asset_load("corrupt")),
    });
    assert!(m.next().image().is_none());

    m.accept(LoadCompletion {
        index: 1,
        path: PathBuf::from("1.jpg"),
        result: Ok(image(8, 4)),
    });
    assert!(m.next().is_ready());
    assert!(m.current().image().is_none());
}

#[test]
fn late_image_dimensions_reshape_an_invisible_slot() {
    let cfg = drifting(ShowConfig::default());
    let mut m = TransitionMachine::new(&cfg).unwrap();
    let mut c = cursor(2);
    let mut loader = NullLoader::new();
    m.start(Duration::ZERO, &mut c, &mut loader);
    let before = m.current().pan().max_offset;

    m.accept(LoadCompletion {
        index: 0,
        path: PathBuf::from("0.jpg"),
        result: Ok(image(4000, 1000)),
    });
    let after = m.current().pan().max_offset;
    assert!(after.x > before.x);
    assert_eq!(m.current().pan().angle, 1.0);
}

#[test]
fn draw_list_layers_current_below_next() {
    let cfg = drifting(ShowConfig::default());
    let mut m = TransitionMachine::new(&cfg).unwrap();
    let mut c = cursor(3);
    let mut loader = ReadyLoader::default();
    m.start(Duration::ZERO, &mut c, &mut loader);
    assert!(m.draw_list().is_blank());

    let rate = cfg.tick_rate;
    let mut k = 0;
    while m.phase() != Phase::CrossfadePlay {
        k += 1;
        m.step(rate.ticks_to_time(k), &mut c, &mut loader);
    }
    let list = m.draw_list();
    assert_eq!(list.slots.len(), 2);
    assert_eq!(list.slots[0].role, SlotRole::Current);
    assert_eq!(list.slots[1].role, SlotRole::Next);
    assert_eq!(list.slots[1].alpha, 255);
    let next = m.next().pan().offset;
    assert_eq!(list.slots[1].center, cfg.viewport.center() + next);
    assert!(list.slots[1].size.width >= f64::from(cfg.viewport.width));
}

#[test]
fn empty_playlist_ends_immediately() {
    let cfg = ShowConfig::default();
    let mut m = TransitionMachine::new(&cfg).unwrap();
    let mut c = cursor(0);
    let mut loader = NullLoader::new();
    m.start(Duration::ZERO, &mut c, &mut loader);
    assert!(m.is_ended());
    assert!(m.step(Duration::from_millis(16), &mut c, &mut loader).is_none());
    assert!(loader.requested().is_empty());
}
