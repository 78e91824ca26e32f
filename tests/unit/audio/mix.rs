use super::*;
use crate::{audio::timeline::PlaybackSegment, foundation::error::ShowError};

fn pcm(frames: usize, value: f32) -> StereoPcm {
    StereoPcm {
        sample_rate: MIX_SAMPLE_RATE,
        samples: vec![value; frames * 2],
    }
}

fn segment(path: &str, start_ms: u64, end_ms: u64, truncated: bool) -> PlaybackSegment {
    PlaybackSegment {
        path: PathBuf::from(path),
        start: Duration::from_millis(start_ms),
        end: Duration::from_millis(end_ms),
        truncated,
    }
}

#[test]
fn time_to_sample_rounds_to_nearest() {
    assert_eq!(time_to_sample(Duration::from_secs(1), 48_000), 48_000);
    assert_eq!(time_to_sample(Duration::from_millis(10), 48_000), 480);
    assert_eq!(time_to_sample(Duration::ZERO, 48_000), 0);
}

#[test]
fn segments_land_at_their_timeline_offsets() {
    let log = PlaybackLog {
        segments: vec![segment("a.mp3", 0, 10, false), segment("b.mp3", 10, 20, false)],
    };
    let segs = build_segments(&log, |p: &Path| {
        Ok(pcm(48_000, if p.ends_with("a.mp3") { 0.25 } else { -0.5 }))
    });
    assert_eq!(segs.len(), 2);
    assert_eq!(segs[1].start, 480);
    assert_eq!(segs[1].len, 480);

    let out = mix_segments(&segs, 960);
    assert_eq!(out.len(), 960 * 2);
    assert_eq!(out[0], 0.25);
    assert_eq!(out[479 * 2 + 1], 0.25);
    assert_eq!(out[480 * 2], -0.5);
}

#[test]
fn each_track_is_decoded_once_and_failures_are_silent() {
    let log = PlaybackLog {
        segments: vec![
            segment("a.mp3", 0, 5, false),
            segment("bad.mp3", 5, 10, false),
            segment("a.mp3", 10, 15, false),
        ],
    };
    let mut calls = 0;
    let segs = build_segments(&log, |p: &Path| {
        calls += 1;
        if p.ends_with("bad.mp3") {
            Err(ShowError::asset_load("broken"))
        } else {
            Ok(pcm(1000, 0.1))
        }
    });
    assert_eq!(calls, 2);
    assert_eq!(segs.len(), 2);
    assert!(Arc::ptr_eq(&segs[0].source, &segs[1].source));

    let out = mix_segments(&segs, 720);
    assert_eq!(out[300 * 2], 0.0);
    assert_eq!(out[500 * 2], 0.1);
}

#[test]
fn truncated_tail_fades_and_mix_is_clamped() {
    let log = PlaybackLog {
        segments: vec![segment("a.mp3", 0, 1000, true)],
    };
    let segs = build_segments(&log, |_: &Path| Ok(pcm(96_000, 0.9)));
    let mut doubled = segs.clone();
    doubled.extend(segs.iter().cloned());

    assert_eq!(segs[0].fade_frames, 12_000);

    let out = mix_segments(&doubled, 48_000);
    assert_eq!(out[0], 1.0);
    assert_eq!(out[(48_000 - 12_000) * 2], 1.0);
    assert!(out[(48_000 - 1) * 2].abs() < 0.01);
}

#[test]
fn f32le_file_has_four_bytes_per_sample() {
    let dir = std::env::temp_dir().join(format!("kenburns_mix_{}", std::process::id()));
    let path = dir.join("mix.f32le");
    write_mix_to_f32le_file(&[0.5, -0.5, 1.0], &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 12);
    assert_eq!(f32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), -0.5);
    let _ = std::fs::remove_dir_all(&dir);
}
