use std::f64::consts::{FRAC_PI_2, PI};

use super::*;

fn request(angle: f64, image: Option<(u32, u32)>) -> PanRequest {
    PanRequest {
        angle,
        bias: 0.0,
        still: false,
        on_screen_ms: 4600.0,
        image,
    }
}

fn vp() -> Viewport {
    Viewport::new(1600, 900).unwrap()
}

#[test]
fn cover_fit_fills_viewport_for_both_orientations() {
    let wide = cover_size(vp(), Some((4000, 1000)), 1.05);
    assert!((wide.height - 945.0).abs() < 1e-9);
    assert!((wide.width - 3780.0).abs() < 1e-9);

    let tall = cover_size(vp(), Some((1000, 2000)), 1.05);
    assert!((tall.width - 1680.0).abs() < 1e-9);
    assert!((tall.height - 3360.0).abs() < 1e-9);

    let unknown = cover_size(vp(), None, 1.0);
    assert_eq!(unknown, vp().size());
}

#[test]
fn static_sentinel_never_moves_for_any_aspect() {
    let cfg = PanConfig {
        alternate_bias: 50.0,
        ..PanConfig::default()
    };
    for image in [None, Some((4000, 1000)), Some((1000, 4000)), Some((1, 1))] {
        let mut req = request(0.0, image);
        req.bias = 50.0;
        let mut st = PanState::derive(&req, &cfg, vp(), TickRate::default());
        assert!(st.is_static());
        assert_eq!(st.velocity, Vec2::ZERO);
        assert_eq!(st.offset, Vec2::ZERO);
        st.advance();
        assert_eq!(st.offset, Vec2::ZERO);
        assert!((st.overscan - cfg.scale_factor * cfg.static_zoom).abs() < 1e-12);
    }
}

#[test]
fn drift_starts_opposite_the_angle_and_moves_toward_it() {
    let cfg = PanConfig::default();
    let st = PanState::derive(
        &request(PI, Some((3000, 1000))),
        &cfg,
        vp(),
        TickRate::default(),
    );
    assert!(st.max_offset.x > 0.0);
    assert!(st.offset.x > 0.0);
    assert!(st.velocity.x < 0.0);
    assert!(st.velocity.y.abs() < 1e-9);
}

#[test]
fn vertical_speed_is_damped_under_the_ceiling() {
    let cfg = PanConfig {
        speed_scale: 10.0,
        ..PanConfig::default()
    };
    let st = PanState::derive(
        &request(FRAC_PI_2, Some((1000, 3000))),
        &cfg,
        vp(),
        TickRate::default(),
    );
    assert!(st.velocity.y > 0.0);
    assert!(st.velocity.y <= cfg.vertical.ceiling);
}

#[test]
fn still_request_keeps_offset_without_velocity() {
    let cfg = PanConfig::default();
    let mut req = request(PI, Some((3000, 1000)));
    req.still = true;
    let mut st = PanState::derive(&req, &cfg, vp(), TickRate::default());
    assert_eq!(st.velocity, Vec2::ZERO);
    let start = st.offset;
    st.advance();
    assert_eq!(st.offset, start);
    assert!(start.x > 0.0);
}

#[test]
fn offsets_stay_inside_the_edge_safe_bound() {
    let cfg = PanConfig {
        speed_scale: 50.0,
        ..PanConfig::default()
    };
    let mut req = request(0.3, Some((3000, 1000)));
    req.bias = 10_000.0;
    let mut st = PanState::derive(&req, &cfg, vp(), TickRate::default());
    for _ in 0..1000 {
        st.advance();
        assert!(st.offset.x.abs() <= st.max_offset.x * 2.0 + 1e-9);
        assert!(st.offset.y.abs() <= st.max_offset.y * 2.0 + 1e-9);
    }
}

#[test]
fn damping_loop_terminates_and_scales() {
    let d = VerticalDamping::default();
    let v = damp_vertical(100.0, &d);
    assert!(v <= d.ceiling);
    let small = damp_vertical(0.1, &d);
    assert_eq!(small, 0.1);
    let neg = damp_vertical(-100.0, &d);
    assert!(neg < 0.0 && neg.abs() <= d.ceiling);
}
