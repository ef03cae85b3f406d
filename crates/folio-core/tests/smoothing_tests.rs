// Host-side tests for the scalar smoothing step.

use folio_core::{lerp, SmoothingFactor};

#[test]
fn lerp_at_target_is_a_fixed_point() {
    for &t in &[-3.5_f32, 0.0, 0.25, 1.0, 42.0] {
        for &f in &[0.01_f32, 0.05, 0.5, 1.0] {
            assert_eq!(lerp(t, t, f), t); // already there, stays there
        }
    }
}

#[test]
fn lerp_converges_monotonically_without_overshoot() {
    let target = 2.0_f32;
    let mut current = -1.0_f32;
    let mut last_gap = (target - current).abs();
    for _ in 0..200 {
        current = lerp(current, target, 0.05);
        let gap = (target - current).abs();
        assert!(gap < last_gap, "gap must shrink every step");
        assert!(current <= target, "never passes the target");
        last_gap = gap;
    }
    assert!(last_gap < 1e-3);
}

#[test]
fn lerp_closes_the_expected_fraction() {
    // 5% of the remaining distance per step
    assert!((lerp(0.0, 1.0, 0.05) - 0.05).abs() < 1e-7);
    assert!((lerp(1.0, 0.0, 0.05) - 0.95).abs() < 1e-7);
    assert!((lerp(10.0, 20.0, 0.5) - 15.0).abs() < 1e-6);
}

#[test]
fn snap_factor_lands_on_target() {
    assert_eq!(SmoothingFactor::SNAP.apply(-7.0, 3.0), 3.0);
    assert_eq!(lerp(-7.0, 3.0, 1.0), 3.0);
}

#[test]
fn components_blend_independently() {
    // Each axis moves by the same fraction of its own gap, so a vector
    // does not travel in a straight line toward its target.
    let f = SmoothingFactor::default();
    let (x, y) = (f.apply(0.0, 1.0), f.apply(0.0, 10.0));
    assert!((x - 0.05).abs() < 1e-7);
    assert!((y - 0.5).abs() < 1e-6);
}
