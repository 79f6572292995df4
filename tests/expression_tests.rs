//! Expression and Gaze Tests
//!
//! Tests for:
//! - Frame-rate-clamped exponential smoothing
//! - ExpressionBlender targets, relaxation and name lookups
//! - LookAtController attach-once and gaze mapping

use glam::{Vec2, Vec3};

use puppet::expression::{Expression, ExpressionBlender, smooth_toward};
use puppet::look_at::LookAtController;
use puppet::pose::{EyeOpenness, FacePose, MouthShape};
use puppet::rig::{HumanoidRig, MemoryRig};
use puppet::settings::SmoothingRates;

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn face(eyes: f32, a: f32) -> FacePose {
    FacePose {
        mouth: MouthShape {
            a,
            ..MouthShape::default()
        },
        eyes: EyeOpenness { left: eyes, right: eyes },
        ..FacePose::default()
    }
}

// ============================================================================
// smooth_toward
// ============================================================================

#[test]
fn smooth_moves_fraction_of_gap() {
    assert!(approx(smooth_toward(0.0, 1.0, 8.0, 0.05), 0.4));
}

#[test]
fn smooth_clamps_large_steps() {
    // rate * dt = 40: without the clamp this would overshoot to 40.
    assert!(approx(smooth_toward(0.0, 1.0, 8.0, 5.0), 1.0));
}

#[test]
fn smooth_ignores_negative_dt() {
    assert!(approx(smooth_toward(0.3, 1.0, 8.0, -1.0), 0.3));
}

// ============================================================================
// ExpressionBlender
// ============================================================================

#[test]
fn blink_weight_is_inverse_of_openness() {
    let mut blender = ExpressionBlender::new(&SmoothingRates::default());
    let pose = face(0.9, 0.0);

    for _ in 0..120 {
        blender.update(Some(&pose), 1.0 / 60.0);
    }
    assert!((blender.weight(Expression::BlinkLeft) - 0.1).abs() < 1e-3);
    assert!((blender.weight(Expression::BlinkRight) - 0.1).abs() < 1e-3);
}

#[test]
fn missing_face_relaxes_to_neutral() {
    let mut blender = ExpressionBlender::new(&SmoothingRates::default());
    let pose = face(0.0, 1.0);
    blender.update(Some(&pose), 1.0);
    assert!(approx(blender.weight(Expression::Aa), 1.0));
    assert!(approx(blender.weight(Expression::BlinkLeft), 1.0));

    blender.update(None, 0.05);
    let aa = blender.weight(Expression::Aa);
    assert!(aa < 1.0 && aa > 0.0, "Relaxes gradually, got {aa}");

    for _ in 0..200 {
        blender.update(None, 1.0 / 60.0);
    }
    assert!(blender.is_neutral(1e-3));
}

#[test]
fn blink_and_mouth_use_their_own_rates() {
    let rates = SmoothingRates {
        face: 2.0,
        blink: 10.0,
        ..SmoothingRates::default()
    };
    let mut blender = ExpressionBlender::new(&rates);
    blender.update(Some(&face(0.0, 1.0)), 0.05);

    assert!(approx(blender.weight(Expression::Aa), 0.1));
    assert!(approx(blender.weight(Expression::BlinkLeft), 0.5));
}

#[test]
fn out_of_range_targets_are_clamped() {
    let mut blender = ExpressionBlender::new(&SmoothingRates::default());
    blender.update(Some(&face(-1.0, 3.0)), 1.0);
    assert!(approx(blender.weight(Expression::Aa), 1.0));
    assert!(approx(blender.weight(Expression::BlinkLeft), 1.0));
}

#[test]
fn weights_by_name() {
    let mut blender = ExpressionBlender::new(&SmoothingRates::default());
    blender.set_weight_by_name("oh", 0.7);
    blender.set_weight_by_name("surprised", 1.0);

    assert_eq!(blender.weight_by_name("oh"), Some(0.7));
    assert_eq!(blender.weight_by_name("surprised"), None);
    assert_eq!(Expression::from_name("blinkLeft"), Some(Expression::BlinkLeft));

    blender.reset();
    assert!(blender.is_neutral(0.0));
}

#[test]
fn apply_skips_expressions_the_rig_lacks() {
    let mut rig = MemoryRig::new();
    rig.add_expression(Expression::Aa);

    let mut blender = ExpressionBlender::new(&SmoothingRates::default());
    blender.update(Some(&face(0.0, 1.0)), 1.0);
    blender.apply(&mut rig);

    assert!(approx(rig.expression(Expression::Aa), 1.0));
    assert!(approx(rig.expression(Expression::BlinkLeft), 0.0));
}

// ============================================================================
// LookAtController
// ============================================================================

#[test]
fn look_at_attaches_once() {
    let mut rig = MemoryRig::humanoid();
    let mut look_at = LookAtController::new(Vec2::splat(1.5), 4.0);
    assert!(!look_at.is_attached());

    look_at.attach(&mut rig);
    look_at.attach(&mut rig);
    assert!(look_at.is_attached());
    assert_eq!(rig.look_at_attach_count(), 1);
}

#[test]
fn look_at_mirrors_horizontal_pupil_offset() {
    let look_at = LookAtController::new(Vec2::splat(1.5), 4.0);
    let destination = look_at.destination(Vec2::new(0.5, -0.2));
    assert!(approx(destination.x, -0.75));
    assert!(approx(destination.y, -0.3));
    assert!(approx(destination.z, 0.0));
}

#[test]
fn look_at_follows_pupil() {
    let mut rig = MemoryRig::humanoid();
    let mut look_at = LookAtController::new(Vec2::splat(1.5), 4.0);
    look_at.attach(&mut rig);

    look_at.update(Vec2::new(0.5, 0.0), 0.1);
    assert!(approx(look_at.target().x, -0.3), "40% of the way, got {}", look_at.target());

    look_at.update(Vec2::new(0.5, 0.0), 10.0);
    look_at.apply(&mut rig);
    let target = rig.look_at_target().unwrap();
    assert!(target.abs_diff_eq(Vec3::new(-0.75, 0.0, 0.0), EPSILON), "got {target}");

    look_at.update(Vec2::ZERO, 0.0);
    assert!(target.abs_diff_eq(look_at.target(), EPSILON), "Zero dt holds the target");
}

#[test]
fn look_at_detached_does_not_write() {
    let mut rig = MemoryRig::humanoid();
    let mut look_at = LookAtController::new(Vec2::splat(1.5), 4.0);
    look_at.update(Vec2::ONE, 1.0);
    look_at.apply(&mut rig);
    assert!(rig.look_at_target().is_none());
}
