//! Avatar Driver Tests
//!
//! End-to-end frame scenarios on a `MemoryRig`:
//! - Readiness gating and one `advance` per tick
//! - Expression convergence while tracking
//! - Idle clip playback without tracking writes
//! - Tracking takeover from an idle clip
//! - Stale snapshots and stream shutdown
//! - Quiet streams handing back to the idle clip

use glam::{Quat, Vec2, Vec3};

use puppet::animation::{AnimationClip, InterpolationMode, KeyframeTrack, Track};
use puppet::crossfade::{ClipPlayback, ClipSelection, CrossfadeState};
use puppet::driver::{AvatarDriver, FrameInput};
use puppet::expression::Expression;
use puppet::humanoid::HumanoidBone;
use puppet::pose::{ArmPose, BodyPose, EyeOpenness, FacePose, PoseSnapshot};
use puppet::rig::{BoneKey, HumanoidRig, MemoryRig};
use puppet::settings::RetargetSettings;

const DT: f32 = 1.0 / 60.0;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Driver and rig past the settle delay.
fn live_pair() -> (AvatarDriver<BoneKey>, MemoryRig) {
    init_logger();
    let mut driver = AvatarDriver::new(RetargetSettings::default());
    driver.add_clip(idle_clip());
    let mut rig = MemoryRig::humanoid();

    driver.tick(&mut rig, &FrameInput::default(), 0.2);
    assert!(driver.crossfade().is_live());
    (driver, rig)
}

fn idle_clip() -> AnimationClip {
    let pose = Quat::from_rotation_x(0.3);
    AnimationClip::new(
        "Idle",
        vec![
            Track::new(
                HumanoidBone::Spine,
                KeyframeTrack::new(vec![0.0, 2.0], vec![pose, pose], InterpolationMode::Linear),
            ),
            Track::new(
                HumanoidBone::Hips,
                KeyframeTrack::new(vec![0.0, 2.0], vec![Quat::IDENTITY, pose], InterpolationMode::Linear),
            ),
        ],
    )
}

fn tracked_snapshot() -> PoseSnapshot {
    PoseSnapshot {
        face: Some(FacePose {
            eyes: EyeOpenness { left: 0.9, right: 0.9 },
            pupil: Some(Vec2::new(0.4, 0.0)),
            ..FacePose::default()
        }),
        body: Some(BodyPose {
            left_arm: ArmPose {
                upper: Vec3::new(0.0, 0.0, 1.2),
                ..ArmPose::default()
            },
            ..BodyPose::default()
        }),
        ..PoseSnapshot::default()
    }
}

// ============================================================================
// Readiness
// ============================================================================

#[test]
fn nothing_happens_until_rig_is_ready() {
    init_logger();
    let mut driver: AvatarDriver<BoneKey> = AvatarDriver::new(RetargetSettings::default());
    let mut rig = MemoryRig::humanoid();
    rig.set_ready(false);
    driver.mailbox().publish(tracked_snapshot());

    for _ in 0..10 {
        driver.tick(&mut rig, &FrameInput::tracking(ClipSelection::None), DT);
    }
    assert_eq!(rig.total_writes(), 0);
    assert_eq!(rig.frames, 0);
    assert_eq!(rig.look_at_attach_count(), 0);
    assert_eq!(driver.crossfade().state(), &CrossfadeState::Uninitialized);
}

#[test]
fn settle_delay_precedes_first_update() {
    init_logger();
    let mut driver: AvatarDriver<BoneKey> = AvatarDriver::new(RetargetSettings::default());
    let mut rig = MemoryRig::humanoid();
    driver.mailbox().publish(tracked_snapshot());
    let input = FrameInput::tracking(ClipSelection::None);

    driver.tick(&mut rig, &input, 0.06);
    assert!(!driver.crossfade().is_live());
    assert_eq!(rig.total_writes(), 0, "Settling rig receives no writes");
    assert_eq!(rig.frames, 1, "Ready rig still advances");

    driver.tick(&mut rig, &input, 0.06);
    assert!(driver.crossfade().is_tracking());
    assert!(rig.writes_to(HumanoidBone::LeftUpperArm) > 0);
    assert_eq!(rig.look_at_attach_count(), 1);
    assert_eq!(driver.bones().bound_count(), HumanoidBone::COUNT);
}

#[test]
fn advance_runs_once_per_tick() {
    let (mut driver, mut rig) = live_pair();
    let before = rig.frames;

    for i in 0..30 {
        if i % 3 == 0 {
            driver.mailbox().publish(tracked_snapshot());
        }
        driver.tick(&mut rig, &FrameInput::tracking(ClipSelection::None), DT);
    }
    assert_eq!(rig.frames - before, 30);
}

#[test]
fn expressions_start_at_zero() {
    let mut rig = MemoryRig::humanoid();
    rig.set_expression(Expression::Aa, 0.8);
    let mut driver: AvatarDriver<BoneKey> = AvatarDriver::new(RetargetSettings::default());

    driver.tick(&mut rig, &FrameInput::default(), 0.2);
    for &expression in Expression::ALL {
        assert_eq!(rig.expression(expression), 0.0, "{expression:?}");
    }
}

// ============================================================================
// Tracking
// ============================================================================

#[test]
fn blink_weights_converge_to_inverse_openness() {
    let (mut driver, mut rig) = live_pair();

    for _ in 0..90 {
        driver.mailbox().publish(tracked_snapshot());
        driver.tick(&mut rig, &FrameInput::tracking(ClipSelection::None), DT);
    }

    let left = rig.expression(Expression::BlinkLeft);
    let right = rig.expression(Expression::BlinkRight);
    assert!((left - 0.1).abs() < 1e-2, "blinkLeft = {left}");
    assert!((right - 0.1).abs() < 1e-2, "blinkRight = {right}");
}

#[test]
fn tracking_moves_bones_and_gaze() {
    let (mut driver, mut rig) = live_pair();

    for _ in 0..120 {
        driver.mailbox().publish(tracked_snapshot());
        driver.tick(&mut rig, &FrameInput::tracking(ClipSelection::None), DT);
    }

    let upper = rig.rotation_of(HumanoidBone::LeftUpperArm).unwrap();
    assert!(upper.angle_between(Quat::from_rotation_z(1.2)) < 1e-2);

    let target = rig.look_at_target().unwrap();
    assert!((target.x + 0.6).abs() < 1e-2, "gaze x = {}", target.x);
}

#[test]
fn stale_snapshot_stops_driving_bones() {
    let (mut driver, mut rig) = live_pair();
    let input = FrameInput::tracking(ClipSelection::None);

    driver.mailbox().publish(tracked_snapshot());
    for _ in 0..20 {
        driver.tick(&mut rig, &input, DT);
    }
    let early = rig.writes_to(HumanoidBone::LeftUpperArm);
    assert!(early >= 20, "Fresh snapshot drives every tick");

    for _ in 0..20 {
        driver.tick(&mut rig, &input, DT);
    }
    let mid = rig.writes_to(HumanoidBone::LeftUpperArm);
    for _ in 0..20 {
        driver.tick(&mut rig, &input, DT);
    }
    assert_eq!(rig.writes_to(HumanoidBone::LeftUpperArm), mid, "Stale snapshot is ignored");

    driver.mailbox().publish(tracked_snapshot());
    driver.tick(&mut rig, &input, DT);
    assert_eq!(rig.writes_to(HumanoidBone::LeftUpperArm), mid + 1, "Fresh data resumes");
}

#[test]
fn stream_stop_relaxes_face_and_clears_mailbox() {
    let (mut driver, mut rig) = live_pair();
    for _ in 0..60 {
        driver.mailbox().publish(tracked_snapshot());
        driver.tick(&mut rig, &FrameInput::tracking(ClipSelection::None), DT);
    }
    assert!(rig.expression(Expression::BlinkLeft) > 0.05);

    let writes = rig.total_writes();
    for _ in 0..120 {
        driver.tick(&mut rig, &FrameInput::idle(ClipSelection::None), DT);
    }

    assert_eq!(driver.crossfade().state(), &CrossfadeState::None);
    assert!(driver.mailbox().latest().is_none());
    assert!(driver.expressions().is_neutral(1e-3));
    assert!(rig.expression(Expression::BlinkLeft) < 1e-3);
    assert_eq!(rig.total_writes(), writes, "No bone writes without a source");
}

#[test]
fn face_and_gaze_settle_once_tracking_stops() {
    let (mut driver, mut rig) = live_pair();
    for _ in 0..120 {
        driver.mailbox().publish(tracked_snapshot());
        driver.tick(&mut rig, &FrameInput::tracking(ClipSelection::None), DT);
    }
    let gaze = rig.look_at_target().unwrap();
    let gaze_writes = rig.look_at_writes;

    for _ in 0..240 {
        driver.tick(&mut rig, &FrameInput::idle(ClipSelection::None), DT);
    }
    assert_eq!(rig.expression(Expression::BlinkLeft), 0.0, "Pinned to neutral");
    assert_eq!(rig.look_at_writes, gaze_writes, "Gaze is not driven without a pupil");
    assert_eq!(rig.look_at_target(), Some(gaze), "Gaze holds");

    let expression_writes = rig.expression_writes;
    for _ in 0..60 {
        driver.tick(&mut rig, &FrameInput::idle(ClipSelection::None), DT);
    }
    assert_eq!(rig.expression_writes, expression_writes, "Neutral face is left alone");
}

// ============================================================================
// Idle / tracking crossfade
// ============================================================================

fn run_idle(driver: &mut AvatarDriver<BoneKey>, rig: &mut MemoryRig, ticks: usize) {
    let input = FrameInput::idle(ClipSelection::named("Idle"));
    for _ in 0..ticks {
        driver.tick(rig, &input, DT);
    }
}

#[test]
fn idle_clip_reaches_full_weight_without_tracking_writes() {
    let (mut driver, mut rig) = live_pair();
    // A snapshot sitting in the mailbox must not leak into idle playback.
    driver.mailbox().publish(tracked_snapshot());

    run_idle(&mut driver, &mut rig, 90);

    assert_eq!(driver.crossfade().state(), &CrossfadeState::Idle("Idle".into()));
    assert!(driver.mixer().is_running("Idle"));
    assert!((driver.mixer().weight("Idle") - 1.0).abs() < 1e-5);

    assert!(rig.writes_to(HumanoidBone::Spine) > 0, "Clip drives its bones");
    for bone in [HumanoidBone::LeftUpperArm, HumanoidBone::Neck, HumanoidBone::Chest] {
        assert_eq!(rig.writes_to(bone), 0, "{bone:?} must not be tracked");
    }

    let spine = rig.rotation_of(HumanoidBone::Spine).unwrap();
    assert!(spine.angle_between(Quat::from_rotation_x(0.3)) < 1e-3);
}

#[test]
fn tracking_start_fades_idle_out() {
    let (mut driver, mut rig) = live_pair();
    run_idle(&mut driver, &mut rig, 90);

    let input = FrameInput::tracking(ClipSelection::named("Idle"));
    driver.mailbox().publish(tracked_snapshot());
    driver.tick(&mut rig, &input, DT);

    assert!(driver.crossfade().is_tracking());
    let weight = driver.mixer().weight("Idle");
    assert!(weight > 0.0 && weight < 1.0, "Fading, got {weight}");
    assert!(rig.writes_to(HumanoidBone::LeftUpperArm) > 0, "Tracking applies immediately");

    for _ in 0..24 {
        driver.mailbox().publish(tracked_snapshot());
        driver.tick(&mut rig, &input, DT);
    }
    assert_eq!(driver.mixer().weight("Idle"), 0.0);
    assert!(!driver.mixer().is_running("Idle"));
}

#[test]
fn unknown_clip_leaves_rig_alone() {
    let (mut driver, mut rig) = live_pair();
    for _ in 0..30 {
        driver.tick(&mut rig, &FrameInput::idle(ClipSelection::named("Dance")), DT);
    }
    assert_eq!(driver.crossfade().state(), &CrossfadeState::None);
    assert_eq!(rig.total_writes(), 0);
}

#[test]
fn sparse_rig_is_driven_without_errors() {
    init_logger();
    let mut driver = AvatarDriver::new(RetargetSettings::default());
    driver.add_clip(idle_clip());
    let mut rig = MemoryRig::with_bones(&[HumanoidBone::Hips, HumanoidBone::LeftUpperArm]);

    driver.tick(&mut rig, &FrameInput::default(), 0.2);
    for _ in 0..10 {
        driver.mailbox().publish(tracked_snapshot());
        driver.tick(&mut rig, &FrameInput::tracking(ClipSelection::None), DT);
    }
    assert_eq!(driver.bones().bound_count(), 2);
    assert!(rig.writes_to(HumanoidBone::LeftUpperArm) > 0);
}

// ============================================================================
// Perception side
// ============================================================================

#[test]
fn geometric_sink_feeds_the_driver_mailbox() {
    let (driver, _rig) = live_pair();
    let mut sink = driver.geometric_sink();

    let generation = sink.on_results(&puppet::landmarks::HolisticResults::default());
    assert_eq!(generation, 1);
    let delivered = driver.mailbox().latest().unwrap();
    assert!(delivered.snapshot.is_empty());

    sink.deactivate();
    assert!(driver.mailbox().latest().is_none());
}

#[test]
fn left_hand_stream_drives_right_hand_bones() {
    use puppet::landmarks::{HolisticResults, Landmark, hand};

    let (mut driver, mut rig) = live_pair();
    let mut sink = driver.geometric_sink();

    let wrist = Vec2::new(0.5, 0.8);
    let mut points = vec![Landmark::new(wrist.x, wrist.y, 0.0); hand::POINT_COUNT];
    let rays = [
        (hand::THUMB_CMC, Vec2::new(-0.7, -0.3)),
        (hand::INDEX_MCP, Vec2::new(-0.3, -1.0)),
        (hand::MIDDLE_MCP, Vec2::new(0.0, -1.0)),
        (hand::RING_MCP, Vec2::new(0.3, -1.0)),
        (hand::PINKY_MCP, Vec2::new(0.6, -1.0)),
    ];
    for (first, dir) in rays {
        for k in 0..4 {
            let at = wrist + dir.normalize() * 0.05 * (k + 1) as f32;
            points[first + k] = Landmark::new(at.x, at.y, 0.0);
        }
    }

    sink.on_results(&HolisticResults {
        left_hand_landmarks: Some(points),
        ..HolisticResults::default()
    });
    driver.tick(&mut rig, &FrameInput::tracking(ClipSelection::None), DT);

    assert_eq!(rig.writes_to(HumanoidBone::RightIndexProximal), 1);
    assert_eq!(rig.writes_to(HumanoidBone::LeftIndexProximal), 0);
}

#[test]
fn quiet_stream_hands_back_to_idle_clip() {
    let (mut driver, mut rig) = live_pair();
    let input = FrameInput::tracking(ClipSelection::named("Idle"));

    driver.mailbox().publish(tracked_snapshot());
    driver.tick(&mut rig, &input, DT);
    assert!(driver.crossfade().is_tracking());

    for _ in 0..600 {
        driver.tick(&mut rig, &input, DT);
    }
    assert_eq!(driver.crossfade().state(), &CrossfadeState::Idle("Idle".into()));
    assert!(driver.mixer().is_running("Idle"));
    assert!((driver.mixer().weight("Idle") - 1.0).abs() < 1e-5);

    driver.mailbox().publish(tracked_snapshot());
    driver.tick(&mut rig, &input, DT);
    assert!(driver.crossfade().is_tracking(), "Fresh data takes over again");
}

#[test]
fn idle_clip_weight_is_continuous_when_tracking_drops_mid_fade() {
    let (mut driver, mut rig) = live_pair();
    run_idle(&mut driver, &mut rig, 90);

    let tracking = FrameInput::tracking(ClipSelection::named("Idle"));
    let mut weights = vec![driver.mixer().weight("Idle")];
    for _ in 0..3 {
        driver.mailbox().publish(tracked_snapshot());
        driver.tick(&mut rig, &tracking, DT);
        weights.push(driver.mixer().weight("Idle"));
    }

    let idle = FrameInput::idle(ClipSelection::named("Idle"));
    for _ in 0..90 {
        driver.tick(&mut rig, &idle, DT);
        weights.push(driver.mixer().weight("Idle"));
    }

    let largest_step = weights
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(0.0_f32, f32::max);
    assert!(largest_step < 0.06, "Weight jumped by {largest_step}: {weights:?}");
    assert!(weights.iter().all(|&w| w > 0.0), "Clip never stops: {weights:?}");
    assert!((driver.mixer().weight("Idle") - 1.0).abs() < 1e-5);
}
