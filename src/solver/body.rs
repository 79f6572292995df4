use glam::Vec3;

use super::{ImageSize, SolveCategory, direction, to_space, validate};
use crate::errors::Result;
use crate::landmarks::{Landmark, pose as idx};
use crate::pose::{ArmPose, BodyPose, Side};

const CATEGORY: SolveCategory = SolveCategory::Pose;

pub(super) fn solve(landmarks: &[Landmark], image: ImageSize) -> Result<BodyPose> {
    validate(CATEGORY, landmarks, idx::POINT_COUNT)?;

    let aspect = image.aspect();
    let p = |i: usize| to_space(&landmarks[i], aspect);

    let hip_line = direction(CATEGORY, p(idx::RIGHT_HIP), p(idx::LEFT_HIP), "hip width")?;
    let shoulder_line = direction(CATEGORY, p(idx::RIGHT_SHOULDER), p(idx::LEFT_SHOULDER), "shoulder width")?;

    let hip_center = (p(idx::LEFT_HIP) + p(idx::RIGHT_HIP)) * 0.5;
    let shoulder_center = (p(idx::LEFT_SHOULDER) + p(idx::RIGHT_SHOULDER)) * 0.5;
    let torso_up = direction(CATEGORY, hip_center, shoulder_center, "torso height")?;

    let hips = line_rotation(hip_line);
    let shoulders = line_rotation(shoulder_line);
    // Forward/back lean of the torso around x.
    let lean = torso_up.z.atan2(torso_up.y);

    let spine = Vec3::new(lean, shoulders.y - hips.y, shoulders.z - hips.z);

    Ok(BodyPose {
        hips,
        spine,
        chest: spine,
        left_arm: arm(&p, Side::Left)?,
        right_arm: arm(&p, Side::Right)?,
    })
}

/// Yaw (y) and roll (z) of a left-pointing body line such as the hips.
fn line_rotation(line: Vec3) -> Vec3 {
    Vec3::new(0.0, (-line.z).atan2(line.x), line.y.atan2(line.x))
}

/// Rotation taking the T-pose direction of `side`'s arm onto `dir`.
///
/// Left arms rest along +x and right arms along -x, so raising either arm
/// rotates about z in opposite senses.
fn segment_rotation(dir: Vec3, side: Side) -> Vec3 {
    let s = side.sign();
    let horizontal = dir.truncate().length();
    Vec3::new(0.0, s * (-dir.z).atan2(horizontal), s * dir.y.atan2(s * dir.x))
}

fn arm(p: &impl Fn(usize) -> Vec3, side: Side) -> Result<ArmPose> {
    let (shoulder, elbow, wrist, index, pinky) = match side {
        Side::Left => (idx::LEFT_SHOULDER, idx::LEFT_ELBOW, idx::LEFT_WRIST, idx::LEFT_INDEX, idx::LEFT_PINKY),
        Side::Right => (idx::RIGHT_SHOULDER, idx::RIGHT_ELBOW, idx::RIGHT_WRIST, idx::RIGHT_INDEX, idx::RIGHT_PINKY),
    };

    let upper_dir = direction(CATEGORY, p(shoulder), p(elbow), "upper arm")?;
    let lower_dir = direction(CATEGORY, p(elbow), p(wrist), "forearm")?;
    let hand_tip = (p(index) + p(pinky)) * 0.5;
    let hand_dir = direction(CATEGORY, p(wrist), hand_tip, "hand")?;

    let upper = segment_rotation(upper_dir, side);
    let lower_abs = segment_rotation(lower_dir, side);
    let hand_abs = segment_rotation(hand_dir, side);

    Ok(ArmPose {
        upper,
        lower: lower_abs - upper,
        hand: Vec3::new(0.0, 0.0, hand_abs.z - lower_abs.z),
    })
}
