use glam::Vec3;

use super::{SolveCategory, direction, validate};
use crate::errors::{RetargetError, Result};
use crate::landmarks::{Landmark, hand as idx};
use crate::pose::{Finger, FingerJoint, HandPose, Phalanx, Side};

fn category(side: Side) -> SolveCategory {
    match side {
        Side::Left => SolveCategory::LeftHand,
        Side::Right => SolveCategory::RightHand,
    }
}

/// Landmark chain of a finger, wrist first. Joint `n` bends at chain[n + 1].
const fn chain(finger: Finger) -> [usize; 5] {
    match finger {
        Finger::Thumb => [idx::WRIST, idx::THUMB_CMC, idx::THUMB_MCP, idx::THUMB_IP, idx::THUMB_TIP],
        Finger::Index => [idx::WRIST, idx::INDEX_MCP, idx::INDEX_PIP, idx::INDEX_DIP, idx::INDEX_TIP],
        Finger::Middle => [idx::WRIST, idx::MIDDLE_MCP, idx::MIDDLE_PIP, idx::MIDDLE_DIP, idx::MIDDLE_TIP],
        Finger::Ring => [idx::WRIST, idx::RING_MCP, idx::RING_PIP, idx::RING_DIP, idx::RING_TIP],
        Finger::Little => [idx::WRIST, idx::PINKY_MCP, idx::PINKY_PIP, idx::PINKY_DIP, idx::PINKY_TIP],
    }
}

const fn joint_offset(phalanx: Phalanx) -> usize {
    match phalanx {
        Phalanx::Proximal => 0,
        Phalanx::Intermediate => 1,
        Phalanx::Distal => 2,
    }
}

/// Hands are solved in raw landmark space: only angles between segments and
/// the palm orientation matter, both of which are aspect-independent enough
/// at hand scale.
pub(super) fn solve(landmarks: &[Landmark], side: Side) -> Result<HandPose> {
    let category = category(side);
    validate(category, landmarks, idx::POINT_COUNT)?;

    let p = |i: usize| {
        let l = &landmarks[i];
        Vec3::new(l.x, -l.y, -l.z)
    };

    let mut pose = HandPose {
        wrist: wrist_rotation(&p, side)?,
        ..HandPose::default()
    };

    for joint in FingerJoint::ALL {
        let c = chain(joint.finger);
        let at = joint_offset(joint.phalanx) + 1;
        let before = direction(category, p(c[at - 1]), p(c[at]), "finger segment")?;
        let after = direction(category, p(c[at]), p(c[at + 1]), "finger segment")?;
        let curl = before.dot(after).clamp(-1.0, 1.0).acos();

        // Fingers curl about z toward the palm; the thumb folds across it
        // about y. Both senses flip between hands.
        let rotation = match joint.finger {
            Finger::Thumb => Vec3::new(0.0, side.sign() * curl, 0.0),
            _ => Vec3::new(0.0, 0.0, -side.sign() * curl),
        };
        pose.set_finger(joint, rotation);
    }

    Ok(pose)
}

/// Wrist flexion (x) and deviation (y) from the palm normal.
fn wrist_rotation(p: &impl Fn(usize) -> Vec3, side: Side) -> Result<Vec3> {
    let category = category(side);
    let to_index = direction(category, p(idx::WRIST), p(idx::INDEX_MCP), "palm")?;
    let to_pinky = direction(category, p(idx::WRIST), p(idx::PINKY_MCP), "palm")?;

    let normal = to_index.cross(to_pinky);
    if normal.length_squared() < 1e-8 {
        return Err(RetargetError::DegenerateGeometry {
            category,
            detail: "palm plane",
        });
    }
    // Winding of index/pinky flips between hands; orient toward the viewer.
    let normal = normal.normalize() * -side.sign();

    Ok(Vec3::new(
        normal.y.clamp(-1.0, 1.0).asin(),
        side.sign() * normal.x.clamp(-1.0, 1.0).asin(),
        0.0,
    ))
}
