//! Bone retargeting.
//!
//! [`SkeletonRetargeter`] turns solved Euler triples into bone orientations.
//! Each bone belongs to a [`BoneGroup`] that fixes its axis damping and
//! interpolation rate; every update slerps the bone's current rotation a
//! `clamp(rate * dt, 0, 1)` step toward the target.

use glam::{EulerRot, Quat, Vec3};

use crate::humanoid::{BoneBindings, HumanoidBone};
use crate::pose::{FingerJoint, PoseSnapshot, Side};
use crate::rig::HumanoidRig;
use crate::settings::{BoneDamping, SmoothingRates};

/// Damping/rate class of a bone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoneGroup {
    Head,
    Torso,
    Hips,
    Limbs,
    Hands,
}

impl BoneGroup {
    #[must_use]
    pub fn of(bone: HumanoidBone) -> Self {
        use HumanoidBone as B;
        match bone {
            B::Neck => Self::Head,
            B::Spine | B::Chest => Self::Torso,
            B::Hips => Self::Hips,
            B::LeftUpperArm | B::LeftLowerArm | B::RightUpperArm | B::RightLowerArm => Self::Limbs,
            _ => Self::Hands,
        }
    }
}

/// Quaternion for an XYZ Euler triple.
#[inline]
#[must_use]
pub fn euler_to_quat(euler: Vec3) -> Quat {
    Quat::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z)
}

#[derive(Debug, Clone)]
pub struct SkeletonRetargeter {
    damping: BoneDamping,
    body_rate: f32,
    hand_rate: f32,
}

impl SkeletonRetargeter {
    #[must_use]
    pub fn new(damping: BoneDamping, rates: &SmoothingRates) -> Self {
        Self {
            damping,
            body_rate: rates.body,
            hand_rate: rates.hand,
        }
    }

    #[must_use]
    pub fn axis_scale(&self, group: BoneGroup) -> Vec3 {
        match group {
            BoneGroup::Head => self.damping.head,
            BoneGroup::Torso => self.damping.torso,
            BoneGroup::Hips => self.damping.hips,
            BoneGroup::Limbs | BoneGroup::Hands => self.damping.limbs,
        }
    }

    #[must_use]
    pub fn rate(&self, group: BoneGroup) -> f32 {
        match group {
            BoneGroup::Hands => self.hand_rate,
            _ => self.body_rate,
        }
    }

    /// Slerps `bone` toward the orientation of `euler * axis_scale`.
    ///
    /// Does nothing when the rig has no such bone.
    pub fn rotate_bone<R>(
        rig: &mut R,
        bones: &BoneBindings<R::Node>,
        bone: HumanoidBone,
        euler: Vec3,
        rate: f32,
        dt: f32,
        axis_scale: Vec3,
    ) where
        R: HumanoidRig + ?Sized,
    {
        let Some(node) = bones.get(bone) else {
            return;
        };
        let target = euler_to_quat(euler * axis_scale);
        let t = (rate * dt).clamp(0.0, 1.0);
        let current = rig.bone_rotation(node);
        rig.set_bone_rotation(node, current.slerp(target, t).normalize());
    }

    /// [`rotate_bone`](Self::rotate_bone) with the bone's group settings.
    pub fn drive<R>(&self, rig: &mut R, bones: &BoneBindings<R::Node>, bone: HumanoidBone, euler: Vec3, dt: f32)
    where
        R: HumanoidRig + ?Sized,
    {
        let group = BoneGroup::of(bone);
        Self::rotate_bone(rig, bones, bone, euler, self.rate(group), dt, self.axis_scale(group));
    }

    /// Drives every bone the snapshot has data for.
    pub fn apply<R>(&self, snapshot: &PoseSnapshot, rig: &mut R, bones: &BoneBindings<R::Node>, dt: f32)
    where
        R: HumanoidRig + ?Sized,
    {
        let dt = dt.max(0.0);

        if let Some(face) = &snapshot.face {
            self.drive(rig, bones, HumanoidBone::Neck, face.head, dt);
        }

        if let Some(body) = &snapshot.body {
            self.drive(rig, bones, HumanoidBone::Chest, body.chest, dt);
            self.drive(rig, bones, HumanoidBone::Spine, body.spine, dt);
            self.drive(rig, bones, HumanoidBone::Hips, body.hips, dt);

            for side in [Side::Left, Side::Right] {
                let arm = body.arm(side);
                self.drive(rig, bones, HumanoidBone::upper_arm(side), arm.upper, dt);
                self.drive(rig, bones, HumanoidBone::lower_arm(side), arm.lower, dt);
            }
        }

        for side in [Side::Left, Side::Right] {
            let Some(hand) = snapshot.hand(side) else {
                continue;
            };

            // Twist comes from the forearm, flexion from the palm. Merged
            // into one target so the wrist takes a single slerp step.
            if let Some(body) = &snapshot.body {
                let wrist = Vec3::new(hand.wrist.x, hand.wrist.y, body.arm(side).hand.z);
                self.drive(rig, bones, HumanoidBone::hand(side), wrist, dt);
            }

            for joint in FingerJoint::ALL {
                self.drive(rig, bones, HumanoidBone::finger(side, joint), hand.finger(joint), dt);
            }
        }
    }
}
