//! Humanoid bone identifiers and the bone binding table.
//!
//! [`HumanoidBone`] is the fixed set of semantic bones the retargeter drives,
//! named after the VRM humanoid convention. [`BoneBindings`] resolves each of
//! them to a rig node once, when the rig becomes ready; afterwards a lookup is
//! an array index and a missing bone is simply `None`.

use crate::pose::{Finger, FingerJoint, Phalanx, Side};
use crate::rig::HumanoidRig;

macro_rules! humanoid_bones {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// Semantic bones of a humanoid rig.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum HumanoidBone {
            $($variant,)*
        }

        impl HumanoidBone {
            pub const ALL: &'static [HumanoidBone] = &[$(HumanoidBone::$variant,)*];
            pub const COUNT: usize = Self::ALL.len();

            /// VRM humanoid name, e.g. `"leftUpperArm"`.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(HumanoidBone::$variant => $name,)*
                }
            }

            #[must_use]
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(HumanoidBone::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

humanoid_bones! {
    Hips => "hips",
    Spine => "spine",
    Chest => "chest",
    Neck => "neck",

    LeftUpperArm => "leftUpperArm",
    LeftLowerArm => "leftLowerArm",
    LeftHand => "leftHand",
    RightUpperArm => "rightUpperArm",
    RightLowerArm => "rightLowerArm",
    RightHand => "rightHand",

    LeftThumbMetacarpal => "leftThumbMetacarpal",
    LeftThumbProximal => "leftThumbProximal",
    LeftThumbDistal => "leftThumbDistal",
    LeftIndexProximal => "leftIndexProximal",
    LeftIndexIntermediate => "leftIndexIntermediate",
    LeftIndexDistal => "leftIndexDistal",
    LeftMiddleProximal => "leftMiddleProximal",
    LeftMiddleIntermediate => "leftMiddleIntermediate",
    LeftMiddleDistal => "leftMiddleDistal",
    LeftRingProximal => "leftRingProximal",
    LeftRingIntermediate => "leftRingIntermediate",
    LeftRingDistal => "leftRingDistal",
    LeftLittleProximal => "leftLittleProximal",
    LeftLittleIntermediate => "leftLittleIntermediate",
    LeftLittleDistal => "leftLittleDistal",

    RightThumbMetacarpal => "rightThumbMetacarpal",
    RightThumbProximal => "rightThumbProximal",
    RightThumbDistal => "rightThumbDistal",
    RightIndexProximal => "rightIndexProximal",
    RightIndexIntermediate => "rightIndexIntermediate",
    RightIndexDistal => "rightIndexDistal",
    RightMiddleProximal => "rightMiddleProximal",
    RightMiddleIntermediate => "rightMiddleIntermediate",
    RightMiddleDistal => "rightMiddleDistal",
    RightRingProximal => "rightRingProximal",
    RightRingIntermediate => "rightRingIntermediate",
    RightRingDistal => "rightRingDistal",
    RightLittleProximal => "rightLittleProximal",
    RightLittleIntermediate => "rightLittleIntermediate",
    RightLittleDistal => "rightLittleDistal",
}

impl HumanoidBone {
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn upper_arm(side: Side) -> Self {
        match side {
            Side::Left => Self::LeftUpperArm,
            Side::Right => Self::RightUpperArm,
        }
    }

    #[must_use]
    pub const fn lower_arm(side: Side) -> Self {
        match side {
            Side::Left => Self::LeftLowerArm,
            Side::Right => Self::RightLowerArm,
        }
    }

    #[must_use]
    pub const fn hand(side: Side) -> Self {
        match side {
            Side::Left => Self::LeftHand,
            Side::Right => Self::RightHand,
        }
    }

    /// Bone driven by a solved finger joint.
    ///
    /// VRM 1.0 rigs have no thumb intermediate bone; the solved thumb
    /// intermediate joint drives the metacarpal instead.
    #[must_use]
    pub const fn finger(side: Side, joint: FingerJoint) -> Self {
        use Finger::{Index, Little, Middle, Ring, Thumb};
        use Phalanx::{Distal, Intermediate, Proximal};

        match (side, joint.finger, joint.phalanx) {
            (Side::Left, Thumb, Proximal) => Self::LeftThumbProximal,
            (Side::Left, Thumb, Intermediate) => Self::LeftThumbMetacarpal,
            (Side::Left, Thumb, Distal) => Self::LeftThumbDistal,
            (Side::Left, Index, Proximal) => Self::LeftIndexProximal,
            (Side::Left, Index, Intermediate) => Self::LeftIndexIntermediate,
            (Side::Left, Index, Distal) => Self::LeftIndexDistal,
            (Side::Left, Middle, Proximal) => Self::LeftMiddleProximal,
            (Side::Left, Middle, Intermediate) => Self::LeftMiddleIntermediate,
            (Side::Left, Middle, Distal) => Self::LeftMiddleDistal,
            (Side::Left, Ring, Proximal) => Self::LeftRingProximal,
            (Side::Left, Ring, Intermediate) => Self::LeftRingIntermediate,
            (Side::Left, Ring, Distal) => Self::LeftRingDistal,
            (Side::Left, Little, Proximal) => Self::LeftLittleProximal,
            (Side::Left, Little, Intermediate) => Self::LeftLittleIntermediate,
            (Side::Left, Little, Distal) => Self::LeftLittleDistal,
            (Side::Right, Thumb, Proximal) => Self::RightThumbProximal,
            (Side::Right, Thumb, Intermediate) => Self::RightThumbMetacarpal,
            (Side::Right, Thumb, Distal) => Self::RightThumbDistal,
            (Side::Right, Index, Proximal) => Self::RightIndexProximal,
            (Side::Right, Index, Intermediate) => Self::RightIndexIntermediate,
            (Side::Right, Index, Distal) => Self::RightIndexDistal,
            (Side::Right, Middle, Proximal) => Self::RightMiddleProximal,
            (Side::Right, Middle, Intermediate) => Self::RightMiddleIntermediate,
            (Side::Right, Middle, Distal) => Self::RightMiddleDistal,
            (Side::Right, Ring, Proximal) => Self::RightRingProximal,
            (Side::Right, Ring, Intermediate) => Self::RightRingIntermediate,
            (Side::Right, Ring, Distal) => Self::RightRingDistal,
            (Side::Right, Little, Proximal) => Self::RightLittleProximal,
            (Side::Right, Little, Intermediate) => Self::RightLittleIntermediate,
            (Side::Right, Little, Distal) => Self::RightLittleDistal,
        }
    }
}

// ============================================================================
// BoneBindings
// ============================================================================

/// Semantic bone → rig node table.
///
/// Built once from the rig; read-only afterwards, so it can be shared freely.
#[derive(Debug, Clone)]
pub struct BoneBindings<N: Copy> {
    nodes: [Option<N>; HumanoidBone::COUNT],
}

impl<N: Copy> Default for BoneBindings<N> {
    fn default() -> Self {
        Self {
            nodes: [None; HumanoidBone::COUNT],
        }
    }
}

impl<N: Copy> BoneBindings<N> {
    /// Resolves every humanoid bone against the rig.
    pub fn resolve<R>(rig: &R) -> Self
    where
        R: HumanoidRig<Node = N> + ?Sized,
    {
        let mut bindings = Self::default();
        for &bone in HumanoidBone::ALL {
            bindings.nodes[bone.index()] = rig.find_bone(bone);
        }

        let missing = bindings.nodes.iter().filter(|n| n.is_none()).count();
        if missing > 0 {
            log::debug!("Humanoid rig is missing {missing} of {} bones", HumanoidBone::COUNT);
        }
        bindings
    }

    #[inline]
    #[must_use]
    pub fn get(&self, bone: HumanoidBone) -> Option<N> {
        self.nodes[bone.index()]
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, bone: HumanoidBone) -> bool {
        self.nodes[bone.index()].is_some()
    }

    /// Number of bones that resolved to a node.
    #[must_use]
    pub fn bound_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }
}
