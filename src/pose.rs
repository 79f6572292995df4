//! Solved pose parameters.
//!
//! A [`PoseSnapshot`] is the complete output of one solve: every category is
//! optional, and a missing category means "no data", never "no motion".
//! Rotations are Euler triples in radians (XYZ order).

use glam::{Vec2, Vec3};

/// Anatomical side of the tracked subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// The opposite side. Used to undo the video feed's mirroring.
    #[inline]
    #[must_use]
    pub const fn mirrored(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// +1 for left, -1 for right.
    #[inline]
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => 1.0,
            Self::Right => -1.0,
        }
    }
}

/// Viseme coefficients, each in 0..1.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MouthShape {
    pub a: f32,
    pub i: f32,
    pub e: f32,
    pub o: f32,
    pub u: f32,
}

/// Eye openness, 0 = closed, 1 = open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeOpenness {
    pub left: f32,
    pub right: f32,
}

impl Default for EyeOpenness {
    fn default() -> Self {
        Self {
            left: 1.0,
            right: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FacePose {
    pub mouth: MouthShape,
    pub eyes: EyeOpenness,
    pub head: Vec3,
    /// Normalized iris offset in -1..1; absent without iris landmarks.
    pub pupil: Option<Vec2>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ArmPose {
    pub upper: Vec3,
    pub lower: Vec3,
    /// Only the z (twist) component is used downstream; x/y come from the
    /// hand solve.
    pub hand: Vec3,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodyPose {
    pub hips: Vec3,
    pub spine: Vec3,
    pub chest: Vec3,
    pub left_arm: ArmPose,
    pub right_arm: ArmPose,
}

impl BodyPose {
    #[inline]
    #[must_use]
    pub fn arm(&self, side: Side) -> &ArmPose {
        match side {
            Side::Left => &self.left_arm,
            Side::Right => &self.right_arm,
        }
    }
}

// ============================================================================
// Fingers
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Little,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phalanx {
    Proximal,
    Intermediate,
    Distal,
}

/// One of the 15 solved finger joints of a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FingerJoint {
    pub finger: Finger,
    pub phalanx: Phalanx,
}

impl FingerJoint {
    pub const COUNT: usize = 15;

    pub const ALL: [FingerJoint; Self::COUNT] = {
        const FINGERS: [Finger; 5] = [
            Finger::Ring,
            Finger::Index,
            Finger::Middle,
            Finger::Thumb,
            Finger::Little,
        ];
        const PHALANGES: [Phalanx; 3] = [Phalanx::Proximal, Phalanx::Intermediate, Phalanx::Distal];

        let mut out = [FingerJoint {
            finger: Finger::Ring,
            phalanx: Phalanx::Proximal,
        }; Self::COUNT];
        let mut i = 0;
        while i < Self::COUNT {
            out[i] = FingerJoint {
                finger: FINGERS[i / 3],
                phalanx: PHALANGES[i % 3],
            };
            i += 1;
        }
        out
    };

    #[inline]
    #[must_use]
    pub const fn new(finger: Finger, phalanx: Phalanx) -> Self {
        Self { finger, phalanx }
    }

    /// Position of this joint in [`FingerJoint::ALL`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        let finger = match self.finger {
            Finger::Ring => 0,
            Finger::Index => 1,
            Finger::Middle => 2,
            Finger::Thumb => 3,
            Finger::Little => 4,
        };
        let phalanx = match self.phalanx {
            Phalanx::Proximal => 0,
            Phalanx::Intermediate => 1,
            Phalanx::Distal => 2,
        };
        finger * 3 + phalanx
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HandPose {
    /// Only x/y are used downstream; z comes from the body solve.
    pub wrist: Vec3,
    pub fingers: [Vec3; FingerJoint::COUNT],
}

impl HandPose {
    #[inline]
    #[must_use]
    pub fn finger(&self, joint: FingerJoint) -> Vec3 {
        self.fingers[joint.index()]
    }

    #[inline]
    pub fn set_finger(&mut self, joint: FingerJoint, rotation: Vec3) {
        self.fingers[joint.index()] = rotation;
    }
}

// ============================================================================
// PoseSnapshot
// ============================================================================

/// Everything the solver knows about the subject at one instant.
///
/// `left_hand`/`right_hand` are anatomical sides of the avatar, already
/// corrected for the video feed's mirroring.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PoseSnapshot {
    pub face: Option<FacePose>,
    pub body: Option<BodyPose>,
    pub left_hand: Option<HandPose>,
    pub right_hand: Option<HandPose>,
}

impl PoseSnapshot {
    #[inline]
    #[must_use]
    pub fn hand(&self, side: Side) -> Option<&HandPose> {
        match side {
            Side::Left => self.left_hand.as_ref(),
            Side::Right => self.right_hand.as_ref(),
        }
    }

    #[inline]
    pub fn hand_mut(&mut self, side: Side) -> &mut Option<HandPose> {
        match side {
            Side::Left => &mut self.left_hand,
            Side::Right => &mut self.right_hand,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.face.is_none() && self.body.is_none() && self.left_hand.is_none() && self.right_hand.is_none()
    }
}
