//! Perception input types and landmark index tables.
//!
//! Landmarks follow the MediaPipe holistic topologies: a 468-point face mesh
//! (478 with iris refinement), 33 body joints and 21 points per hand.
//! Coordinates are normalized to the video frame (`x`, `y` in 0..1, `z`
//! relative depth on roughly the same scale as `x`).

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A single 3D keypoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Detector confidence that the point is visible, when provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f32>,
}

impl Landmark {
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            visibility: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<Vec3> for Landmark {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// One result object from the perception module.
///
/// Each field is independently optional: a frame may contain a face but no
/// hands. Whether the perception stream is running at all is reported
/// separately (see [`FrameInput`](crate::driver::FrameInput)).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolisticResults {
    #[serde(default)]
    pub face_landmarks: Option<Vec<Landmark>>,
    #[serde(default)]
    pub pose_landmarks: Option<Vec<Landmark>>,
    #[serde(default)]
    pub left_hand_landmarks: Option<Vec<Landmark>>,
    #[serde(default)]
    pub right_hand_landmarks: Option<Vec<Landmark>>,
    /// Pixel size of the frame the landmarks were detected in.
    #[serde(default)]
    pub image_size: Option<(u32, u32)>,
}

impl HolisticResults {
    /// `true` when no category carries any points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        [
            &self.face_landmarks,
            &self.pose_landmarks,
            &self.left_hand_landmarks,
            &self.right_hand_landmarks,
        ]
        .into_iter()
        .all(|set| set.as_deref().is_none_or(<[Landmark]>::is_empty))
    }
}

// ============================================================================
// Face mesh indices
// ============================================================================

pub mod face {
    pub const POINT_COUNT: usize = 468;
    pub const POINT_COUNT_WITH_IRIS: usize = 478;

    pub const FOREHEAD: usize = 10;
    pub const CHIN: usize = 152;
    pub const CHEEK_RIGHT: usize = 234;
    pub const CHEEK_LEFT: usize = 454;

    pub const UPPER_LIP: usize = 13;
    pub const LOWER_LIP: usize = 14;
    pub const MOUTH_CORNER_RIGHT: usize = 61;
    pub const MOUTH_CORNER_LEFT: usize = 291;

    // "Left"/"right" are the subject's own sides.
    pub const RIGHT_EYE_OUTER: usize = 33;
    pub const RIGHT_EYE_INNER: usize = 133;
    pub const RIGHT_EYE_UPPER: usize = 159;
    pub const RIGHT_EYE_LOWER: usize = 145;
    pub const LEFT_EYE_OUTER: usize = 263;
    pub const LEFT_EYE_INNER: usize = 362;
    pub const LEFT_EYE_UPPER: usize = 386;
    pub const LEFT_EYE_LOWER: usize = 374;

    pub const RIGHT_IRIS: usize = 468;
    pub const LEFT_IRIS: usize = 473;
}

// ============================================================================
// Body pose indices
// ============================================================================

pub mod pose {
    pub const POINT_COUNT: usize = 33;

    pub const LEFT_SHOULDER: usize = 11;
    pub const RIGHT_SHOULDER: usize = 12;
    pub const LEFT_ELBOW: usize = 13;
    pub const RIGHT_ELBOW: usize = 14;
    pub const LEFT_WRIST: usize = 15;
    pub const RIGHT_WRIST: usize = 16;
    pub const LEFT_PINKY: usize = 17;
    pub const RIGHT_PINKY: usize = 18;
    pub const LEFT_INDEX: usize = 19;
    pub const RIGHT_INDEX: usize = 20;
    pub const LEFT_HIP: usize = 23;
    pub const RIGHT_HIP: usize = 24;
}

// ============================================================================
// Hand indices
// ============================================================================

pub mod hand {
    pub const POINT_COUNT: usize = 21;

    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}
