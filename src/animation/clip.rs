use glam::Quat;

use crate::animation::tracks::KeyframeTrack;
use crate::humanoid::HumanoidBone;

/// Rotation keyframes for one humanoid bone.
#[derive(Debug, Clone)]
pub struct Track {
    pub bone: HumanoidBone,
    pub rotation: KeyframeTrack<Quat>,
}

impl Track {
    #[must_use]
    pub fn new(bone: HumanoidBone, rotation: KeyframeTrack<Quat>) -> Self {
        Self { bone, rotation }
    }
}

/// A named animation already expressed in humanoid bone space.
///
/// Retargeting a source animation (e.g. a Mixamo clip) onto humanoid bones is
/// done by the asset pipeline before the clip reaches the core.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    /// Duration is the time of the latest keyframe across all tracks.
    #[must_use]
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        let duration = tracks
            .iter()
            .map(|t| t.rotation.end_time())
            .fold(0.0_f32, f32::max);

        Self {
            name: name.into(),
            duration,
            tracks,
        }
    }
}
