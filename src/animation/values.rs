use glam::Quat;

/// Values a keyframe track can blend between.
pub trait Interpolatable: Copy {
    /// `t` is the normalized position between `start` (0) and `end` (1).
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self;
}

impl Interpolatable for Quat {
    /// Spherical, so bone rotations keep constant angular speed.
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self {
        start.slerp(*end, t)
    }
}
