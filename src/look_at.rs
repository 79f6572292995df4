//! Gaze target smoothing.

use glam::{Vec2, Vec3};

use crate::rig::HumanoidRig;

/// Virtual point, in viewer space, that the rig's eyes follow.
#[derive(Debug, Clone)]
pub struct LookAtController {
    target: Vec3,
    gain: Vec2,
    rate: f32,
    attached: bool,
}

impl LookAtController {
    /// `gain` maps pupil offset to target position (x is mirrored).
    #[must_use]
    pub fn new(gain: Vec2, rate: f32) -> Self {
        Self {
            target: Vec3::ZERO,
            gain,
            rate,
            attached: false,
        }
    }

    /// Hands the gaze target to the rig. Only the first call has an effect.
    pub fn attach<R: HumanoidRig + ?Sized>(&mut self, rig: &mut R) {
        if self.attached {
            return;
        }
        rig.attach_look_at();
        self.attached = true;
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Where the target heads for a given pupil offset.
    #[must_use]
    pub fn destination(&self, pupil: Vec2) -> Vec3 {
        Vec3::new(-self.gain.x * pupil.x, self.gain.y * pupil.y, 0.0)
    }

    /// Moves the target toward the pupil destination. Callers skip this
    /// without a pupil, so the gaze holds its last position.
    pub fn update(&mut self, pupil: Vec2, dt: f32) {
        let destination = self.destination(pupil);
        let t = (self.rate * dt.max(0.0)).clamp(0.0, 1.0);
        self.target = self.target.lerp(destination, t);
    }

    #[must_use]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn apply<R: HumanoidRig + ?Sized>(&self, rig: &mut R) {
        if self.attached {
            rig.set_look_at_target(self.target);
        }
    }
}
