//! Facial expression smoothing.
//!
//! [`ExpressionBlender`] owns the smoothed weight of every tracked expression
//! and moves it toward the solved target once per frame. Without face data
//! every target is 0, so the face relaxes to neutral instead of freezing.

use crate::pose::FacePose;
use crate::rig::HumanoidRig;
use crate::settings::SmoothingRates;

/// Tracked facial expressions (VRM preset names).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Expression {
    Aa,
    Ih,
    Ee,
    Oh,
    Ou,
    BlinkLeft,
    BlinkRight,
}

impl Expression {
    pub const ALL: &'static [Expression] = &[
        Self::Aa,
        Self::Ih,
        Self::Ee,
        Self::Oh,
        Self::Ou,
        Self::BlinkLeft,
        Self::BlinkRight,
    ];
    pub const COUNT: usize = Self::ALL.len();

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Aa => "aa",
            Self::Ih => "ih",
            Self::Ee => "ee",
            Self::Oh => "oh",
            Self::Ou => "ou",
            Self::BlinkLeft => "blinkLeft",
            Self::BlinkRight => "blinkRight",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|e| e.name() == name)
    }

    #[inline]
    #[must_use]
    pub const fn is_blink(self) -> bool {
        matches!(self, Self::BlinkLeft | Self::BlinkRight)
    }

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }

    /// Target weight of this expression for a solved face.
    #[must_use]
    pub fn target(self, face: &FacePose) -> f32 {
        match self {
            Self::Aa => face.mouth.a,
            Self::Ih => face.mouth.i,
            Self::Ee => face.mouth.e,
            Self::Oh => face.mouth.o,
            Self::Ou => face.mouth.u,
            Self::BlinkLeft => 1.0 - face.eyes.left,
            Self::BlinkRight => 1.0 - face.eyes.right,
        }
    }
}

/// Moves `current` toward `target` by `clamp(rate * dt, 0, 1)` of the gap.
#[inline]
#[must_use]
pub fn smooth_toward(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    let t = (rate * dt).clamp(0.0, 1.0);
    current + (target - current) * t
}

#[derive(Debug, Clone)]
pub struct ExpressionBlender {
    weights: [f32; Expression::COUNT],
    face_rate: f32,
    blink_rate: f32,
}

impl ExpressionBlender {
    #[must_use]
    pub fn new(rates: &SmoothingRates) -> Self {
        Self {
            weights: [0.0; Expression::COUNT],
            face_rate: rates.face,
            blink_rate: rates.blink,
        }
    }

    /// Advances every weight one frame toward its target.
    pub fn update(&mut self, face: Option<&FacePose>, dt: f32) {
        let dt = dt.max(0.0);
        for &expression in Expression::ALL {
            let target = face.map_or(0.0, |f| expression.target(f)).clamp(0.0, 1.0);
            let rate = if expression.is_blink() {
                self.blink_rate
            } else {
                self.face_rate
            };
            let w = &mut self.weights[expression.index()];
            *w = smooth_toward(*w, target, rate, dt).clamp(0.0, 1.0);
        }
    }

    #[inline]
    #[must_use]
    pub fn weight(&self, expression: Expression) -> f32 {
        self.weights[expression.index()]
    }

    /// Weight by VRM name; unknown names read as `None`.
    #[must_use]
    pub fn weight_by_name(&self, name: &str) -> Option<f32> {
        Expression::from_name(name).map(|e| self.weight(e))
    }

    /// Overrides one weight by name. Unknown names are ignored.
    pub fn set_weight_by_name(&mut self, name: &str, weight: f32) {
        if let Some(e) = Expression::from_name(name) {
            self.weights[e.index()] = weight.clamp(0.0, 1.0);
        }
    }

    /// Zeroes every weight.
    pub fn reset(&mut self) {
        self.weights = [0.0; Expression::COUNT];
    }

    /// `true` once every weight is within `epsilon` of 0.
    #[must_use]
    pub fn is_neutral(&self, epsilon: f32) -> bool {
        self.weights.iter().all(|w| *w <= epsilon)
    }

    pub fn apply<R: HumanoidRig + ?Sized>(&self, rig: &mut R) {
        for &expression in Expression::ALL {
            rig.set_expression(expression, self.weight(expression));
        }
    }
}
