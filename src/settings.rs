//! Retargeting Settings
//!
//! Tunable constants for smoothing, bone damping, gaze and crossfade timing.
//!
//! The defaults reproduce the behaviour the avatar was tuned with. Every field
//! is optional when deserializing, so a JSON file only needs to list the
//! values it overrides:
//!
//! ```rust,ignore
//! use puppet::settings::RetargetSettings;
//!
//! let settings = RetargetSettings::from_json_str(r#"{ "rates": { "hand": 12.0 } }"#)?;
//! assert_eq!(settings.rates.body, 4.0);
//! ```

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::errors::{RetargetError, Result};

// ---------------------------------------------------------------------------
// Smoothing rates
// ---------------------------------------------------------------------------

/// Interpolation rates, in "fraction of the remaining distance per second".
///
/// Each frame a smoothed value moves `clamp(rate * dt, 0, 1)` of the way to
/// its target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingRates {
    /// Mouth-shape expressions.
    pub face: f32,
    /// Blink expressions.
    pub blink: f32,
    /// Gaze target movement.
    pub eye: f32,
    /// Head, torso and arm bones.
    pub body: f32,
    /// Wrists and finger joints.
    pub hand: f32,
}

impl Default for SmoothingRates {
    fn default() -> Self {
        Self {
            face: 8.0,
            blink: 8.0,
            eye: 4.0,
            body: 4.0,
            hand: 10.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Bone damping
// ---------------------------------------------------------------------------

/// Per-axis scale applied to solved Euler angles before they become a target
/// orientation. Values below 1 tame bones whose solved motion looks
/// exaggerated on the avatar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoneDamping {
    pub head: Vec3,
    pub torso: Vec3,
    pub hips: Vec3,
    pub limbs: Vec3,
}

impl Default for BoneDamping {
    fn default() -> Self {
        Self {
            head: Vec3::splat(0.5),
            torso: Vec3::splat(0.25),
            hips: Vec3::splat(0.5),
            limbs: Vec3::ONE,
        }
    }
}

// ---------------------------------------------------------------------------
// Crossfade timing
// ---------------------------------------------------------------------------

/// Durations (seconds) that drive the idle/tracking state machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossfadeTiming {
    /// Fade applied to clips that stop driving the rig.
    pub fade_out: f32,
    /// Fade applied to a clip that starts driving the rig.
    pub fade_in: f32,
    /// Delay between selecting a clip and starting it.
    pub clip_start_delay: f32,
    /// Settle time after the rig reports ready before any update is applied.
    pub ready_delay: f32,
}

impl Default for CrossfadeTiming {
    fn default() -> Self {
        Self {
            fade_out: 0.3,
            fade_in: 0.8,
            clip_start_delay: 0.2,
            ready_delay: 0.1,
        }
    }
}

// ---------------------------------------------------------------------------
// Solver parameters
// ---------------------------------------------------------------------------

/// Parameters of the geometric landmark solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Eye openness below `.0` snaps shut, above `.1` snaps fully open.
    pub blink_thresholds: (f32, f32),
    /// Average both eyes when their openness differs by less than this.
    pub blink_sync: f32,
    /// Size of the video frame the landmarks were normalized against.
    pub image_size: (u32, u32),
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            blink_thresholds: (0.2, 0.8),
            blink_sync: 0.25,
            image_size: (640, 480),
        }
    }
}

// ---------------------------------------------------------------------------
// RetargetSettings
// ---------------------------------------------------------------------------

/// Complete configuration of the retargeting core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetargetSettings {
    pub rates: SmoothingRates,
    pub damping: BoneDamping,
    pub crossfade: CrossfadeTiming,
    pub solver: SolverSettings,
    /// Horizontal/vertical gain from pupil offset to gaze target position.
    pub gaze_gain: Vec2,
    /// Seconds without a fresh snapshot before live data is treated as absent.
    pub stale_timeout: f32,
}

impl Default for RetargetSettings {
    fn default() -> Self {
        Self {
            rates: SmoothingRates::default(),
            damping: BoneDamping::default(),
            crossfade: CrossfadeTiming::default(),
            solver: SolverSettings::default(),
            gaze_gain: Vec2::new(1.5, 1.5),
            stale_timeout: 0.5,
        }
    }
}

impl RetargetSettings {
    /// Parses settings from JSON and validates them.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects negative or non-finite values.
    pub fn validate(&self) -> Result<()> {
        let scalars = [
            ("rates.face", self.rates.face),
            ("rates.blink", self.rates.blink),
            ("rates.eye", self.rates.eye),
            ("rates.body", self.rates.body),
            ("rates.hand", self.rates.hand),
            ("crossfade.fade_out", self.crossfade.fade_out),
            ("crossfade.fade_in", self.crossfade.fade_in),
            ("crossfade.clip_start_delay", self.crossfade.clip_start_delay),
            ("crossfade.ready_delay", self.crossfade.ready_delay),
            ("solver.blink_sync", self.solver.blink_sync),
            ("stale_timeout", self.stale_timeout),
        ];
        for (name, value) in scalars {
            if !value.is_finite() || value < 0.0 {
                return Err(RetargetError::InvalidSettings(format!(
                    "{name} must be finite and >= 0, got {value}"
                )));
            }
        }

        let vectors = [
            ("damping.head", self.damping.head),
            ("damping.torso", self.damping.torso),
            ("damping.hips", self.damping.hips),
            ("damping.limbs", self.damping.limbs),
        ];
        for (name, value) in vectors {
            if !value.is_finite() {
                return Err(RetargetError::InvalidSettings(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }

        if !self.gaze_gain.is_finite() {
            return Err(RetargetError::InvalidSettings(format!(
                "gaze_gain must be finite, got {}",
                self.gaze_gain
            )));
        }

        let (low, high) = self.solver.blink_thresholds;
        if !(0.0..=1.0).contains(&low) || !(0.0..=1.0).contains(&high) || low >= high {
            return Err(RetargetError::InvalidSettings(format!(
                "solver.blink_thresholds must satisfy 0 <= low < high <= 1, got ({low}, {high})"
            )));
        }

        let (width, height) = self.solver.image_size;
        if width == 0 || height == 0 {
            return Err(RetargetError::InvalidSettings(format!(
                "solver.image_size must be non-zero, got {width}x{height}"
            )));
        }

        Ok(())
    }
}
