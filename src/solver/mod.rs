//! Landmark solving.
//!
//! A [`LandmarkSolver`] turns one category of raw landmarks into semantic pose
//! parameters. [`HolisticSolver`] runs it over a full perception result:
//!
//! - The four categories are solved independently. A failure in one is logged
//!   and leaves that category's previous value in place; the others proceed.
//! - Hand results are mirrored. The video feed is mirrored, so the
//!   `left_hand_landmarks` stream belongs to the avatar's right hand and vice
//!   versa.
//!
//! [`LandmarkSink`] is the writer half of the pipeline: it owns a holistic
//! solver and publishes every solved snapshot into a [`PoseMailbox`]. It is
//! meant to live on the perception callback's side.

mod body;
mod face;
mod hand;

use std::fmt;

use glam::Vec3;

use crate::errors::{RetargetError, Result};
use crate::landmarks::{HolisticResults, Landmark};
use crate::mailbox::PoseMailbox;
use crate::pose::{BodyPose, FacePose, HandPose, PoseSnapshot, Side};
use crate::settings::SolverSettings;

/// Landmark category, used to tag errors and log messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveCategory {
    Face,
    Pose,
    LeftHand,
    RightHand,
}

impl fmt::Display for SolveCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Face => "face",
            Self::Pose => "pose",
            Self::LeftHand => "left hand",
            Self::RightHand => "right hand",
        })
    }
}

/// Pixel size of the source video frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    #[must_use]
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

impl From<(u32, u32)> for ImageSize {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// Converts one landmark category into pose parameters.
pub trait LandmarkSolver {
    fn solve_face(&mut self, landmarks: &[Landmark], image: ImageSize) -> Result<FacePose>;

    fn solve_body(&mut self, landmarks: &[Landmark], image: ImageSize) -> Result<BodyPose>;

    /// Solves a hand as the avatar's `side` hand.
    fn solve_hand(&mut self, landmarks: &[Landmark], side: Side) -> Result<HandPose>;
}

// ============================================================================
// GeometricSolver
// ============================================================================

/// Reference solver working directly on MediaPipe landmark geometry.
#[derive(Debug, Clone, Default)]
pub struct GeometricSolver {
    settings: SolverSettings,
}

impl GeometricSolver {
    #[must_use]
    pub fn new(settings: SolverSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }
}

impl LandmarkSolver for GeometricSolver {
    fn solve_face(&mut self, landmarks: &[Landmark], image: ImageSize) -> Result<FacePose> {
        face::solve(landmarks, image, &self.settings)
    }

    fn solve_body(&mut self, landmarks: &[Landmark], image: ImageSize) -> Result<BodyPose> {
        body::solve(landmarks, image)
    }

    fn solve_hand(&mut self, landmarks: &[Landmark], side: Side) -> Result<HandPose> {
        hand::solve(landmarks, side)
    }
}

// ============================================================================
// HolisticSolver
// ============================================================================

/// Runs a [`LandmarkSolver`] over whole perception results, retaining the
/// last good value of each category.
#[derive(Debug, Clone)]
pub struct HolisticSolver<S> {
    solver: S,
    default_image: ImageSize,
    retained: PoseSnapshot,
}

impl<S: LandmarkSolver> HolisticSolver<S> {
    pub fn new(solver: S, default_image: ImageSize) -> Self {
        Self {
            solver,
            default_image,
            retained: PoseSnapshot::default(),
        }
    }

    /// Solves every category present in `results` and returns the merged
    /// snapshot.
    pub fn solve(&mut self, results: &HolisticResults) -> PoseSnapshot {
        let image = results.image_size.map_or(self.default_image, ImageSize::from);

        if let Some(points) = non_empty(results.face_landmarks.as_deref()) {
            match self.solver.solve_face(points, image) {
                Ok(face) => self.retained.face = Some(face),
                Err(e) => log::warn!("Face tracking error: {e}"),
            }
        }

        if let Some(points) = non_empty(results.pose_landmarks.as_deref()) {
            match self.solver.solve_body(points, image) {
                Ok(body) => self.retained.body = Some(body),
                Err(e) => log::warn!("Pose tracking error: {e}"),
            }
        }

        let hands = [
            (results.left_hand_landmarks.as_deref(), Side::Left),
            (results.right_hand_landmarks.as_deref(), Side::Right),
        ];
        for (points, stream_side) in hands {
            let Some(points) = non_empty(points) else {
                continue;
            };
            let side = stream_side.mirrored();
            match self.solver.solve_hand(points, side) {
                Ok(hand) => *self.retained.hand_mut(side) = Some(hand),
                Err(e) => log::warn!("{stream_side:?} hand tracking error: {e}"),
            }
        }

        self.retained
    }

    /// Last merged snapshot.
    #[must_use]
    pub fn retained(&self) -> &PoseSnapshot {
        &self.retained
    }

    /// Forgets every retained category.
    pub fn reset(&mut self) {
        self.retained = PoseSnapshot::default();
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.solver
    }
}

fn non_empty(points: Option<&[Landmark]>) -> Option<&[Landmark]> {
    points.filter(|p| !p.is_empty())
}

// ============================================================================
// LandmarkSink
// ============================================================================

/// Perception-side writer: solves results and publishes them.
#[derive(Debug, Clone)]
pub struct LandmarkSink<S> {
    solver: HolisticSolver<S>,
    mailbox: PoseMailbox,
}

impl<S: LandmarkSolver> LandmarkSink<S> {
    pub fn new(solver: HolisticSolver<S>, mailbox: PoseMailbox) -> Self {
        Self { solver, mailbox }
    }

    /// Perception callback entry point. Returns the published generation.
    pub fn on_results(&mut self, results: &HolisticResults) -> u64 {
        let snapshot = self.solver.solve(results);
        self.mailbox.publish(snapshot)
    }

    /// Called when the perception stream stops: drops retained data so a
    /// restart never replays an old pose.
    pub fn deactivate(&mut self) {
        self.solver.reset();
        self.mailbox.clear();
    }

    #[must_use]
    pub fn mailbox(&self) -> &PoseMailbox {
        &self.mailbox
    }

    #[must_use]
    pub fn solver(&self) -> &HolisticSolver<S> {
        &self.solver
    }
}

// ============================================================================
// Shared geometry helpers
// ============================================================================

const MIN_SEGMENT: f32 = 1e-6;

/// Checks point count and finiteness.
fn validate(category: SolveCategory, landmarks: &[Landmark], expected: usize) -> Result<()> {
    if landmarks.len() < expected {
        return Err(RetargetError::InsufficientLandmarks {
            category,
            expected,
            actual: landmarks.len(),
        });
    }
    if let Some(index) = landmarks.iter().position(|l| !l.is_finite()) {
        return Err(RetargetError::NonFiniteLandmark { category, index });
    }
    Ok(())
}

/// Image-normalized landmark → right-handed space (x right, y up, z toward
/// the viewer), with x and z rescaled so all axes share the height's units.
#[inline]
fn to_space(landmark: &Landmark, aspect: f32) -> Vec3 {
    Vec3::new(landmark.x * aspect, -landmark.y, -landmark.z * aspect)
}

/// Normalized `to - from`, or an error when the points coincide.
fn direction(category: SolveCategory, from: Vec3, to: Vec3, detail: &'static str) -> Result<Vec3> {
    let d = to - from;
    let len = d.length();
    if len < MIN_SEGMENT || !len.is_finite() {
        return Err(RetargetError::DegenerateGeometry { category, detail });
    }
    Ok(d / len)
}

#[inline]
fn remap01(value: f32, low: f32, high: f32) -> f32 {
    ((value - low) / (high - low)).clamp(0.0, 1.0)
}
