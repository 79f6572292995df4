//! Per-frame orchestration.
//!
//! [`AvatarDriver`] owns every piece of retargeting state and runs one update
//! per rendered frame:
//!
//! 1. Readiness gate: nothing happens until the rig is ready and settled.
//! 2. Read the newest pose snapshot (dropped if the stream is off or stale).
//! 3. Crossfade controller reacts to stream state and clip selection. A
//!    stream that has gone quiet counts as stopped.
//! 4. Mixer writes the blended clip pose.
//! 5. While tracking: expressions, bones and gaze follow the snapshot.
//!    Otherwise expressions relax to neutral and then stop being written;
//!    gaze holds where it was.
//! 6. `rig.advance(dt)`.
//!
//! The perception side never touches the driver. It writes into the shared
//! [`PoseMailbox`] through a [`LandmarkSink`] obtained from [`AvatarDriver::sink`].

use std::sync::Arc;

use crate::animation::{AnimationClip, AnimationMixer};
use crate::crossfade::{AnimationCrossfadeController, ClipSelection, Readiness};
use crate::expression::{Expression, ExpressionBlender};
use crate::humanoid::BoneBindings;
use crate::look_at::LookAtController;
use crate::mailbox::PoseMailbox;
use crate::pose::PoseSnapshot;
use crate::retarget::SkeletonRetargeter;
use crate::rig::HumanoidRig;
use crate::settings::RetargetSettings;
use crate::solver::{GeometricSolver, HolisticSolver, LandmarkSink, LandmarkSolver};

/// Inputs observed once per tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameInput {
    /// Whether the perception stream (camera) is running at all.
    pub stream_active: bool,
    pub clip: ClipSelection,
}

impl FrameInput {
    #[must_use]
    pub fn tracking(clip: ClipSelection) -> Self {
        Self {
            stream_active: true,
            clip,
        }
    }

    #[must_use]
    pub fn idle(clip: ClipSelection) -> Self {
        Self {
            stream_active: false,
            clip,
        }
    }
}

/// Expression weights below this count as neutral once tracking lets go.
const FACE_REST_EPSILON: f32 = 1e-4;

/// Freshness bookkeeping for the mailbox reader.
#[derive(Debug, Clone, Default)]
struct Freshness {
    generation: u64,
    /// Seconds since the last new generation, or since the stream started
    /// when nothing has arrived yet.
    since_fresh: f32,
    stale_logged: bool,
    stream_was_active: bool,
}

/// What the reader found in the mailbox this tick.
struct Feed {
    snapshot: Option<Arc<PoseSnapshot>>,
    /// Stream on and not stale.
    live: bool,
}

pub struct AvatarDriver<N: Copy> {
    settings: RetargetSettings,
    mailbox: PoseMailbox,
    bones: BoneBindings<N>,
    expressions: ExpressionBlender,
    retargeter: SkeletonRetargeter,
    look_at: LookAtController,
    crossfade: AnimationCrossfadeController,
    mixer: AnimationMixer,
    freshness: Freshness,
    face_at_rest: bool,
}

impl<N: Copy> AvatarDriver<N> {
    #[must_use]
    pub fn new(settings: RetargetSettings) -> Self {
        Self {
            mailbox: PoseMailbox::new(),
            bones: BoneBindings::default(),
            expressions: ExpressionBlender::new(&settings.rates),
            retargeter: SkeletonRetargeter::new(settings.damping, &settings.rates),
            look_at: LookAtController::new(settings.gaze_gain, settings.rates.eye),
            crossfade: AnimationCrossfadeController::new(settings.crossfade),
            mixer: AnimationMixer::new(),
            freshness: Freshness::default(),
            face_at_rest: true,
            settings,
        }
    }

    /// Writer half for the perception callback, using `solver`.
    pub fn sink<S: LandmarkSolver>(&self, solver: S) -> LandmarkSink<S> {
        LandmarkSink::new(
            HolisticSolver::new(solver, self.settings.solver.image_size.into()),
            self.mailbox.clone(),
        )
    }

    /// Writer half using the built-in geometric solver.
    #[must_use]
    pub fn geometric_sink(&self) -> LandmarkSink<GeometricSolver> {
        self.sink(GeometricSolver::new(self.settings.solver))
    }

    pub fn add_clip(&mut self, clip: AnimationClip) {
        self.mixer.add_clip(clip);
    }

    #[must_use]
    pub fn settings(&self) -> &RetargetSettings {
        &self.settings
    }

    #[must_use]
    pub fn mailbox(&self) -> &PoseMailbox {
        &self.mailbox
    }

    #[must_use]
    pub fn mixer(&self) -> &AnimationMixer {
        &self.mixer
    }

    #[must_use]
    pub fn crossfade(&self) -> &AnimationCrossfadeController {
        &self.crossfade
    }

    #[must_use]
    pub fn expressions(&self) -> &ExpressionBlender {
        &self.expressions
    }

    #[must_use]
    pub fn look_at(&self) -> &LookAtController {
        &self.look_at
    }

    #[must_use]
    pub fn bones(&self) -> &BoneBindings<N> {
        &self.bones
    }

    /// Runs one frame.
    pub fn tick<R>(&mut self, rig: &mut R, input: &FrameInput, dt: f32)
    where
        R: HumanoidRig<Node = N> + ?Sized,
    {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        match self.crossfade.advance_readiness(rig.is_ready(), dt) {
            Readiness::Pending => {
                if rig.is_ready() {
                    rig.advance(dt);
                }
                return;
            }
            Readiness::BecameLive => self.on_ready(rig),
            Readiness::Live => {}
        }

        let feed = self.read_feed(input.stream_active, dt);

        self.crossfade.update(feed.live, &input.clip, &mut self.mixer, dt);
        self.mixer.update(dt, rig, &self.bones);

        let live = feed.snapshot.as_deref().filter(|_| self.crossfade.is_tracking());

        self.update_face(live, rig, dt);

        if let Some(snapshot) = live {
            self.retargeter.apply(snapshot, rig, &self.bones, dt);
        }

        if let Some(pupil) = live.and_then(|s| s.face.as_ref()).and_then(|f| f.pupil) {
            self.look_at.update(pupil, dt);
            self.look_at.apply(rig);
        }

        rig.advance(dt);
    }

    fn on_ready<R>(&mut self, rig: &mut R)
    where
        R: HumanoidRig<Node = N> + ?Sized,
    {
        self.bones = BoneBindings::resolve(rig);
        self.mixer.unbind();

        self.expressions.reset();
        self.face_at_rest = true;
        for &expression in Expression::ALL {
            rig.set_expression(expression, 0.0);
        }
        self.look_at.attach(rig);

        log::info!(
            "Avatar live: {} of {} humanoid bones bound",
            self.bones.bound_count(),
            crate::humanoid::HumanoidBone::COUNT
        );
    }

    /// Blends expressions toward the tracked face. Without one they relax,
    /// get pinned to exactly neutral, and are left alone from then on.
    fn update_face<R>(&mut self, live: Option<&PoseSnapshot>, rig: &mut R, dt: f32)
    where
        R: HumanoidRig<Node = N> + ?Sized,
    {
        if live.is_some() {
            self.face_at_rest = false;
        } else if self.face_at_rest {
            return;
        }

        self.expressions.update(live.and_then(|s| s.face.as_ref()), dt);
        if live.is_none() && self.expressions.is_neutral(FACE_REST_EPSILON) {
            self.expressions.reset();
            self.face_at_rest = true;
        }
        self.expressions.apply(rig);
    }

    /// Newest snapshot, dropped when the stream is off or has gone quiet.
    fn read_feed(&mut self, stream_active: bool, dt: f32) -> Feed {
        let fresh = &mut self.freshness;

        if !stream_active {
            if fresh.stream_was_active {
                // Stream stopped: whatever is in the slot is history.
                self.mailbox.clear();
                fresh.stream_was_active = false;
            }
            fresh.since_fresh = 0.0;
            fresh.stale_logged = false;
            return Feed {
                snapshot: None,
                live: false,
            };
        }
        fresh.stream_was_active = true;

        let delivered = self.mailbox.latest();
        match &delivered {
            Some(d) if d.generation != fresh.generation => {
                fresh.generation = d.generation;
                fresh.since_fresh = 0.0;
                fresh.stale_logged = false;
            }
            _ => fresh.since_fresh += dt,
        }

        if fresh.since_fresh > self.settings.stale_timeout {
            if !fresh.stale_logged {
                log::debug!(
                    "No new pose for {:.2}s, treating the stream as stopped",
                    fresh.since_fresh
                );
                fresh.stale_logged = true;
            }
            return Feed {
                snapshot: None,
                live: false,
            };
        }

        Feed {
            snapshot: delivered.map(|d| d.snapshot),
            live: true,
        }
    }
}
