//! Idle clip / live tracking arbitration.
//!
//! The avatar is driven either by a looping clip or by live tracking, never
//! both except while one fades out under the other. The controller observes
//! two inputs every tick (is the perception stream active, which clip is
//! selected) and issues fades against a [`ClipPlayback`] backend.
//!
//! ```text
//!                    rig ready + settle delay
//! Uninitialized ─────────────────────────────▶ None
//!
//!   None / Idle(a) ── stream starts ──────────▶ Tracking      (clips fade out)
//!   Tracking ──────── stream stops, clip b ───▶ Idle(b)       (b fades in)
//!   Tracking ──────── stream stops, "none" ───▶ None
//!   None / Idle(a) ── clip b selected ────────▶ Idle(b)       (after the start delay:
//!                                                             a fades out, b fades in)
//!   Idle(a) ───────── "none" selected ────────▶ None          (a fades out)
//! ```
//!
//! Nothing here can fail: an unknown clip is logged and treated as "none".

use smallvec::SmallVec;

use crate::animation::LoopMode;
use crate::settings::CrossfadeTiming;

/// Clip playback operations consumed by the controller.
pub trait ClipPlayback {
    fn clip_names(&self) -> SmallVec<[String; 4]>;
    fn has_clip(&self, name: &str) -> bool;
    fn play(&mut self, name: &str);
    /// Rewinds and clears any fade.
    fn reset(&mut self, name: &str);
    fn set_loop(&mut self, name: &str, mode: LoopMode);
    fn fade_in(&mut self, name: &str, duration: f32);
    /// Ramps from the current weight to `target`, keeping the playhead.
    fn fade_to(&mut self, name: &str, target: f32, duration: f32);
    /// Fades to 0, after which the clip stops running.
    fn fade_out(&mut self, name: &str, duration: f32);
    fn is_running(&self, name: &str) -> bool;
    /// Current blend weight; 0 when not running.
    fn weight(&self, name: &str) -> f32;
}

/// Animation choice made by the host UI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ClipSelection {
    #[default]
    None,
    Named(String),
}

impl ClipSelection {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }
}

/// Which source currently owns the rig.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrossfadeState {
    /// Rig not ready yet; nothing is applied.
    Uninitialized,
    Idle(String),
    Tracking,
    /// No source; the rig holds its last pose.
    None,
}

/// Result of [`AnimationCrossfadeController::advance_readiness`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Pending,
    /// This tick completed the settle delay.
    BecameLive,
    Live,
}

#[derive(Debug, Clone)]
struct PendingStart {
    clip: String,
    elapsed: f32,
}

#[derive(Debug, Clone)]
pub struct AnimationCrossfadeController {
    state: CrossfadeState,
    timing: CrossfadeTiming,
    settled: f32,
    pending: Option<PendingStart>,
}

impl AnimationCrossfadeController {
    #[must_use]
    pub fn new(timing: CrossfadeTiming) -> Self {
        Self {
            state: CrossfadeState::Uninitialized,
            timing,
            settled: 0.0,
            pending: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> &CrossfadeState {
        &self.state
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.state != CrossfadeState::Uninitialized
    }

    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.state == CrossfadeState::Tracking
    }

    /// Clip waiting out its start delay, if any.
    #[must_use]
    pub fn pending_clip(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.clip.as_str())
    }

    /// Accumulates settle time while the rig reports ready. The controller
    /// goes live once `ready_delay` has elapsed, and stays live.
    pub fn advance_readiness(&mut self, rig_ready: bool, dt: f32) -> Readiness {
        if self.is_live() {
            return Readiness::Live;
        }
        if !rig_ready {
            return Readiness::Pending;
        }

        self.settled += dt.max(0.0);
        if self.settled >= self.timing.ready_delay {
            log::info!("Rig ready after {:.3}s settle", self.settled);
            self.state = CrossfadeState::None;
            Readiness::BecameLive
        } else {
            Readiness::Pending
        }
    }

    /// Applies this tick's inputs. Does nothing before the rig is live.
    pub fn update<P>(&mut self, stream_active: bool, selection: &ClipSelection, playback: &mut P, dt: f32)
    where
        P: ClipPlayback + ?Sized,
    {
        if !self.is_live() {
            return;
        }

        if stream_active {
            if !self.is_tracking() {
                self.fade_out_running(playback, None);
                self.pending = None;
                self.transition(CrossfadeState::Tracking);
            }
        } else {
            match selection {
                ClipSelection::None => self.enter_none(playback),
                ClipSelection::Named(name) if !playback.has_clip(name) => {
                    if self.state != CrossfadeState::None {
                        log::warn!("Animation clip '{name}' not found, falling back to no animation");
                    }
                    self.enter_none(playback);
                }
                ClipSelection::Named(name) => {
                    if !matches!(&self.state, CrossfadeState::Idle(current) if current == name) {
                        self.pending = Some(PendingStart {
                            clip: name.clone(),
                            elapsed: 0.0,
                        });
                        self.transition(CrossfadeState::Idle(name.clone()));
                    }
                }
            }
        }

        self.advance_pending(playback, dt);
    }

    fn enter_none<P: ClipPlayback + ?Sized>(&mut self, playback: &mut P) {
        if self.state != CrossfadeState::None {
            self.fade_out_running(playback, None);
            self.pending = None;
            self.transition(CrossfadeState::None);
        }
    }

    fn advance_pending<P: ClipPlayback + ?Sized>(&mut self, playback: &mut P, dt: f32) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };

        pending.elapsed += dt.max(0.0);
        if pending.elapsed < self.timing.clip_start_delay {
            return;
        }

        let clip = std::mem::take(&mut pending.clip);
        self.pending = None;

        self.fade_out_running(playback, Some(clip.as_str()));

        // Still fading out from an earlier hand-off: turn it around in place.
        if playback.is_running(&clip) {
            log::debug!("Resuming clip '{clip}' from weight {:.2}", playback.weight(&clip));
            playback.set_loop(&clip, LoopMode::Loop);
            playback.fade_to(&clip, 1.0, self.timing.fade_in);
            return;
        }

        log::debug!("Starting clip '{clip}' (fade in {:.2}s)", self.timing.fade_in);
        playback.reset(&clip);
        playback.set_loop(&clip, LoopMode::Loop);
        playback.fade_in(&clip, self.timing.fade_in);
        playback.play(&clip);
    }

    fn fade_out_running<P: ClipPlayback + ?Sized>(&self, playback: &mut P, keep: Option<&str>) {
        for name in playback.clip_names() {
            if Some(name.as_str()) != keep && playback.is_running(&name) {
                log::debug!("Fading out clip '{name}' over {:.2}s", self.timing.fade_out);
                playback.fade_out(&name, self.timing.fade_out);
            }
        }
    }

    fn transition(&mut self, next: CrossfadeState) {
        log::info!("Crossfade: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
