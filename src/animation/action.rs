use std::sync::Arc;

use glam::Quat;

use crate::animation::{
    binding::PropertyBinding,
    clip::AnimationClip,
    tracks::KeyframeCursor,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    Once,
    Loop,
    PingPong,
}

/// A timed weight ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Fade {
    from: f32,
    to: f32,
    elapsed: f32,
    duration: f32,
    /// Stop the action once the ramp completes (fade-outs).
    stop_at_end: bool,
}

/// Playback state of one clip.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,

    pub time: f32,
    pub time_scale: f32,
    pub weight: f32,
    pub loop_mode: LoopMode,
    pub paused: bool,
    pub enabled: bool,

    playing: bool,
    fade: Option<Fade>,

    pub bindings: Vec<PropertyBinding>,
    /// `bindings` has been resolved against the current rig.
    pub(crate) bound: bool,

    pub(crate) track_cursors: Vec<KeyframeCursor>,
}

impl AnimationAction {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        let track_count = clip.tracks.len();
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            loop_mode: LoopMode::Loop,
            paused: false,
            enabled: true,
            playing: false,
            fade: None,
            bindings: Vec::new(),
            bound: false,
            track_cursors: vec![KeyframeCursor::default(); track_count],
        }
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    // ========================================================================
    // Playback control
    // ========================================================================

    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Stops immediately, dropping any fade in progress.
    pub fn stop(&mut self) {
        self.playing = false;
        self.fade = None;
    }

    /// Rewinds to the start and clears pause/disable/fade state.
    pub fn reset(&mut self) {
        self.time = 0.0;
        self.paused = false;
        self.enabled = true;
        self.fade = None;
        self.track_cursors.fill(KeyframeCursor::default());
    }

    pub fn set_loop(&mut self, mode: LoopMode) {
        self.loop_mode = mode;
    }

    /// Ramps the weight from 0 to 1 over `duration` seconds.
    pub fn fade_in(&mut self, duration: f32) {
        self.start_fade(0.0, 1.0, duration, false);
    }

    /// Ramps the weight from its current value to `target`. Cancels a
    /// pending stop from an earlier fade-out.
    pub fn fade_to(&mut self, target: f32, duration: f32) {
        self.start_fade(self.weight, target, duration, false);
    }

    /// Ramps the weight from its current value to 0, then stops.
    pub fn fade_out(&mut self, duration: f32) {
        self.start_fade(self.weight, 0.0, duration, true);
    }

    fn start_fade(&mut self, from: f32, to: f32, duration: f32, stop_at_end: bool) {
        self.fade = Some(Fade {
            from,
            to,
            elapsed: 0.0,
            duration: duration.max(0.0),
            stop_at_end,
        });
        self.weight = from;
        // A zero-length fade completes right away.
        self.advance_fade(0.0);
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.playing && self.enabled && !self.paused && self.time_scale != 0.0
    }

    #[must_use]
    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Weight the mixer blends this action with; 0 when not running.
    #[must_use]
    pub fn effective_weight(&self) -> f32 {
        if self.is_running() { self.weight } else { 0.0 }
    }

    // ========================================================================
    // Per-frame update
    // ========================================================================

    /// Advances the weight ramp and the playhead.
    pub fn update(&mut self, dt: f32) {
        if !self.is_running() {
            return;
        }

        self.advance_fade(dt);
        if !self.is_running() {
            return;
        }

        let duration = self.clip.duration;
        if duration <= 0.0 {
            return;
        }

        self.time += dt * self.time_scale;

        match self.loop_mode {
            LoopMode::Once => {
                if self.time >= duration {
                    self.time = duration;
                    self.paused = true;
                } else if self.time < 0.0 {
                    self.time = 0.0;
                    self.paused = true;
                }
            }
            LoopMode::Loop => {
                self.time = self.time.rem_euclid(duration);
            }
            LoopMode::PingPong => {
                let cycle = duration * 2.0;
                let t = self.time.rem_euclid(cycle);
                self.time = if t > duration { cycle - t } else { t };
            }
        }
    }

    fn advance_fade(&mut self, dt: f32) {
        let Some(fade) = self.fade.as_mut() else {
            return;
        };

        fade.elapsed += dt.max(0.0);
        if fade.elapsed >= fade.duration {
            self.weight = fade.to;
            let stop = fade.stop_at_end;
            self.fade = None;
            if stop {
                self.enabled = false;
            }
        } else {
            let t = fade.elapsed / fade.duration;
            self.weight = fade.from + (fade.to - fade.from) * t;
        }
    }

    /// Samples a track at the current playhead.
    pub fn sample_track(&mut self, track_index: usize) -> Option<Quat> {
        let track = self.clip.tracks.get(track_index)?;
        let cursor = self.track_cursors.get_mut(track_index)?;
        track.rotation.sample_with_cursor(self.time, cursor)
    }
}
