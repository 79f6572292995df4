use std::sync::Arc;

use glam::Quat;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::animation::action::{AnimationAction, LoopMode};
use crate::animation::binder::Binder;
use crate::animation::clip::AnimationClip;
use crate::crossfade::ClipPlayback;
use crate::humanoid::{BoneBindings, HumanoidBone};
use crate::rig::HumanoidRig;

/// Plays named clips onto a humanoid rig.
///
/// Running actions are blended per bone by weight. When the summed weight is
/// below 1 the blend is mixed with the bone's current rotation, so a clip
/// fading out hands the bone back to whatever else is driving it.
#[derive(Debug, Default)]
pub struct AnimationMixer {
    actions: Vec<AnimationAction>,
    by_name: FxHashMap<String, usize>,
}

impl AnimationMixer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a clip under its own name, replacing any clip with the same
    /// name. The new action starts stopped.
    pub fn add_clip(&mut self, clip: AnimationClip) {
        self.add_action(AnimationAction::new(Arc::new(clip)));
    }

    pub fn add_action(&mut self, action: AnimationAction) {
        let name = action.clip().name.clone();
        if let Some(&index) = self.by_name.get(&name) {
            self.actions[index] = action;
        } else {
            self.by_name.insert(name, self.actions.len());
            self.actions.push(action);
        }
    }

    #[must_use]
    pub fn action(&self, name: &str) -> Option<&AnimationAction> {
        self.by_name.get(name).map(|&i| &self.actions[i])
    }

    pub fn action_mut(&mut self, name: &str) -> Option<&mut AnimationAction> {
        self.by_name.get(name).map(|&i| &mut self.actions[i])
    }

    pub fn actions(&self) -> impl Iterator<Item = &AnimationAction> {
        self.actions.iter()
    }

    /// Forces every action to re-resolve its tracks on the next update.
    pub fn unbind(&mut self) {
        for action in &mut self.actions {
            action.bound = false;
            action.bindings.clear();
        }
    }

    /// Advances every action and writes the blended clip pose to the rig.
    pub fn update<R>(&mut self, dt: f32, rig: &mut R, bones: &BoneBindings<R::Node>)
    where
        R: HumanoidRig + ?Sized,
    {
        let mut blend: [Option<(Quat, f32)>; HumanoidBone::COUNT] = [None; HumanoidBone::COUNT];

        for action in &mut self.actions {
            action.update(dt);

            let weight = action.effective_weight();
            if weight <= 0.0 {
                continue;
            }

            if !action.bound {
                action.bindings = Binder::bind(action.clip(), bones);
                action.bound = true;
            }

            for i in 0..action.bindings.len() {
                let binding = action.bindings[i];
                let Some(value) = action.sample_track(binding.track_index) else {
                    continue;
                };

                let slot = &mut blend[binding.bone.index()];
                *slot = Some(match *slot {
                    None => (value, weight),
                    Some((acc, acc_weight)) => {
                        let total = acc_weight + weight;
                        (acc.slerp(value, weight / total), total)
                    }
                });
            }
        }

        for &bone in HumanoidBone::ALL {
            let (Some((rotation, weight)), Some(node)) = (blend[bone.index()], bones.get(bone)) else {
                continue;
            };
            let current = rig.bone_rotation(node);
            rig.set_bone_rotation(node, current.slerp(rotation, weight.min(1.0)));
        }
    }
}

impl ClipPlayback for AnimationMixer {
    fn clip_names(&self) -> SmallVec<[String; 4]> {
        self.actions.iter().map(|a| a.clip().name.clone()).collect()
    }

    fn has_clip(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    fn play(&mut self, name: &str) {
        if let Some(action) = self.action_mut(name) {
            action.play();
        }
    }

    fn reset(&mut self, name: &str) {
        if let Some(action) = self.action_mut(name) {
            action.reset();
        }
    }

    fn set_loop(&mut self, name: &str, mode: LoopMode) {
        if let Some(action) = self.action_mut(name) {
            action.set_loop(mode);
        }
    }

    fn fade_in(&mut self, name: &str, duration: f32) {
        if let Some(action) = self.action_mut(name) {
            action.fade_in(duration);
        }
    }

    fn fade_to(&mut self, name: &str, target: f32, duration: f32) {
        if let Some(action) = self.action_mut(name) {
            action.fade_to(target, duration);
        }
    }

    fn fade_out(&mut self, name: &str, duration: f32) {
        if let Some(action) = self.action_mut(name) {
            action.fade_out(duration);
        }
    }

    fn is_running(&self, name: &str) -> bool {
        self.action(name).is_some_and(AnimationAction::is_running)
    }

    fn weight(&self, name: &str) -> f32 {
        self.action(name).map_or(0.0, AnimationAction::effective_weight)
    }
}
