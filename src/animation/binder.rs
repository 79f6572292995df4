use crate::animation::binding::PropertyBinding;
use crate::animation::clip::AnimationClip;
use crate::humanoid::BoneBindings;

pub struct Binder;

impl Binder {
    /// Binds every track whose bone resolved on the rig. Tracks for missing
    /// bones are dropped here so playback never looks them up again.
    pub fn bind<N: Copy>(clip: &AnimationClip, bones: &BoneBindings<N>) -> Vec<PropertyBinding> {
        let bindings: Vec<_> = clip
            .tracks
            .iter()
            .enumerate()
            .filter(|(_, track)| bones.contains(track.bone) && !track.rotation.is_empty())
            .map(|(track_index, track)| PropertyBinding {
                track_index,
                bone: track.bone,
            })
            .collect();

        if bindings.len() < clip.tracks.len() {
            log::debug!(
                "Clip '{}': bound {} of {} tracks",
                clip.name,
                bindings.len(),
                clip.tracks.len()
            );
        }
        bindings
    }
}
