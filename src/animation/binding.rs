use crate::humanoid::HumanoidBone;

/// Maps track `track_index` of a clip to a bone the rig actually has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyBinding {
    pub track_index: usize,
    pub bone: HumanoidBone,
}
