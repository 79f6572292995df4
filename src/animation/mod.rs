//! Clip playback.
//!
//! Bone-rotation keyframe clips, per-clip playback state with timed fades,
//! and a mixer that blends running clips onto a humanoid rig.

pub mod action;
pub mod binder;
pub mod binding;
pub mod clip;
pub mod mixer;
pub mod tracks;
pub mod values;

pub use action::{AnimationAction, LoopMode};
pub use binder::Binder;
pub use binding::PropertyBinding;
pub use clip::{AnimationClip, Track};
pub use mixer::AnimationMixer;
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::Interpolatable;
