#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Real-time motion retargeting from perception landmarks onto a humanoid rig.
//!
//! Data flows one way:
//!
//! ```text
//! HolisticResults ─▶ LandmarkSink ─▶ PoseMailbox ─▶ AvatarDriver::tick ─▶ HumanoidRig
//!   (perception)      (solve)         (latest wins)   (smooth, crossfade)
//! ```

pub mod animation;
pub mod crossfade;
pub mod driver;
pub mod errors;
pub mod expression;
pub mod humanoid;
pub mod landmarks;
pub mod look_at;
pub mod mailbox;
pub mod pose;
pub mod retarget;
pub mod rig;
pub mod settings;
pub mod solver;

pub use animation::{AnimationAction, AnimationClip, AnimationMixer, Binder, LoopMode};
pub use crossfade::{AnimationCrossfadeController, ClipPlayback, ClipSelection, CrossfadeState};
pub use driver::{AvatarDriver, FrameInput};
pub use errors::{Result, RetargetError};
pub use expression::{Expression, ExpressionBlender};
pub use humanoid::{BoneBindings, HumanoidBone};
pub use landmarks::{HolisticResults, Landmark};
pub use look_at::LookAtController;
pub use mailbox::PoseMailbox;
pub use pose::{PoseSnapshot, Side};
pub use retarget::SkeletonRetargeter;
pub use rig::{HumanoidRig, MemoryRig};
pub use settings::RetargetSettings;
pub use solver::{GeometricSolver, HolisticSolver, LandmarkSink, LandmarkSolver};
