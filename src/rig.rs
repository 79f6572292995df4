//! Rig interface and an in-memory humanoid rig.
//!
//! The skeleton and facial rig are owned by the host application (loaded by
//! its asset pipeline). The retargeting core only talks to them through
//! [`HumanoidRig`], once per tick, and never holds on to them between ticks.
//!
//! [`MemoryRig`] is a self-contained implementation backed by a slotmap of
//! bone nodes. It is what the tests and benchmarks drive, and it is a usable
//! headless target for recording retargeted motion.

use glam::{Quat, Vec3};
use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};

use crate::expression::Expression;
use crate::humanoid::HumanoidBone;

/// Rig operations consumed by the retargeting core.
pub trait HumanoidRig {
    /// Opaque node handle, resolved once per bone at ready time.
    type Node: Copy;

    /// `false` while the host is still preparing the model.
    fn is_ready(&self) -> bool;

    /// Node for a semantic bone, if the rig has one.
    fn find_bone(&self, bone: HumanoidBone) -> Option<Self::Node>;

    fn bone_rotation(&self, node: Self::Node) -> Quat;

    fn set_bone_rotation(&mut self, node: Self::Node, rotation: Quat);

    /// Current weight of an expression; 0 for expressions the rig lacks.
    fn expression(&self, expression: Expression) -> f32;

    /// Sets an expression weight. Expressions the rig lacks are ignored.
    fn set_expression(&mut self, expression: Expression, weight: f32);

    /// Points the rig's look-at mechanism at the core's gaze target.
    /// Called exactly once, when the rig becomes live.
    fn attach_look_at(&mut self);

    /// Moves the gaze target (viewer space).
    fn set_look_at_target(&mut self, position: Vec3);

    /// Finalizes the frame. Called exactly once per tick, after every write.
    fn advance(&mut self, dt: f32);
}

// ============================================================================
// MemoryRig
// ============================================================================

new_key_type! {
    pub struct BoneKey;
}

#[derive(Debug, Clone)]
pub struct BoneNode {
    pub name: String,
    pub rotation: Quat,
    /// Number of rotation writes since creation.
    pub writes: u32,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryRig {
    nodes: SlotMap<BoneKey, BoneNode>,
    by_name: FxHashMap<String, BoneKey>,
    expressions: FxHashMap<Expression, f32>,
    look_at_attached: u32,
    look_at_target: Option<Vec3>,
    /// Expression weight writes, including writes to absent expressions.
    pub expression_writes: u64,
    /// Gaze target writes.
    pub look_at_writes: u64,
    ready: bool,
    /// Number of `advance` calls.
    pub frames: u64,
    /// Sum of all `advance` deltas.
    pub elapsed: f32,
}

impl MemoryRig {
    /// A rig with no bones and no expressions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A rig carrying every humanoid bone and every expression, already ready.
    #[must_use]
    pub fn humanoid() -> Self {
        Self::with_bones(HumanoidBone::ALL)
    }

    /// A ready rig carrying only `bones` (plus every expression).
    #[must_use]
    pub fn with_bones(bones: &[HumanoidBone]) -> Self {
        let mut rig = Self::new();
        for bone in bones {
            rig.add_bone(bone.name());
        }
        for &expression in Expression::ALL {
            rig.add_expression(expression);
        }
        rig.ready = true;
        rig
    }

    pub fn add_bone(&mut self, name: &str) -> BoneKey {
        if let Some(&key) = self.by_name.get(name) {
            return key;
        }
        let key = self.nodes.insert(BoneNode {
            name: name.to_string(),
            rotation: Quat::IDENTITY,
            writes: 0,
        });
        self.by_name.insert(name.to_string(), key);
        key
    }

    pub fn add_expression(&mut self, expression: Expression) {
        self.expressions.entry(expression).or_insert(0.0);
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    #[must_use]
    pub fn node(&self, key: BoneKey) -> Option<&BoneNode> {
        self.nodes.get(key)
    }

    #[must_use]
    pub fn bone(&self, bone: HumanoidBone) -> Option<&BoneNode> {
        self.by_name.get(bone.name()).and_then(|&key| self.nodes.get(key))
    }

    /// Rotation of a semantic bone; `None` when the rig lacks it.
    #[must_use]
    pub fn rotation_of(&self, bone: HumanoidBone) -> Option<Quat> {
        self.bone(bone).map(|node| node.rotation)
    }

    /// Rotation writes a semantic bone has received.
    #[must_use]
    pub fn writes_to(&self, bone: HumanoidBone) -> u32 {
        self.bone(bone).map_or(0, |node| node.writes)
    }

    /// Rotation writes across all bones.
    #[must_use]
    pub fn total_writes(&self) -> u64 {
        self.nodes.values().map(|node| u64::from(node.writes)).sum()
    }

    #[must_use]
    pub fn look_at_target(&self) -> Option<Vec3> {
        self.look_at_target
    }

    /// How many times the look-at mechanism was attached.
    #[must_use]
    pub fn look_at_attach_count(&self) -> u32 {
        self.look_at_attached
    }
}

impl HumanoidRig for MemoryRig {
    type Node = BoneKey;

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn find_bone(&self, bone: HumanoidBone) -> Option<BoneKey> {
        self.by_name.get(bone.name()).copied()
    }

    fn bone_rotation(&self, node: BoneKey) -> Quat {
        self.nodes.get(node).map_or(Quat::IDENTITY, |n| n.rotation)
    }

    fn set_bone_rotation(&mut self, node: BoneKey, rotation: Quat) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.rotation = rotation;
            n.writes += 1;
        }
    }

    fn expression(&self, expression: Expression) -> f32 {
        self.expressions.get(&expression).copied().unwrap_or(0.0)
    }

    fn set_expression(&mut self, expression: Expression, weight: f32) {
        self.expression_writes += 1;
        if let Some(w) = self.expressions.get_mut(&expression) {
            *w = weight;
        }
    }

    fn attach_look_at(&mut self) {
        self.look_at_attached += 1;
        self.look_at_target.get_or_insert(Vec3::ZERO);
    }

    fn set_look_at_target(&mut self, position: Vec3) {
        self.look_at_writes += 1;
        self.look_at_target = Some(position);
    }

    fn advance(&mut self, dt: f32) {
        self.frames += 1;
        self.elapsed += dt;
    }
}
