//! Skeletal rig adapter.
//!
//! The simulation never owns the host's rig. It reads bone facts once at
//! construction, refers to bones by [`BoneId`] afterwards, and writes the pose
//! back through [`Rig`] each frame. [`Skeleton`] is a small in-memory rig for
//! hosts without their own, and for tests.

use crate::error::RagdollError;
use crate::float::Float;
use crate::vec::Vec2;
use alloc::string::{String, ToString};
use alloc::vec::Vec as AllocVec;

/// Index of a bone in its rig. Parents always have a lower index than their children.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoneId(pub usize);

/// World-space transform of a bone.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoneTransform<F: Float> {
    pub position: Vec2<F>,
    /// Degrees, counter-clockwise.
    pub rotation: F,
    pub scale: Vec2<F>,
}

/// An attachment bound to a bone through a named slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotInfo {
    pub slot: String,
    pub attachment: String,
    pub bone: BoneId,
}

/// Typed access to a host skeleton.
///
/// Bone ids must be dense (`0..bone_count()`) and ordered parent-first.
pub trait Rig<F: Float> {
    fn bone_count(&self) -> usize;
    fn bone_name(&self, bone: BoneId) -> Option<&str>;
    fn bone_parent(&self, bone: BoneId) -> Option<BoneId>;
    /// Local rotation of the bone in the rest (setup) pose.
    fn setup_rotation(&self, bone: BoneId) -> Option<F>;
    fn set_bone_rotation(&mut self, bone: BoneId, rotation: F) -> Result<(), RagdollError>;
    fn world_transform(&self, bone: BoneId) -> Option<BoneTransform<F>>;
    fn root_position(&self) -> Vec2<F>;
    fn root_rotation(&self) -> F;
    fn set_root_transform(&mut self, position: Vec2<F>, rotation: F);
    /// Every slot with its bound attachment.
    fn slots(&self) -> AllocVec<SlotInfo>;
    fn set_slot_visible(&mut self, slot: &str, visible: bool) -> Result<(), RagdollError>;
    /// Restore every bone and the root to the rest pose.
    fn set_to_setup_pose(&mut self);

    fn find_bone(&self, name: &str) -> Option<BoneId> {
        (0..self.bone_count())
            .map(BoneId)
            .find(|&b| self.bone_name(b) == Some(name))
    }

    fn has_children(&self, bone: BoneId) -> bool {
        (0..self.bone_count())
            .map(BoneId)
            .any(|b| self.bone_parent(b) == Some(bone))
    }

    /// Number of ancestors between `bone` and the rig root.
    fn chain_depth(&self, bone: BoneId) -> usize {
        let mut depth = 0;
        let mut current = self.bone_parent(bone);
        // bounded by bone_count in case a host rig reports a cycle
        while let Some(parent) = current {
            depth += 1;
            if depth >= self.bone_count() {
                break;
            }
            current = self.bone_parent(parent);
        }
        depth
    }

    fn has_attachment(&self, bone: BoneId) -> bool {
        self.slots().iter().any(|s| s.bone == bone)
    }
}

#[derive(Clone, Debug)]
struct SkeletonBone<F: Float> {
    name: String,
    parent: Option<BoneId>,
    local_position: Vec2<F>,
    setup_rotation: F,
    rotation: F,
}

#[derive(Clone, Debug)]
struct SkeletonSlot {
    name: String,
    bone: BoneId,
    attachment: String,
    visible: bool,
}

/// In-memory rig with simple forward kinematics.
#[derive(Clone, Debug)]
pub struct Skeleton<F: Float> {
    bones: AllocVec<SkeletonBone<F>>,
    slots: AllocVec<SkeletonSlot>,
    root_position: Vec2<F>,
    root_rotation: F,
    setup_position: Vec2<F>,
    setup_root_rotation: F,
}

impl<F: Float> Skeleton<F> {
    pub fn new(root_position: Vec2<F>) -> Self {
        Skeleton {
            bones: AllocVec::new(),
            slots: AllocVec::new(),
            root_position,
            root_rotation: F::zero(),
            setup_position: root_position,
            setup_root_rotation: F::zero(),
        }
    }

    /// Rest-pose rotation of the root, in degrees.
    pub fn with_root_rotation(mut self, rotation: F) -> Self {
        self.root_rotation = rotation;
        self.setup_root_rotation = rotation;
        self
    }

    /// Add a bone. The parent, if any, must already exist.
    pub fn add_bone(
        &mut self,
        name: &str,
        parent: Option<&str>,
        local_position: Vec2<F>,
        rotation: F,
    ) -> Result<BoneId, RagdollError> {
        let parent = match parent {
            Some(p) => Some(self.find_bone(p).ok_or_else(|| RagdollError::ParentAfterChild {
                bone: name.to_string(),
            })?),
            None => None,
        };
        let id = BoneId(self.bones.len());
        self.bones.push(SkeletonBone {
            name: name.to_string(),
            parent,
            local_position,
            setup_rotation: rotation,
            rotation,
        });
        Ok(id)
    }

    /// Bind `attachment` to `bone` through a new slot named `slot`.
    pub fn add_slot(&mut self, slot: &str, bone: &str, attachment: &str) -> Result<(), RagdollError> {
        let bone = self
            .find_bone(bone)
            .ok_or_else(|| RagdollError::UnknownBone(bone.to_string()))?;
        self.slots.push(SkeletonSlot {
            name: slot.to_string(),
            bone,
            attachment: attachment.to_string(),
            visible: true,
        });
        Ok(())
    }

    /// Current local rotation of a bone.
    pub fn bone_rotation(&self, bone: BoneId) -> Option<F> {
        self.bones.get(bone.0).map(|b| b.rotation)
    }

    pub fn is_slot_visible(&self, slot: &str) -> Option<bool> {
        self.slots.iter().find(|s| s.name == slot).map(|s| s.visible)
    }
}

impl<F: Float> Rig<F> for Skeleton<F> {
    fn bone_count(&self) -> usize {
        self.bones.len()
    }

    fn bone_name(&self, bone: BoneId) -> Option<&str> {
        self.bones.get(bone.0).map(|b| b.name.as_str())
    }

    fn bone_parent(&self, bone: BoneId) -> Option<BoneId> {
        self.bones.get(bone.0).and_then(|b| b.parent)
    }

    fn setup_rotation(&self, bone: BoneId) -> Option<F> {
        self.bones.get(bone.0).map(|b| b.setup_rotation)
    }

    fn set_bone_rotation(&mut self, bone: BoneId, rotation: F) -> Result<(), RagdollError> {
        match self.bones.get_mut(bone.0) {
            Some(b) => {
                b.rotation = rotation;
                Ok(())
            }
            None => Err(RagdollError::PoseFailed { target: bone.0.to_string() }),
        }
    }

    fn world_transform(&self, bone: BoneId) -> Option<BoneTransform<F>> {
        let b = self.bones.get(bone.0)?;
        let (parent_pos, parent_rot) = match b.parent {
            Some(p) => {
                let t = self.world_transform(p)?;
                (t.position, t.rotation)
            }
            None => (self.root_position, self.root_rotation),
        };
        Some(BoneTransform {
            position: parent_pos + b.local_position.rotate_degrees(parent_rot),
            rotation: parent_rot + b.rotation,
            scale: Vec2::new(F::one(), F::one()),
        })
    }

    fn root_position(&self) -> Vec2<F> {
        self.root_position
    }

    fn root_rotation(&self) -> F {
        self.root_rotation
    }

    fn set_root_transform(&mut self, position: Vec2<F>, rotation: F) {
        self.root_position = position;
        self.root_rotation = rotation;
    }

    fn slots(&self) -> AllocVec<SlotInfo> {
        self.slots
            .iter()
            .map(|s| SlotInfo {
                slot: s.name.clone(),
                attachment: s.attachment.clone(),
                bone: s.bone,
            })
            .collect()
    }

    fn set_slot_visible(&mut self, slot: &str, visible: bool) -> Result<(), RagdollError> {
        match self.slots.iter_mut().find(|s| s.name == slot) {
            Some(s) => {
                s.visible = visible;
                Ok(())
            }
            None => Err(RagdollError::PoseFailed { target: slot.to_string() }),
        }
    }

    fn set_to_setup_pose(&mut self) {
        for b in self.bones.iter_mut() {
            b.rotation = b.setup_rotation;
        }
        self.root_position = self.setup_position;
        self.root_rotation = self.setup_root_rotation;
    }
}
