//! Error types for ragdoll construction, stepping and pose application.

use alloc::string::String;
use core::fmt;

/// Which simulated body produced a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyRef {
    Main,
    Bone(String),
    Attachment(String),
}

impl fmt::Display for BodyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyRef::Main => write!(f, "main body"),
            BodyRef::Bone(name) => write!(f, "bone '{}'", name),
            BodyRef::Attachment(name) => write!(f, "attachment '{}'", name),
        }
    }
}

/// Errors that can occur while driving a ragdoll.
///
/// None of these are fatal to the host: every path degrades to the
/// non-physics death animation.
#[derive(Debug, Clone, PartialEq)]
pub enum RagdollError {
    /// The entity has no skeletal rig to drive.
    MissingRig,
    /// The rig exists but has no bones.
    EmptyRig,
    /// A bone referenced by name or id does not exist in the rig.
    UnknownBone(String),
    /// A bone's parent must be added before the bone itself.
    ParentAfterChild { bone: String },
    /// A spawn or configuration value is NaN, infinite or out of range.
    InvalidParameter(&'static str),
    /// The entity already failed once during this death; no retries.
    AlreadyFailed,
    /// A ragdoll is already running for this entity.
    AlreadyActive,
    /// No ragdoll is registered for this entity.
    NotActive,
    /// A body's state became NaN or infinite during a step.
    NonFiniteState { body: BodyRef },
    /// The rig rejected a pose write.
    PoseFailed { target: String },
}

impl fmt::Display for RagdollError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RagdollError::MissingRig => write!(f, "entity has no skeletal rig"),
            RagdollError::EmptyRig => write!(f, "rig has no bones"),
            RagdollError::UnknownBone(name) => write!(f, "unknown bone '{}'", name),
            RagdollError::ParentAfterChild { bone } => {
                write!(f, "bone '{}' references a parent that is not defined yet", bone)
            }
            RagdollError::InvalidParameter(what) => write!(f, "invalid parameter: {}", what),
            RagdollError::AlreadyFailed => write!(f, "ragdoll already failed for this entity"),
            RagdollError::AlreadyActive => write!(f, "ragdoll already active for this entity"),
            RagdollError::NotActive => write!(f, "no ragdoll active for this entity"),
            RagdollError::NonFiniteState { body } => {
                write!(f, "{} reached a non-finite state", body)
            }
            RagdollError::PoseFailed { target } => write!(f, "rig rejected pose write to '{}'", target),
        }
    }
}
