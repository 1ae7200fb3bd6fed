//! Death ragdolls for skeletal 2D characters.
//!
//! `ragdoll` turns a dying entity's rig into a short physics sequence: one
//! rigid body carries the whole rig, every bone wobbles on top of it within
//! hierarchical limits, and weapons or hats fly off as bodies of their own.
//! The host keeps the rig; the simulation only reads it once and writes the
//! pose back each frame.
//!
//! # Features
//!
//! - **Fixed timestep**: Frame deltas are clamped and consumed in fixed steps
//! - **Bone wobble**: Depth-aware constraints, lock cascade, limb gravity correction
//! - **Detached attachments**: Independent bodies with parent-first launch order
//! - **Force shaping**: Weight classes and tiered overkill multipliers
//! - **Policy as data**: Per-entity special cases live in a [`PolicyTable`]
//! - **Observable**: Lifecycle events via the [`RagdollObserver`] trait
//! - **`no_std` compatible**: Works in embedded and WASM environments
//!
//! # Example
//!
//! ```
//! use ragdoll::{NoOpObserver, PolicyTable, RagdollConfig, RagdollRegistry, RagdollSpawn, Skeleton, Vec2};
//!
//! let mut rig = Skeleton::<f32>::new(Vec2::new(400.0, 300.0));
//! rig.add_bone("root", None, Vec2::zero(), 0.0).unwrap();
//! rig.add_bone("torso", Some("root"), Vec2::new(0.0, 40.0), 0.0).unwrap();
//! rig.add_slot("weapon-slot", "torso", "sword").unwrap();
//!
//! let mut registry = RagdollRegistry::new(PolicyTable::new(), RagdollConfig::new());
//! let spawn = RagdollSpawn::new("goblin", Vec2::new(400.0, 300.0), 0.0)
//!     .with_force(Vec2::new(600.0, 900.0))
//!     .with_overkill(20.0);
//! registry.begin(1u32, &spawn, Some(&rig), &mut NoOpObserver).unwrap();
//!
//! for _ in 0..600 {
//!     registry.step_all(1.0 / 60.0, &mut NoOpObserver);
//!     registry.apply_pose(&1, &mut rig, &mut NoOpObserver).unwrap();
//!     if registry.is_finished(&1) {
//!         break;
//!     }
//! }
//! registry.dispose(&1, &mut rig, &mut NoOpObserver).unwrap();
//! ```

#![no_std]

extern crate alloc;

pub mod float;
pub mod vec;
pub mod body;
pub mod config;
pub mod error;
pub mod rig;
pub mod force;
pub mod policy;
pub mod center;
pub mod main_body;
pub mod bone;
pub mod attachment;
pub mod observer;
pub mod ragdoll;
pub mod registry;

// Re-export primary API
pub use float::Float;
pub use vec::Vec2;
pub use body::{normalize_degrees, shortest_arc, Impact, RigidBody, Surface};
pub use config::{AttachmentConfig, Bounds, DampingTable, ForceConfig, MainBodyConfig, RagdollConfig, WobbleConfig};
pub use error::{BodyRef, RagdollError};
pub use rig::{BoneId, BoneTransform, Rig, Skeleton, SlotInfo};
pub use force::{compute_multipliers, ForceMultipliers, WeightClass};
pub use policy::{DetachOverride, EntityProfile, PolicyTable};
pub use center::resolve_center_offset;
pub use main_body::MainBody;
pub use bone::{BoneCategory, BoneWobble, FlightPhase, LockState, WobbleContext};
pub use attachment::Attachment;
pub use observer::{BodyKind, NoOpObserver, RagdollObserver};
#[cfg(feature = "log")]
pub use observer::LogObserver;
pub use ragdoll::{Ragdoll, RagdollSpawn};
pub use registry::RagdollRegistry;
