//! Center-of-mass resolution.

use crate::float::Float;
use crate::policy::EntityProfile;
use crate::rig::{BoneId, Rig};
use crate::vec::Vec2;

/// Offset from the rig's raw origin to the point the physics body should track.
///
/// Lookup order: the entity's named-bone override, then the first generic
/// anatomical name that matches a bone (exact match before substring match),
/// then zero. Without a rig the offset is zero.
pub fn resolve_center_offset<F: Float, R: Rig<F>>(rig: Option<&R>, profile: &EntityProfile) -> Vec2<F> {
    let rig = match rig {
        Some(rig) => rig,
        None => return Vec2::zero(),
    };

    let bone = profile
        .center_bone
        .as_deref()
        .and_then(|name| rig.find_bone(name))
        .or_else(|| fallback_bone(rig, &profile.center_fallbacks));

    bone.and_then(|b| rig.world_transform(b))
        .map(|t| t.position - rig.root_position())
        .unwrap_or_else(Vec2::zero)
}

fn fallback_bone<F: Float, R: Rig<F>>(rig: &R, names: &[alloc::string::String]) -> Option<BoneId> {
    let bones = || (0..rig.bone_count()).map(BoneId);
    for name in names {
        let exact = bones().find(|&b| {
            rig.bone_name(b).map_or(false, |n| n.eq_ignore_ascii_case(name))
        });
        if exact.is_some() {
            return exact;
        }
    }
    for name in names {
        let needle = name.to_ascii_lowercase();
        let partial = bones().find(|&b| {
            rig.bone_name(b)
                .map_or(false, |n| n.to_ascii_lowercase().contains(needle.as_str()))
        });
        if partial.is_some() {
            return partial;
        }
    }
    None
}
