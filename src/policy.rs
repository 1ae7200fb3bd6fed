//! Per-entity policy tables.
//!
//! Hosts describe special cases as data keyed by entity type. The core never
//! branches on entity names: [`PolicyTable::profile`] resolves one
//! [`EntityProfile`] at construction and the simulation consults its flags.

use crate::force::WeightClass;
use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::{String, ToString};
use alloc::vec::Vec as AllocVec;

/// Adjustments to the global detach keywords for one entity type.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DetachOverride {
    /// Extra keywords that detach on this entity.
    pub add: AllocVec<String>,
    /// Global keywords that stay attached on this entity.
    pub remove: AllocVec<String>,
    /// Nothing detaches on this entity.
    pub disabled: bool,
}

/// Session-wide policy data, keyed by entity type.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PolicyTable {
    pub default_weight: WeightClass,
    pub weights: BTreeMap<String, WeightClass>,
    pub zero_gravity: BTreeSet<String>,
    /// Free-rotation entities, each with the bones that stay constrained anyway.
    pub free_rotation: BTreeMap<String, AllocVec<String>>,
    /// Bone used as the center of mass, per entity.
    pub center_bones: BTreeMap<String, String>,
    /// Anatomical names tried in order when no override exists.
    pub center_fallbacks: AllocVec<String>,
    /// Attachment names containing any of these detach into their own body.
    pub detach_keywords: AllocVec<String>,
    pub detach_overrides: BTreeMap<String, DetachOverride>,
    /// Per entity: child attachment name -> parent attachment name.
    pub attachment_parents: BTreeMap<String, BTreeMap<String, String>>,
    /// Added to the host's ground level, per entity.
    pub ground_offsets: BTreeMap<String, f32>,
    /// Bone names containing any of these are anatomical limbs.
    pub limb_keywords: AllocVec<String>,
}

fn strings(items: &[&str]) -> AllocVec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn contains_any(name: &str, keywords: &[String]) -> bool {
    let lower = name.to_ascii_lowercase();
    keywords.iter().any(|k| lower.contains(k.to_ascii_lowercase().as_str()))
}

impl PolicyTable {
    /// Empty per-entity tables with the generic keyword lists filled in.
    pub fn new() -> Self {
        PolicyTable {
            default_weight: WeightClass::Medium,
            weights: BTreeMap::new(),
            zero_gravity: BTreeSet::new(),
            free_rotation: BTreeMap::new(),
            center_bones: BTreeMap::new(),
            center_fallbacks: strings(&["torso", "body", "chest", "spine", "pelvis", "hip"]),
            detach_keywords: strings(&[
                "weapon", "sword", "blade", "dagger", "axe", "spear", "staff", "wand", "bow",
                "shield", "helmet", "hat", "crown", "mask",
            ]),
            detach_overrides: BTreeMap::new(),
            attachment_parents: BTreeMap::new(),
            ground_offsets: BTreeMap::new(),
            limb_keywords: strings(&["arm", "leg", "hand", "foot", "thigh", "shin", "calf"]),
        }
    }

    pub fn with_weight(mut self, entity: &str, weight: WeightClass) -> Self {
        self.weights.insert(entity.to_string(), weight);
        self
    }

    pub fn with_zero_gravity(mut self, entity: &str) -> Self {
        self.zero_gravity.insert(entity.to_string());
        self
    }

    /// Let every bone of `entity` spin freely except the listed ones.
    pub fn with_free_rotation(mut self, entity: &str, constrained_bones: &[&str]) -> Self {
        self.free_rotation.insert(entity.to_string(), strings(constrained_bones));
        self
    }

    pub fn with_center_bone(mut self, entity: &str, bone: &str) -> Self {
        self.center_bones.insert(entity.to_string(), bone.to_string());
        self
    }

    pub fn with_detach_keyword(mut self, keyword: &str) -> Self {
        self.detach_keywords.push(keyword.to_string());
        self
    }

    pub fn with_detach_override(mut self, entity: &str, rule: DetachOverride) -> Self {
        self.detach_overrides.insert(entity.to_string(), rule);
        self
    }

    /// Link `child` to `parent` when both detach from `entity`.
    pub fn with_attachment_parent(mut self, entity: &str, child: &str, parent: &str) -> Self {
        self.attachment_parents
            .entry(entity.to_string())
            .or_default()
            .insert(child.to_string(), parent.to_string());
        self
    }

    pub fn with_ground_offset(mut self, entity: &str, offset: f32) -> Self {
        self.ground_offsets.insert(entity.to_string(), offset);
        self
    }

    /// Resolve every table for one entity type.
    pub fn profile(&self, entity: &str) -> EntityProfile {
        let detach_keywords = match self.detach_overrides.get(entity) {
            Some(rule) if rule.disabled => AllocVec::new(),
            Some(rule) => self
                .detach_keywords
                .iter()
                .filter(|k| !rule.remove.iter().any(|r| r.eq_ignore_ascii_case(k)))
                .chain(rule.add.iter())
                .cloned()
                .collect(),
            None => self.detach_keywords.clone(),
        };

        EntityProfile {
            entity_type: entity.to_string(),
            weight: self.weights.get(entity).copied().unwrap_or(self.default_weight),
            zero_gravity: self.zero_gravity.contains(entity),
            free_rotation: self.free_rotation.contains_key(entity),
            constrained_bones: self.free_rotation.get(entity).cloned().unwrap_or_default(),
            center_bone: self.center_bones.get(entity).cloned(),
            center_fallbacks: self.center_fallbacks.clone(),
            detach_keywords,
            attachment_parents: self.attachment_parents.get(entity).cloned().unwrap_or_default(),
            ground_offset: self.ground_offsets.get(entity).copied().unwrap_or(0.0),
            limb_keywords: self.limb_keywords.clone(),
        }
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the simulation needs to know about one entity type.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityProfile {
    pub entity_type: String,
    pub weight: WeightClass,
    pub zero_gravity: bool,
    pub free_rotation: bool,
    pub constrained_bones: AllocVec<String>,
    pub center_bone: Option<String>,
    pub center_fallbacks: AllocVec<String>,
    pub detach_keywords: AllocVec<String>,
    pub attachment_parents: BTreeMap<String, String>,
    pub ground_offset: f32,
    pub limb_keywords: AllocVec<String>,
}

impl EntityProfile {
    pub fn is_detachable(&self, attachment: &str) -> bool {
        contains_any(attachment, &self.detach_keywords)
    }

    /// Whether hierarchical and limb constraints apply to `bone`.
    pub fn is_constrained(&self, bone: &str) -> bool {
        !self.free_rotation || self.constrained_bones.iter().any(|b| b == bone)
    }

    pub fn is_limb(&self, bone: &str) -> bool {
        contains_any(bone, &self.limb_keywords)
    }

    pub fn attachment_parent(&self, attachment: &str) -> Option<&str> {
        self.attachment_parents.get(attachment).map(|p| p.as_str())
    }
}
