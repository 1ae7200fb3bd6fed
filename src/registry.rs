//! Session-scoped ownership of every running ragdoll.
//!
//! One registry lives for a combat session. It owns the active ragdolls and
//! remembers which entities failed, so a failed entity is never retried for
//! the rest of its death.

use crate::config::RagdollConfig;
use crate::error::RagdollError;
use crate::float::Float;
use crate::observer::RagdollObserver;
use crate::policy::PolicyTable;
use crate::ragdoll::{Ragdoll, RagdollSpawn};
use crate::rig::Rig;
use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec as AllocVec;

/// Active ragdolls and failed entities, keyed by a host entity handle.
pub struct RagdollRegistry<K: Ord + Clone, F: Float> {
    policy: PolicyTable,
    config: RagdollConfig<F>,
    active: BTreeMap<K, Ragdoll<F>>,
    failed: BTreeSet<K>,
}

impl<K: Ord + Clone, F: Float> RagdollRegistry<K, F> {
    pub fn new(policy: PolicyTable, config: RagdollConfig<F>) -> Self {
        RagdollRegistry {
            policy,
            config,
            active: BTreeMap::new(),
            failed: BTreeSet::new(),
        }
    }

    /// Start a ragdoll for `key`.
    ///
    /// On failure the key is marked failed and the host should play the plain
    /// death animation. Later attempts for the same key return
    /// [`RagdollError::AlreadyFailed`] until it is revived or the session clears.
    pub fn begin<R: Rig<F>, O: RagdollObserver<F>>(
        &mut self,
        key: K,
        spawn: &RagdollSpawn<F>,
        rig: Option<&R>,
        observer: &mut O,
    ) -> Result<&Ragdoll<F>, RagdollError> {
        if self.failed.contains(&key) {
            return Err(RagdollError::AlreadyFailed);
        }
        if self.active.contains_key(&key) {
            return Err(RagdollError::AlreadyActive);
        }
        match Ragdoll::new(spawn, rig, &self.policy, self.config.clone(), observer) {
            Ok(ragdoll) => Ok(self.active.entry(key).or_insert(ragdoll)),
            Err(e) => {
                observer.on_failed(&spawn.entity_type, &e);
                self.failed.insert(key);
                Err(e)
            }
        }
    }

    /// Step one ragdoll. A stepping fault discards it and marks the key failed.
    pub fn step<O: RagdollObserver<F>>(&mut self, key: &K, dt: F, observer: &mut O) -> Result<usize, RagdollError> {
        let ragdoll = self.active.get_mut(key).ok_or(RagdollError::NotActive)?;
        match ragdoll.step(dt, observer) {
            Ok(steps) => Ok(steps),
            Err(e) => {
                observer.on_failed(ragdoll.entity_type(), &e);
                self.active.remove(key);
                self.failed.insert(key.clone());
                Err(e)
            }
        }
    }

    /// Step every active ragdoll. Returns the keys discarded this frame.
    pub fn step_all<O: RagdollObserver<F>>(&mut self, dt: F, observer: &mut O) -> AllocVec<K> {
        let mut discarded = AllocVec::new();
        for (key, ragdoll) in self.active.iter_mut() {
            if let Err(e) = ragdoll.step(dt, observer) {
                observer.on_failed(ragdoll.entity_type(), &e);
                discarded.push(key.clone());
            }
        }
        for key in &discarded {
            self.active.remove(key);
            self.failed.insert(key.clone());
        }
        discarded
    }

    /// Pose the rig for `key`. A render failure is reported but leaves the
    /// physics running; only this frame's visual falls back.
    pub fn apply_pose<R: Rig<F>, O: RagdollObserver<F>>(
        &self,
        key: &K,
        rig: &mut R,
        observer: &mut O,
    ) -> Result<(), RagdollError> {
        let ragdoll = self.active.get(key).ok_or(RagdollError::NotActive)?;
        ragdoll.apply_pose(rig).map_err(|e| {
            observer.on_failed(ragdoll.entity_type(), &e);
            e
        })
    }

    /// Finish the death for `key` and restore its rig.
    pub fn dispose<R: Rig<F>, O: RagdollObserver<F>>(
        &mut self,
        key: &K,
        rig: &mut R,
        observer: &mut O,
    ) -> Result<(), RagdollError> {
        let ragdoll = self.active.remove(key).ok_or(RagdollError::NotActive)?;
        ragdoll.dispose(rig, observer)
    }

    /// The entity came back to life: abandon its ragdoll immediately and
    /// forget any earlier failure.
    pub fn revive<R: Rig<F>, O: RagdollObserver<F>>(
        &mut self,
        key: &K,
        rig: &mut R,
        observer: &mut O,
    ) -> Result<(), RagdollError> {
        self.failed.remove(key);
        match self.active.remove(key) {
            Some(ragdoll) => ragdoll.dispose(rig, observer),
            None => {
                rig.set_to_setup_pose();
                Ok(())
            }
        }
    }

    pub fn get(&self, key: &K) -> Option<&Ragdoll<F>> {
        self.active.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut Ragdoll<F>> {
        self.active.get_mut(key)
    }

    pub fn has_settled(&self, key: &K) -> bool {
        self.active.get(key).map_or(false, |r| r.has_settled())
    }

    /// Settled or timed out. Failed and unknown keys count as finished so the
    /// host never waits on a ragdoll that does not exist.
    pub fn is_finished(&self, key: &K) -> bool {
        self.active.get(key).map_or(true, |r| r.is_finished())
    }

    pub fn is_failed(&self, key: &K) -> bool {
        self.failed.contains(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.active.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.active.keys()
    }

    /// End of the combat session: drop every ragdoll and failure mark.
    ///
    /// Rigs are not touched; dispose ragdolls first if their rigs outlive the session.
    pub fn clear(&mut self) {
        self.active.clear();
        self.failed.clear();
    }

    pub fn policy(&self) -> &PolicyTable {
        &self.policy
    }

    pub fn config(&self) -> &RagdollConfig<F> {
        &self.config
    }
}
