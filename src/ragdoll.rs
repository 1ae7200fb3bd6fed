//! The ragdoll aggregate: one main body, one wobble per bone, one body per
//! detached attachment, advanced together on a fixed timestep.

use crate::attachment::Attachment;
use crate::bone::{BoneWobble, WobbleContext};
use crate::center::resolve_center_offset;
use crate::config::RagdollConfig;
use crate::error::{BodyRef, RagdollError};
use crate::float::Float;
use crate::force::{compute_multipliers, ForceMultipliers};
use crate::main_body::MainBody;
use crate::observer::{BodyKind, RagdollObserver};
use crate::policy::{EntityProfile, PolicyTable};
use crate::rig::{BoneId, Rig, SlotInfo};
use crate::vec::Vec2;
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec as AllocVec;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Everything the host knows about an entity at the moment it dies.
#[derive(Clone, Debug, PartialEq)]
pub struct RagdollSpawn<F: Float> {
    pub entity_type: String,
    /// Rig root position at death.
    pub position: Vec2<F>,
    /// Host ground level before the entity's policy offset.
    pub ground_y: F,
    /// Killing blow, in host force units.
    pub force: Vec2<F>,
    pub overkill: F,
    /// Host clock at death, in seconds.
    pub created_at: F,
    pub seed: u64,
}

impl<F: Float> RagdollSpawn<F> {
    pub fn new(entity_type: &str, position: Vec2<F>, ground_y: F) -> Self {
        RagdollSpawn {
            entity_type: entity_type.to_string(),
            position,
            ground_y,
            force: Vec2::zero(),
            overkill: F::zero(),
            created_at: F::zero(),
            seed: 0,
        }
    }

    pub fn with_force(mut self, force: Vec2<F>) -> Self {
        self.force = force;
        self
    }

    pub fn with_overkill(mut self, overkill: F) -> Self {
        self.overkill = overkill;
        self
    }

    pub fn with_created_at(mut self, created_at: F) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn validate(&self) -> Result<(), RagdollError> {
        if !self.position.is_finite() {
            return Err(RagdollError::InvalidParameter("spawn position"));
        }
        if !self.ground_y.is_finite() {
            return Err(RagdollError::InvalidParameter("ground level"));
        }
        if !self.force.is_finite() {
            return Err(RagdollError::InvalidParameter("initial force"));
        }
        if !self.overkill.is_finite() {
            return Err(RagdollError::InvalidParameter("overkill"));
        }
        Ok(())
    }
}

/// A running death ragdoll.
#[derive(Debug)]
pub struct Ragdoll<F: Float> {
    profile: EntityProfile,
    config: RagdollConfig<F>,
    main: MainBody<F>,
    bones: BTreeMap<BoneId, BoneWobble<F>>,
    attachments: BTreeMap<String, Attachment<F>>,
    attachment_order: AllocVec<String>,
    multipliers: ForceMultipliers<F>,
    center_offset: Vec2<F>,
    ground_y: F,
    accumulator: F,
    created_at: F,
    age: F,
    settled_reported: bool,
    timeout_reported: bool,
    rng: Pcg32,
}

impl<F: Float> Ragdoll<F> {
    /// Build a ragdoll for a dying entity.
    ///
    /// Fails without a rig or with an empty one; the host should then play
    /// its plain death animation.
    pub fn new<R: Rig<F>, O: RagdollObserver<F>>(
        spawn: &RagdollSpawn<F>,
        rig: Option<&R>,
        policy: &PolicyTable,
        config: RagdollConfig<F>,
        observer: &mut O,
    ) -> Result<Self, RagdollError> {
        spawn.validate()?;
        if !(config.fixed_dt > F::zero()) {
            return Err(RagdollError::InvalidParameter("fixed_dt"));
        }
        let rig = rig.ok_or(RagdollError::MissingRig)?;
        if rig.bone_count() == 0 {
            return Err(RagdollError::EmptyRig);
        }

        let profile = policy.profile(&spawn.entity_type);
        let mut rng = Pcg32::seed_from_u64(spawn.seed);
        let ground_y = spawn.ground_y + F::from_f32(profile.ground_offset);
        let multipliers = compute_multipliers(profile.weight, spawn.overkill, &config.force);
        let center_offset = resolve_center_offset(Some(rig), &profile);

        let mut main = MainBody::new(spawn.position + center_offset, ground_y, config.main_body.clone())
            .with_rotation(rig.root_rotation());
        main.set_zero_gravity(profile.zero_gravity);
        let impulse = multipliers.scale_linear(spawn.force.scale(config.force.impulse_scale));
        let spin = F::from_f32(rng.gen_range(-1.0f32..1.0)) * config.initial_spin * multipliers.angular;
        main.apply_impulse(impulse, spin);

        let mut bones = BTreeMap::new();
        for id in (0..rig.bone_count()).map(BoneId) {
            let mut wobble = BoneWobble::new(rig, id, &profile, &config.wobble)?;
            wobble.kick(multipliers.angular, &config.wobble, &mut rng);
            bones.insert(id, wobble);
        }

        let (attachments, attachment_order) =
            build_attachments(rig, &profile, &config, impulse, &multipliers, &mut rng)?;

        observer.on_created(&profile.entity_type, bones.len(), attachments.len());

        Ok(Ragdoll {
            profile,
            main,
            bones,
            attachments,
            attachment_order,
            multipliers,
            center_offset,
            ground_y,
            accumulator: F::zero(),
            created_at: spawn.created_at,
            age: F::zero(),
            settled_reported: false,
            timeout_reported: false,
            rng,
            config,
        })
    }

    /// Advance by a frame's wall-clock delta.
    ///
    /// The delta is clamped to `max_frame_dt` and consumed in `fixed_dt`
    /// steps, at most `max_steps` per call. Time left over after the cap is
    /// dropped. Returns the number of fixed steps taken.
    pub fn step<O: RagdollObserver<F>>(&mut self, dt: F, observer: &mut O) -> Result<usize, RagdollError> {
        if !dt.is_finite() {
            return Err(RagdollError::InvalidParameter("frame delta"));
        }
        let fixed = self.config.fixed_dt;
        self.accumulator = self.accumulator + dt.clamp(F::zero(), self.config.max_frame_dt);

        let mut steps = 0;
        while self.accumulator >= fixed && steps < self.config.max_steps {
            self.fixed_step(fixed, observer)?;
            self.accumulator = self.accumulator - fixed;
            steps += 1;
        }
        if self.accumulator >= fixed {
            self.accumulator = F::zero();
        }

        if !self.settled_reported && self.has_settled() {
            self.settled_reported = true;
            observer.on_settled(&self.profile.entity_type, self.age);
        }
        if !self.timeout_reported && !self.has_settled() && self.is_timed_out() {
            self.timeout_reported = true;
            observer.on_timeout(&self.profile.entity_type, self.age);
        }
        Ok(steps)
    }

    fn fixed_step<O: RagdollObserver<F>>(&mut self, dt: F, observer: &mut O) -> Result<(), RagdollError> {
        self.age = self.age + dt;
        let entity = self.profile.entity_type.as_str();

        let impact = self.main.step(dt, &self.config.bounds, &mut self.rng);
        self.main.apply_rotation_limiting(dt);
        if !self.main.body.is_finite() {
            return Err(RagdollError::NonFiniteState { body: BodyRef::Main });
        }
        if let Some(impact) = impact {
            observer.on_collision(entity, BodyKind::Main, &impact);
        }

        let body_settled = self.main.has_settled();
        let ctx = WobbleContext {
            parent_velocity: self.main.body.vel,
            parent_settled: body_settled,
            ground_contacted: self.main.touched_ground(),
            on_ground: self.main.on_ground(),
            body_moving: self.main.momentum() >= self.main.config().settle_momentum,
            body_resting: self.main.is_resting(),
            body_settled,
            flight_time: self.age,
            resting_time: self.main.resting_time(),
            body_rotation: self.main.body.rotation,
        };

        let siblings: BTreeMap<BoneId, F> = self.bones.iter().map(|(id, b)| (*id, b.rotation())).collect();
        let mut locked: BTreeMap<BoneId, bool> = BTreeMap::new();
        for (id, bone) in self.bones.iter_mut() {
            // parents precede children in rig order, so their lock state is already current
            let parent_settled = match bone.parent() {
                Some(parent) => locked.get(&parent).copied().unwrap_or(body_settled),
                None => body_settled,
            };
            bone.update(dt, &WobbleContext { parent_settled, ..ctx }, &siblings, &self.config.wobble);
            if !bone.is_finite() {
                return Err(RagdollError::NonFiniteState { body: BodyRef::Bone(bone.name().to_string()) });
            }
            locked.insert(*id, bone.is_locked());
        }

        let zero_gravity = self.main.zero_gravity();
        for name in &self.attachment_order {
            if let Some(a) = self.attachments.get_mut(name) {
                let impact = a.update(
                    dt,
                    zero_gravity,
                    self.ground_y,
                    &self.config.bounds,
                    &self.config.attachment,
                    &mut self.rng,
                );
                if !a.body.is_finite() {
                    return Err(RagdollError::NonFiniteState { body: BodyRef::Attachment(name.clone()) });
                }
                if let Some(impact) = impact {
                    observer.on_collision(entity, BodyKind::Attachment(name), &impact);
                }
            }
        }
        Ok(())
    }

    /// Settled: the main body has held still near the ground for the dwell
    /// time and every detached piece is resting.
    pub fn has_settled(&self) -> bool {
        self.main.has_settled()
            && self.attachments.values().all(|a| a.has_settled(&self.config.attachment))
    }

    /// The fail-safe timeout has expired.
    pub fn is_timed_out(&self) -> bool {
        self.age >= self.config.settle_timeout
    }

    /// The death sequence may proceed: settled or timed out.
    pub fn is_finished(&self) -> bool {
        self.has_settled() || self.is_timed_out()
    }

    /// Write the simulated pose into the live rig.
    ///
    /// The root follows the main body minus the fixed center-of-mass offset,
    /// each bone gets its rest rotation plus wobble, and slots whose
    /// attachments now fly on their own are hidden.
    pub fn apply_pose<R: Rig<F>>(&self, rig: &mut R) -> Result<(), RagdollError> {
        rig.set_root_transform(self.main.body.pos - self.center_offset, self.main.body.rotation);
        for (id, bone) in &self.bones {
            rig.set_bone_rotation(*id, bone.setup_rotation() + bone.rotation())?;
        }
        for a in self.attachments.values() {
            rig.set_slot_visible(a.slot(), false)?;
        }
        Ok(())
    }

    /// Restore the rig to its rest pose and show every detached slot again.
    pub fn dispose<R: Rig<F>, O: RagdollObserver<F>>(self, rig: &mut R, observer: &mut O) -> Result<(), RagdollError> {
        rig.set_to_setup_pose();
        let mut result = Ok(());
        for a in self.attachments.values() {
            if let Err(e) = rig.set_slot_visible(a.slot(), true) {
                result = Err(e);
            }
        }
        observer.on_disposed(&self.profile.entity_type);
        result
    }

    /// Detached attachments in construction order (parents before children).
    pub fn attachments(&self) -> impl Iterator<Item = &Attachment<F>> + '_ {
        self.attachment_order.iter().filter_map(move |n| self.attachments.get(n))
    }

    pub fn attachment(&self, name: &str) -> Option<&Attachment<F>> {
        self.attachments.get(name)
    }

    pub fn attachment_mut(&mut self, name: &str) -> Option<&mut Attachment<F>> {
        self.attachments.get_mut(name)
    }

    pub fn bones(&self) -> impl Iterator<Item = &BoneWobble<F>> + '_ {
        self.bones.values()
    }

    pub fn bone(&self, id: BoneId) -> Option<&BoneWobble<F>> {
        self.bones.get(&id)
    }

    pub fn main_body(&self) -> &MainBody<F> { &self.main }
    pub fn main_body_mut(&mut self) -> &mut MainBody<F> { &mut self.main }
    pub fn entity_type(&self) -> &str { &self.profile.entity_type }
    pub fn profile(&self) -> &EntityProfile { &self.profile }
    pub fn multipliers(&self) -> ForceMultipliers<F> { self.multipliers }
    pub fn center_offset(&self) -> Vec2<F> { self.center_offset }
    pub fn ground_y(&self) -> F { self.ground_y }
    pub fn accumulator(&self) -> F { self.accumulator }
    pub fn created_at(&self) -> F { self.created_at }
    /// Simulated seconds since creation.
    pub fn age(&self) -> F { self.age }
}

type BuiltAttachments<F> = (BTreeMap<String, Attachment<F>>, AllocVec<String>);

/// Detach every matching attachment, parents before children.
///
/// A link is kept only when the parent detaches too. If the remaining links
/// form a cycle, the first pending attachment is built unlinked. Children
/// inherit their parent's launch velocity and add a smaller jitter of their own.
fn build_attachments<F: Float, R: Rig<F>, G: Rng>(
    rig: &R,
    profile: &EntityProfile,
    config: &RagdollConfig<F>,
    impulse: Vec2<F>,
    multipliers: &ForceMultipliers<F>,
    rng: &mut G,
) -> Result<BuiltAttachments<F>, RagdollError> {
    let mut pending: AllocVec<SlotInfo> = AllocVec::new();
    for slot in rig.slots() {
        let duplicate = pending.iter().any(|p| p.attachment == slot.attachment);
        if profile.is_detachable(&slot.attachment) && !duplicate {
            pending.push(slot);
        }
    }

    let mut links: BTreeMap<String, String> = pending
        .iter()
        .filter_map(|slot| {
            let parent = profile.attachment_parent(&slot.attachment)?;
            let detaches = parent != slot.attachment && pending.iter().any(|p| p.attachment == parent);
            detaches.then(|| (slot.attachment.clone(), parent.to_string()))
        })
        .collect();

    let mut built: BTreeMap<String, Attachment<F>> = BTreeMap::new();
    let mut order = AllocVec::new();
    let mut launch: BTreeMap<String, (Vec2<F>, F)> = BTreeMap::new();

    while !pending.is_empty() {
        let ready = pending
            .iter()
            .position(|slot| links.get(&slot.attachment).map_or(true, |p| built.contains_key(p)));
        let slot = match ready {
            Some(i) => pending.remove(i),
            None => {
                let slot = pending.remove(0);
                links.remove(&slot.attachment);
                slot
            }
        };
        let parent = links.get(&slot.attachment).cloned();

        let snapshot = rig
            .world_transform(slot.bone)
            .ok_or_else(|| RagdollError::UnknownBone(slot.bone.0.to_string()))?;

        let jitter_scale = if parent.is_some() { F::from_f32(0.25) } else { F::one() };
        let jitter = Vec2::new(
            F::from_f32(rng.gen_range(-1.0f32..1.0)),
            F::from_f32(rng.gen_range(-1.0f32..1.0)),
        )
        .scale(config.attachment.jitter * jitter_scale);
        let spin = F::from_f32(rng.gen_range(-1.0f32..1.0))
            * config.attachment.spin
            * jitter_scale
            * multipliers.angular;

        let (base_velocity, base_spin) = parent
            .as_ref()
            .and_then(|p| launch.get(p).copied())
            .unwrap_or((impulse, F::zero()));
        let velocity = base_velocity + multipliers.scale_linear(jitter);
        let omega = base_spin + spin;

        let mut attachment = Attachment::new(&slot, snapshot, parent);
        attachment.body.apply_impulse(velocity, omega);
        launch.insert(slot.attachment.clone(), (velocity, omega));
        order.push(slot.attachment.clone());
        built.insert(slot.attachment.clone(), attachment);
    }

    Ok((built, order))
}
