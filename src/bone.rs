//! Per-bone secondary motion ("wobble") layered on the main body transform.
//!
//! Each bone carries a rotation offset and angular velocity on top of its rest
//! pose. Hierarchy facts (depth, parent influence, constraint size) are fixed
//! at construction; the lock state follows the parent: a bone freezes on the
//! first update after its parent reports settled and resumes as soon as the
//! parent moves again.

use crate::body::{normalize_degrees, shortest_arc};
use crate::config::WobbleConfig;
use crate::error::RagdollError;
use crate::float::Float;
use crate::policy::EntityProfile;
use crate::rig::{BoneId, Rig};
use crate::vec::Vec2;
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec as AllocVec;
use rand::Rng;

/// How a bone is rendered, which selects its damping.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BoneCategory {
    /// No visual attachment; exists only to drive children.
    Control,
    /// Carries a visible attachment but is not an anatomical limb.
    Visual,
    /// Anatomical limb with a visible attachment.
    Limb,
}

impl BoneCategory {
    fn index(self) -> usize {
        match self {
            BoneCategory::Control => 0,
            BoneCategory::Visual => 1,
            BoneCategory::Limb => 2,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LockState {
    Unlocked,
    Locked,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlightPhase {
    EarlyFlight,
    Airborne,
    Settling,
}

/// Main-body facts a bone needs for one update.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WobbleContext<F: Float> {
    pub parent_velocity: Vec2<F>,
    /// Root bones: the main body has settled. Other bones: the parent bone is locked.
    pub parent_settled: bool,
    pub ground_contacted: bool,
    pub on_ground: bool,
    pub body_moving: bool,
    pub body_resting: bool,
    pub body_settled: bool,
    /// Seconds since the ragdoll was created.
    pub flight_time: F,
    /// Seconds the main body has been resting.
    pub resting_time: F,
    pub body_rotation: F,
}

impl<F: Float> WobbleContext<F> {
    /// A context for a body in free flight, nothing settled.
    pub fn airborne(flight_time: F) -> Self {
        WobbleContext {
            parent_velocity: Vec2::zero(),
            parent_settled: false,
            ground_contacted: false,
            on_ground: false,
            body_moving: true,
            body_resting: false,
            body_settled: false,
            flight_time,
            resting_time: F::zero(),
            body_rotation: F::zero(),
        }
    }

    fn phase(&self, grace: F) -> FlightPhase {
        if !self.ground_contacted && self.flight_time < grace {
            FlightPhase::EarlyFlight
        } else if self.body_resting {
            FlightPhase::Settling
        } else {
            FlightPhase::Airborne
        }
    }
}

/// Wobble state for one rig bone. Refers to the bone by id; never owns the rig.
#[derive(Clone, Debug)]
pub struct BoneWobble<F: Float> {
    bone: BoneId,
    name: String,
    parent: Option<BoneId>,
    /// Every ancestor, nearest first.
    ancestors: AllocVec<BoneId>,
    setup_rotation: F,
    /// Rest-pose world rotation relative to the rig root.
    rest_world_rotation: F,
    rotation: F,
    angular_velocity: F,
    is_root: bool,
    is_leaf: bool,
    chain_depth: usize,
    base_constraint: F,
    parent_influence: F,
    category: BoneCategory,
    constrained: bool,
    lock: LockState,
    settle_timer: F,
    limb_correcting: bool,
    gravity_corrected: bool,
    last_parent_velocity: Option<Vec2<F>>,
    violation: F,
}

impl<F: Float> BoneWobble<F> {
    pub fn new<R: Rig<F>>(
        rig: &R,
        bone: BoneId,
        profile: &EntityProfile,
        config: &WobbleConfig<F>,
    ) -> Result<Self, RagdollError> {
        let name = rig
            .bone_name(bone)
            .ok_or_else(|| RagdollError::UnknownBone(bone.0.to_string()))?
            .to_string();
        let setup_rotation = rig.setup_rotation(bone).unwrap_or_else(F::zero);
        let world = rig
            .world_transform(bone)
            .ok_or_else(|| RagdollError::UnknownBone(name.clone()))?;

        let parent = rig.bone_parent(bone);
        let is_root = parent.is_none();
        let chain_depth = rig.chain_depth(bone);
        let ancestors: AllocVec<BoneId> =
            core::iter::successors(parent, |&b| rig.bone_parent(b)).take(chain_depth).collect();
        let has_visual = rig.has_attachment(bone);
        let category = match (has_visual, profile.is_limb(&name)) {
            (false, _) => BoneCategory::Control,
            (true, false) => BoneCategory::Visual,
            (true, true) => BoneCategory::Limb,
        };

        let depth = F::from_f32(chain_depth as f32);
        let base = if is_root {
            config.root_constraint
        } else if has_visual {
            config.visual_constraint
        } else {
            config.control_constraint
        };
        let depth_scale = (F::one() - depth * config.depth_shrink).max(config.min_depth_scale);
        let parent_influence = if is_root {
            F::zero()
        } else {
            (config.parent_influence_base + (depth - F::one()) * config.parent_influence_per_depth)
                .min(config.parent_influence_max)
        };

        Ok(BoneWobble {
            bone,
            parent,
            ancestors,
            setup_rotation,
            rest_world_rotation: world.rotation - rig.root_rotation(),
            rotation: F::zero(),
            angular_velocity: F::zero(),
            is_root,
            is_leaf: !rig.has_children(bone),
            chain_depth,
            base_constraint: base * depth_scale,
            parent_influence,
            category,
            constrained: profile.is_constrained(&name),
            lock: LockState::Unlocked,
            settle_timer: F::zero(),
            limb_correcting: false,
            gravity_corrected: false,
            last_parent_velocity: None,
            violation: F::zero(),
            name,
        })
    }

    /// Initial death kick, attenuated with depth.
    pub fn kick<R: Rng>(&mut self, angular_multiplier: F, config: &WobbleConfig<F>, rng: &mut R) {
        let depth = F::from_f32(self.chain_depth as f32);
        let falloff = (F::one() - depth * config.kick_depth_falloff).max(F::from_f32(0.2));
        let r = F::from_f32(rng.gen_range(-1.0f32..1.0));
        self.angular_velocity = self.angular_velocity + r * config.initial_kick * angular_multiplier * falloff;
    }

    /// Advance the bone by `dt`.
    ///
    /// `siblings` maps every bone of the rig to its wobble rotation at the
    /// start of this step; it is used to find the parent's rotation.
    pub fn update(
        &mut self,
        dt: F,
        ctx: &WobbleContext<F>,
        siblings: &BTreeMap<BoneId, F>,
        config: &WobbleConfig<F>,
    ) {
        let previous_parent_velocity = self.last_parent_velocity.replace(ctx.parent_velocity);

        match (self.lock, ctx.parent_settled) {
            (LockState::Unlocked, true) => {
                self.lock = LockState::Locked;
                self.angular_velocity = F::zero();
                self.settle_timer = F::zero();
                return;
            }
            (LockState::Locked, true) => {
                self.settle_timer = self.settle_timer + dt;
                return;
            }
            (LockState::Locked, false) => {
                self.lock = LockState::Unlocked;
                self.settle_timer = F::zero();
            }
            (LockState::Unlocked, false) => {}
        }

        if dt <= F::zero() {
            return;
        }

        // Inertia: the bone lags behind sideways changes of the body's velocity.
        if let Some(prev) = previous_parent_velocity {
            let accel_x = (ctx.parent_velocity.x - prev.x) / dt;
            self.angular_velocity = self.angular_velocity - accel_x * config.inertia * dt;
        }
        self.rotation = shortest_arc(F::zero(), self.rotation + self.angular_velocity * dt);

        let parent_rotation = self
            .parent
            .and_then(|p| siblings.get(&p).copied())
            .unwrap_or_else(F::zero);
        let home = parent_rotation * self.parent_influence;
        let relative = shortest_arc(home, self.rotation);

        self.violation = F::zero();
        if self.constrained
            && ctx.ground_contacted
            && (!ctx.on_ground || ctx.body_moving)
            && ctx.flight_time > config.flight_grace
        {
            self.apply_hierarchy_constraint(dt, ctx, home, relative, config);
        }

        if self.category == BoneCategory::Limb && self.constrained {
            let ancestor_rotation = self
                .ancestors
                .iter()
                .filter_map(|a| siblings.get(a).copied())
                .fold(F::zero(), |sum, r| sum + r);
            self.apply_limb_gravity(dt, ctx, ancestor_rotation, config);
        }

        self.apply_damping(dt, ctx, config);

        if self.violation > config.restoration_threshold && !ctx.body_settled {
            let relative = shortest_arc(home, self.rotation);
            self.angular_velocity =
                self.angular_velocity - relative.sign() * self.violation * config.restoration_strength;
        }
    }

    fn apply_hierarchy_constraint(
        &mut self,
        dt: F,
        ctx: &WobbleContext<F>,
        home: F,
        relative: F,
        config: &WobbleConfig<F>,
    ) {
        let max = self.base_constraint;
        if relative.abs() <= max {
            return;
        }
        self.violation = relative.abs() - max;
        let boundary = relative.sign() * max;
        let blend = if ctx.body_resting { config.constraint_blend_resting } else { config.constraint_blend };
        let t = F::one() - (F::one() - blend).frame_decay(dt);
        self.rotation = shortest_arc(F::zero(), home + relative.lerp(boundary, t));
        self.angular_velocity =
            self.angular_velocity / (F::one() + self.violation * config.violation_attenuation);
    }

    /// `ancestor_rotation` is the summed wobble of every ancestor, so the
    /// angle tested is the limb's on-screen orientation.
    fn apply_limb_gravity(&mut self, dt: F, ctx: &WobbleContext<F>, ancestor_rotation: F, config: &WobbleConfig<F>) {
        if self.gravity_corrected || !ctx.body_resting || ctx.resting_time < config.limb_correction_delay {
            return;
        }

        let f = F::from_f32;
        let angle = normalize_degrees(
            ctx.body_rotation + self.rest_world_rotation + ancestor_rotation + self.rotation,
        );
        if angle > f(180.0) {
            // pointing down: already where gravity wants it
            self.gravity_corrected = true;
            return;
        }

        let to_horizontal = angle.min(f(180.0) - angle);
        if to_horizontal <= config.limb_tolerance {
            self.gravity_corrected = true;
            self.limb_correcting = false;
            return;
        }

        let (low, high) = config.upward_band;
        if !self.limb_correcting && (angle < low || angle > high) {
            self.gravity_corrected = true;
            return;
        }

        self.limb_correcting = true;
        let verticalness = angle.to_radians().sin();
        let direction = if angle < f(90.0) { -F::one() } else { F::one() };
        self.angular_velocity = self.angular_velocity + direction * verticalness * config.limb_torque * dt;
    }

    fn apply_damping(&mut self, dt: F, ctx: &WobbleContext<F>, config: &WobbleConfig<F>) {
        let row = match ctx.phase(config.flight_grace) {
            FlightPhase::EarlyFlight => &config.damping.early_flight,
            FlightPhase::Airborne => &config.damping.airborne,
            FlightPhase::Settling => &config.damping.settling,
        };
        let factor = row[self.category.index()] / (F::one() + self.violation * config.violation_damping);
        self.angular_velocity = self.angular_velocity * factor.frame_decay(dt);

        if ctx.body_resting && self.angular_velocity.abs() < config.deadzone && !self.limb_correcting {
            self.angular_velocity = F::zero();
        }
    }

    pub fn bone(&self) -> BoneId { self.bone }
    pub fn name(&self) -> &str { &self.name }
    pub fn parent(&self) -> Option<BoneId> { self.parent }
    pub fn setup_rotation(&self) -> F { self.setup_rotation }
    /// Wobble offset in degrees, in (-180, 180].
    pub fn rotation(&self) -> F { self.rotation }
    pub fn angular_velocity(&self) -> F { self.angular_velocity }
    pub fn is_root(&self) -> bool { self.is_root }
    pub fn is_leaf(&self) -> bool { self.is_leaf }
    pub fn chain_depth(&self) -> usize { self.chain_depth }
    pub fn base_constraint(&self) -> F { self.base_constraint }
    pub fn parent_influence(&self) -> F { self.parent_influence }
    pub fn category(&self) -> BoneCategory { self.category }
    pub fn is_constrained(&self) -> bool { self.constrained }
    pub fn is_locked(&self) -> bool { self.lock == LockState::Locked }
    pub fn lock_state(&self) -> LockState { self.lock }
    /// Seconds spent locked.
    pub fn settle_timer(&self) -> F { self.settle_timer }
    pub fn gravity_corrected(&self) -> bool { self.gravity_corrected }
    /// Degrees beyond the constraint at the last update.
    pub fn violation(&self) -> F { self.violation }

    pub fn is_finite(&self) -> bool {
        self.rotation.is_finite() && self.angular_velocity.is_finite()
    }
}
