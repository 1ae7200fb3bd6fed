//! Tunable parameters for the ragdoll simulation.
//!
//! Every constant here is tuned for visual feel rather than derived from a
//! physical model. Units are world units (pixels), seconds and degrees.

use crate::float::Float;

/// Top-level configuration shared by every ragdoll in a session.
///
/// # Builder Pattern
/// ```
/// use ragdoll::config::RagdollConfig;
///
/// let config: RagdollConfig<f32> = RagdollConfig::new()
///     .with_fixed_dt(1.0 / 120.0)
///     .with_max_steps(12)
///     .with_gravity(-1800.0)
///     .with_settle_timeout(6.0);
/// ```
#[derive(Clone, Debug)]
pub struct RagdollConfig<F: Float> {
    /// Fixed simulation step. Default: 1/60 s.
    pub fixed_dt: F,
    /// Upper bound applied to each frame's wall-clock delta. Default: 1/30 s.
    pub max_frame_dt: F,
    /// Maximum fixed steps consumed per frame; leftover time is dropped. Default: 10.
    pub max_steps: usize,
    /// Simulated age after which a death stops waiting for settle. Default: 8 s.
    pub settle_timeout: F,
    /// Base spin given to the main body at death, before the angular multiplier (deg/s).
    pub initial_spin: F,
    /// Walls and ceiling shared by all bodies.
    pub bounds: Bounds<F>,
    pub main_body: MainBodyConfig<F>,
    pub wobble: WobbleConfig<F>,
    pub attachment: AttachmentConfig<F>,
    pub force: ForceConfig<F>,
}

impl<F: Float> RagdollConfig<F> {
    /// Create a new config with default values.
    pub fn new() -> Self {
        RagdollConfig {
            fixed_dt: F::from_f32(1.0 / 60.0),
            max_frame_dt: F::from_f32(1.0 / 30.0),
            max_steps: 10,
            settle_timeout: F::from_f32(8.0),
            initial_spin: F::from_f32(240.0),
            bounds: Bounds::default(),
            main_body: MainBodyConfig::default(),
            wobble: WobbleConfig::default(),
            attachment: AttachmentConfig::default(),
            force: ForceConfig::default(),
        }
    }

    /// Set the fixed simulation step.
    pub fn with_fixed_dt(mut self, fixed_dt: F) -> Self {
        self.fixed_dt = fixed_dt;
        self
    }

    /// Set the per-frame step cap.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Set gravity for the main body and detached attachments alike.
    pub fn with_gravity(mut self, gravity: F) -> Self {
        self.main_body.gravity = gravity;
        self.attachment.gravity = gravity;
        self
    }

    /// Set the wall and ceiling positions.
    pub fn with_bounds(mut self, bounds: Bounds<F>) -> Self {
        self.bounds = bounds;
        self
    }

    /// Set the fail-safe settle timeout.
    pub fn with_settle_timeout(mut self, seconds: F) -> Self {
        self.settle_timeout = seconds;
        self
    }

    pub fn with_main_body(mut self, main_body: MainBodyConfig<F>) -> Self {
        self.main_body = main_body;
        self
    }

    pub fn with_wobble(mut self, wobble: WobbleConfig<F>) -> Self {
        self.wobble = wobble;
        self
    }

    pub fn with_attachment(mut self, attachment: AttachmentConfig<F>) -> Self {
        self.attachment = attachment;
        self
    }

    pub fn with_force(mut self, force: ForceConfig<F>) -> Self {
        self.force = force;
        self
    }
}

impl<F: Float> Default for RagdollConfig<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Vertical walls and a ceiling. The ground is per-ragdoll, not part of the bounds.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds<F: Float> {
    pub left: F,
    pub right: F,
    pub ceiling: F,
}

impl<F: Float> Bounds<F> {
    pub fn new(left: F, right: F, ceiling: F) -> Self {
        Bounds { left, right, ceiling }
    }
}

impl<F: Float> Default for Bounds<F> {
    fn default() -> Self {
        Bounds {
            left: F::zero(),
            right: F::from_f32(1920.0),
            ceiling: F::from_f32(1080.0),
        }
    }
}

/// Main body integration, collision and settle parameters.
#[derive(Clone, Debug)]
pub struct MainBodyConfig<F: Float> {
    /// Vertical acceleration (negative is down). Default: -1500.
    pub gravity: F,
    /// Per-step clamp on dt to prevent tunneling. Default: 1/30 s.
    pub max_dt: F,
    /// |vy| above which a ground hit bounces instead of settling. Default: 200.
    pub bounce_threshold: F,
    pub ground_restitution: F,
    pub bounce_friction: F,
    pub bounce_angular_retention: F,
    /// Per-frame (60 Hz) decay of vx while sliding on the ground.
    pub ground_friction: F,
    /// Per-frame (60 Hz) decay of angular velocity while on the ground.
    pub ground_angular_damping: F,
    pub wall_restitution: F,
    pub wall_vertical_damping: F,
    /// Angular kick per unit of impact speed on wall hits (deg/s per unit/s).
    pub wall_kick: F,
    pub ceiling_restitution: F,
    pub ceiling_kick: F,
    /// Momentum (|vx| + |vy| + |ω|/10) below which the body may settle. Default: 25.
    pub settle_momentum: F,
    /// Max distance above ground that still counts as grounded for settling. Default: 10.
    pub settle_ground_distance: F,
    /// Time the settle conditions must hold continuously. Default: 0.5 s.
    pub settle_dwell: F,
    /// Linear speed below which ground rolls count toward rotation limiting.
    pub rotation_limit_speed: F,
    /// Angular damping added per completed ground roll.
    pub rotation_limit_damping: F,
}

impl<F: Float> Default for MainBodyConfig<F> {
    fn default() -> Self {
        MainBodyConfig {
            gravity: F::from_f32(-1500.0),
            max_dt: F::from_f32(1.0 / 30.0),
            bounce_threshold: F::from_f32(200.0),
            ground_restitution: F::from_f32(0.4),
            bounce_friction: F::from_f32(0.8),
            bounce_angular_retention: F::from_f32(0.6),
            ground_friction: F::from_f32(0.85),
            ground_angular_damping: F::from_f32(0.8),
            wall_restitution: F::from_f32(0.4),
            wall_vertical_damping: F::from_f32(0.7),
            wall_kick: F::from_f32(0.5),
            ceiling_restitution: F::from_f32(0.6),
            ceiling_kick: F::from_f32(0.3),
            settle_momentum: F::from_f32(25.0),
            settle_ground_distance: F::from_f32(10.0),
            settle_dwell: F::from_f32(0.5),
            rotation_limit_speed: F::from_f32(120.0),
            rotation_limit_damping: F::from_f32(0.15),
        }
    }
}

/// Per-phase angular damping factors, indexed by bone category
/// `[control, visual, limb]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DampingTable<F: Float> {
    pub early_flight: [F; 3],
    pub airborne: [F; 3],
    pub settling: [F; 3],
}

impl<F: Float> Default for DampingTable<F> {
    fn default() -> Self {
        let f = F::from_f32;
        DampingTable {
            early_flight: [f(0.90), f(0.97), f(0.98)],
            airborne: [f(0.88), f(0.95), f(0.96)],
            settling: [f(0.80), f(0.88), f(0.90)],
        }
    }
}

/// Bone wobble hierarchy, constraint and damping parameters.
#[derive(Clone, Debug)]
pub struct WobbleConfig<F: Float> {
    /// Rotation constraint for root bones (degrees).
    pub root_constraint: F,
    /// Rotation constraint for bones carrying a visible attachment.
    pub visual_constraint: F,
    /// Rotation constraint for bare control bones.
    pub control_constraint: F,
    /// Fraction of the constraint lost per level of depth.
    pub depth_shrink: F,
    /// Floor on the depth scale so deep bones keep some freedom.
    pub min_depth_scale: F,
    pub parent_influence_base: F,
    pub parent_influence_per_depth: F,
    pub parent_influence_max: F,
    /// Flight time during which hierarchical constraints are skipped.
    pub flight_grace: F,
    pub constraint_blend: F,
    pub constraint_blend_resting: F,
    /// Angular velocity attenuation per degree of violation.
    pub violation_attenuation: F,
    /// Extra damping per degree of violation.
    pub violation_damping: F,
    pub damping: DampingTable<F>,
    /// |ω| below which a resting bone snaps to zero.
    pub deadzone: F,
    pub restoration_threshold: F,
    pub restoration_strength: F,
    /// Torque per unit of parent acceleration.
    pub inertia: F,
    /// Limb correction starts this long after the body comes to rest.
    pub limb_correction_delay: F,
    pub limb_torque: F,
    /// Within this many degrees of horizontal a limb counts as corrected.
    pub limb_tolerance: F,
    /// Lower and upper edge of the "pointing up" band (degrees, y-up).
    pub upward_band: (F, F),
    /// Base initial kick for a root bone (deg/s).
    pub initial_kick: F,
    pub kick_depth_falloff: F,
}

impl<F: Float> Default for WobbleConfig<F> {
    fn default() -> Self {
        let f = F::from_f32;
        WobbleConfig {
            root_constraint: f(40.0),
            visual_constraint: f(30.0),
            control_constraint: f(20.0),
            depth_shrink: f(0.12),
            min_depth_scale: f(0.35),
            parent_influence_base: f(0.6),
            parent_influence_per_depth: f(0.08),
            parent_influence_max: f(0.9),
            flight_grace: f(0.15),
            constraint_blend: f(0.08),
            constraint_blend_resting: f(0.25),
            violation_attenuation: f(0.02),
            violation_damping: f(0.004),
            damping: DampingTable::default(),
            deadzone: f(4.0),
            restoration_threshold: f(12.0),
            restoration_strength: f(0.6),
            inertia: f(0.05),
            limb_correction_delay: f(0.3),
            limb_torque: f(600.0),
            limb_tolerance: f(8.0),
            upward_band: (f(30.0), f(150.0)),
            initial_kick: f(180.0),
            kick_depth_falloff: f(0.15),
        }
    }
}

/// Detached attachment physics parameters.
#[derive(Clone, Debug)]
pub struct AttachmentConfig<F: Float> {
    pub gravity: F,
    pub bounce_threshold: F,
    pub ground_restitution: F,
    pub bounce_friction: F,
    pub bounce_angular_retention: F,
    pub ground_friction: F,
    pub ground_angular_damping: F,
    pub ceiling_restitution: F,
    pub wall_restitution: F,
    pub wall_kick: F,
    /// Per-frame (60 Hz) velocity retention in the air.
    pub air_damping: F,
    pub air_angular_damping: F,
    /// Random velocity added to each attachment on detach.
    pub jitter: F,
    /// Random spin given on detach (deg/s), before the angular multiplier.
    pub spin: F,
    /// Speed under which a grounded attachment counts as resting.
    pub rest_speed: F,
}

impl<F: Float> Default for AttachmentConfig<F> {
    fn default() -> Self {
        let f = F::from_f32;
        AttachmentConfig {
            gravity: f(-1500.0),
            bounce_threshold: f(150.0),
            ground_restitution: f(0.45),
            bounce_friction: f(0.8),
            bounce_angular_retention: f(0.7),
            ground_friction: f(0.85),
            ground_angular_damping: f(0.8),
            ceiling_restitution: f(0.5),
            wall_restitution: f(0.5),
            wall_kick: f(0.6),
            air_damping: f(0.995),
            air_angular_damping: f(0.99),
            jitter: f(120.0),
            spin: f(360.0),
            rest_speed: f(5.0),
        }
    }
}

/// Force multiplier ranges and weight scaling.
#[derive(Clone, Debug)]
pub struct ForceConfig<F: Float> {
    /// Overkill at or above which multipliers stop growing. Default: 50.
    pub max_overkill: F,
    pub horizontal_min: F,
    pub horizontal_max: F,
    pub angular_min: F,
    pub angular_max: F,
    /// Vertical response for barely-lethal hits (overkill ≤ 5).
    pub vertical_tiny: F,
    /// Vertical response just below the baseline (overkill 19).
    pub vertical_small: F,
    /// Vertical response at maximum overkill.
    pub vertical_cap: F,
    pub horizontal_impact: F,
    pub vertical_impact: F,
    pub angular_impact: F,
    pub light_scalar: F,
    pub medium_scalar: F,
    pub heavy_scalar: F,
    /// Global scale between the host's force and the resulting velocity. Default: 0.8.
    pub impulse_scale: F,
}

impl<F: Float> Default for ForceConfig<F> {
    fn default() -> Self {
        let f = F::from_f32;
        ForceConfig {
            max_overkill: f(50.0),
            horizontal_min: f(0.7),
            horizontal_max: f(1.6),
            angular_min: f(0.8),
            angular_max: f(1.5),
            vertical_tiny: f(0.15),
            vertical_small: f(0.6),
            vertical_cap: f(1.8),
            horizontal_impact: f(1.0),
            vertical_impact: f(0.6),
            angular_impact: f(0.3),
            light_scalar: f(1.3),
            medium_scalar: f(1.0),
            heavy_scalar: f(0.6),
            impulse_scale: f(0.8),
        }
    }
}
