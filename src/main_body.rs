//! The ragdoll's main rigid body: gravity, wall/ceiling/ground collision and settle detection.

use crate::body::{normalize_degrees, shortest_arc, Impact, RigidBody, Surface};
use crate::config::{Bounds, MainBodyConfig};
use crate::float::Float;
use crate::vec::Vec2;
use rand::Rng;

/// Single rigid body carrying the whole rig.
///
/// The settle timer advances only while momentum is low and the body is near
/// the ground; any violation resets it to zero.
#[derive(Clone, Debug)]
pub struct MainBody<F: Float> {
    pub body: RigidBody<F>,
    config: MainBodyConfig<F>,
    ground_y: F,
    zero_gravity: bool,
    settle_timer: F,
    cumulative_rotation: F,
    last_rotation: F,
    on_ground: bool,
    touched_ground: bool,
    resting_time: F,
}

impl<F: Float> MainBody<F> {
    pub fn new(pos: Vec2<F>, ground_y: F, config: MainBodyConfig<F>) -> Self {
        MainBody {
            body: RigidBody::new(pos),
            config,
            ground_y,
            zero_gravity: false,
            settle_timer: F::zero(),
            cumulative_rotation: F::zero(),
            last_rotation: F::zero(),
            on_ground: false,
            touched_ground: false,
            resting_time: F::zero(),
        }
    }

    pub fn with_rotation(mut self, rotation: F) -> Self {
        self.body = self.body.with_rotation(rotation);
        self.last_rotation = self.body.rotation;
        self
    }

    pub fn set_zero_gravity(&mut self, zero_gravity: bool) {
        self.zero_gravity = zero_gravity;
    }

    pub fn apply_impulse(&mut self, dv: Vec2<F>, d_omega: F) {
        self.body.apply_impulse(dv, d_omega);
    }

    /// Advance one step. `dt` is clamped to `max_dt` so a frame hitch cannot
    /// carry the body through the ground.
    ///
    /// Returns the hardest collision of the step, if any.
    pub fn step<R: Rng>(&mut self, dt: F, bounds: &Bounds<F>, rng: &mut R) -> Option<Impact<F>> {
        let dt = dt.clamp(F::zero(), self.config.max_dt);
        if dt <= F::zero() {
            return None;
        }

        let gravity = if self.zero_gravity { F::zero() } else { self.config.gravity };
        self.body.integrate(dt, gravity);

        let walls = self.collide_walls(bounds, rng);
        let ceiling = self.collide_ceiling(bounds, rng);
        let ground = self.collide_ground(dt);
        let impact = Impact::strongest(Impact::strongest(walls, ceiling), ground);

        self.update_resting(dt);
        self.update_settle(dt);
        impact
    }

    fn collide_walls<R: Rng>(&mut self, bounds: &Bounds<F>, rng: &mut R) -> Option<Impact<F>> {
        let c = &self.config;
        let b = &mut self.body;
        let direction = if b.pos.x < bounds.left {
            b.pos.x = bounds.left;
            F::one()
        } else if b.pos.x > bounds.right {
            b.pos.x = bounds.right;
            -F::one()
        } else {
            return None;
        };

        let speed = b.vel.x.abs();
        b.vel.x = direction * speed * c.wall_restitution;
        b.vel.y = b.vel.y * c.wall_vertical_damping;
        let kick = F::from_f32(rng.gen_range(-1.0f32..1.0));
        b.angular_velocity = b.angular_velocity + kick * speed * c.wall_kick;
        Some(Impact { surface: Surface::Wall, speed, bounced: true })
    }

    fn collide_ceiling<R: Rng>(&mut self, bounds: &Bounds<F>, rng: &mut R) -> Option<Impact<F>> {
        let c = &self.config;
        let b = &mut self.body;
        if b.pos.y <= bounds.ceiling {
            return None;
        }
        b.pos.y = bounds.ceiling;
        let speed = b.vel.y.abs();
        b.vel.y = -speed * c.ceiling_restitution;
        let kick = F::from_f32(rng.gen_range(-1.0f32..1.0));
        b.angular_velocity = b.angular_velocity + kick * speed * c.ceiling_kick;
        Some(Impact { surface: Surface::Ceiling, speed, bounced: true })
    }

    fn collide_ground(&mut self, dt: F) -> Option<Impact<F>> {
        let c = &self.config;
        let b = &mut self.body;
        let was_on_ground = self.on_ground;
        self.on_ground = false;
        if b.pos.y > self.ground_y {
            return None;
        }

        b.pos.y = self.ground_y;
        self.on_ground = true;
        self.touched_ground = true;

        let speed = b.vel.y.abs();
        if speed > c.bounce_threshold {
            b.vel.y = speed * c.ground_restitution;
            b.vel.x = b.vel.x * c.bounce_friction;
            b.angular_velocity = b.angular_velocity * c.bounce_angular_retention;
            return Some(Impact { surface: Surface::Ground, speed, bounced: true });
        }

        b.vel.y = F::zero();
        b.vel.x = b.vel.x * c.ground_friction.frame_decay(dt);
        b.angular_velocity = b.angular_velocity * c.ground_angular_damping.frame_decay(dt);
        if was_on_ground {
            None
        } else {
            Some(Impact { surface: Surface::Ground, speed, bounced: false })
        }
    }

    fn update_resting(&mut self, dt: F) {
        if self.is_resting() {
            self.resting_time = self.resting_time + dt;
        } else {
            self.resting_time = F::zero();
        }
    }

    fn update_settle(&mut self, dt: F) {
        if self.momentum() < self.config.settle_momentum && self.is_near_ground() {
            self.settle_timer = self.settle_timer + dt;
        } else {
            self.settle_timer = F::zero();
        }
    }

    /// Damp repeated rolling on the ground.
    ///
    /// While grounded and slow, every degree turned is accumulated; once a full
    /// turn has built up, angular velocity is damped in proportion to the turns
    /// completed. Leaving the ground or speeding up clears the accumulator.
    pub fn apply_rotation_limiting(&mut self, dt: F) {
        let delta = shortest_arc(self.last_rotation, self.body.rotation).abs();
        self.last_rotation = self.body.rotation;

        let speed = self.body.vel.x.abs() + self.body.vel.y.abs();
        if !self.on_ground || speed > self.config.rotation_limit_speed {
            self.cumulative_rotation = F::zero();
            return;
        }

        self.cumulative_rotation = self.cumulative_rotation + delta;
        let turns = self.cumulative_rotation / F::from_f32(360.0);
        if turns >= F::one() {
            let retention = F::one() - (turns * self.config.rotation_limit_damping).min(F::from_f32(0.9));
            self.body.angular_velocity = self.body.angular_velocity * retention.frame_decay(dt);
        }
    }

    /// `|vx| + |vy| + |ω| / 10`.
    pub fn momentum(&self) -> F {
        self.body.vel.x.abs() + self.body.vel.y.abs() + self.body.angular_velocity.abs() / F::from_f32(10.0)
    }

    pub fn is_near_ground(&self) -> bool {
        (self.body.pos.y - self.ground_y).abs() <= self.config.settle_ground_distance
    }

    /// True once the settle conditions have held for the full dwell time.
    pub fn has_settled(&self) -> bool {
        self.settle_timer >= self.config.settle_dwell
    }

    /// On the ground and moving slowly; the phase before [`has_settled`](Self::has_settled).
    pub fn is_resting(&self) -> bool {
        self.on_ground
            && self.body.vel.x.abs() + self.body.vel.y.abs() < self.config.rotation_limit_speed
    }

    pub fn settle_timer(&self) -> F { self.settle_timer }
    pub fn resting_time(&self) -> F { self.resting_time }
    pub fn cumulative_rotation(&self) -> F { self.cumulative_rotation }
    pub fn on_ground(&self) -> bool { self.on_ground }
    pub fn touched_ground(&self) -> bool { self.touched_ground }
    pub fn ground_y(&self) -> F { self.ground_y }
    pub fn zero_gravity(&self) -> bool { self.zero_gravity }
    pub fn config(&self) -> &MainBodyConfig<F> { &self.config }

    /// Rotation in [0, 360).
    pub fn rotation(&self) -> F {
        normalize_degrees(self.body.rotation)
    }
}
