//! Planar rigid body state shared by the main body and detached attachments.

use crate::float::Float;
use crate::vec::Vec2;

/// Wrap an angle in degrees into [0, 360).
pub fn normalize_degrees<F: Float>(degrees: F) -> F {
    let full = F::from_f32(360.0);
    let mut r = degrees.fmod(full);
    if r < F::zero() {
        r = r + full;
    }
    // fmod of a tiny negative value plus 360 can round up to exactly 360.
    if r >= full {
        r = F::zero();
    }
    r
}

/// Signed shortest arc from `from` to `to`, in (-180, 180].
pub fn shortest_arc<F: Float>(from: F, to: F) -> F {
    let half = F::from_f32(180.0);
    let d = normalize_degrees(to - from);
    if d > half { d - F::from_f32(360.0) } else { d }
}

/// Surface a body collided with.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Surface {
    Ground,
    Wall,
    Ceiling,
}

/// Result of a collision during a step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Impact<F: Float> {
    pub surface: Surface,
    /// Speed along the surface normal at the moment of contact.
    pub speed: F,
    /// True if the body bounced, false if it was absorbed (settled onto the surface).
    pub bounced: bool,
}

impl<F: Float> Impact<F> {
    /// Keep whichever of two optional impacts was harder.
    pub fn strongest(a: Option<Self>, b: Option<Self>) -> Option<Self> {
        match (a, b) {
            (Some(a), Some(b)) => Some(if b.speed > a.speed { b } else { a }),
            (a, None) => a,
            (None, b) => b,
        }
    }
}

/// Position, velocity, rotation (degrees in [0, 360)) and angular velocity (deg/s).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RigidBody<F: Float> {
    pub pos: Vec2<F>,
    pub vel: Vec2<F>,
    pub rotation: F,
    pub angular_velocity: F,
}

impl<F: Float> RigidBody<F> {
    pub fn new(pos: Vec2<F>) -> Self {
        RigidBody {
            pos,
            vel: Vec2::zero(),
            rotation: F::zero(),
            angular_velocity: F::zero(),
        }
    }

    pub fn with_rotation(mut self, rotation: F) -> Self {
        self.rotation = normalize_degrees(rotation);
        self
    }

    /// Add an instantaneous change of linear and angular velocity.
    pub fn apply_impulse(&mut self, dv: Vec2<F>, d_omega: F) {
        self.vel = self.vel + dv;
        self.angular_velocity = self.angular_velocity + d_omega;
    }

    /// Semi-implicit Euler: velocity first, then position and rotation.
    pub fn integrate(&mut self, dt: F, gravity: F) {
        self.vel.y = self.vel.y + gravity * dt;
        self.pos = self.pos + self.vel.scale(dt);
        self.rotation = normalize_degrees(self.rotation + self.angular_velocity * dt);
    }

    pub fn is_finite(&self) -> bool {
        self.pos.is_finite()
            && self.vel.is_finite()
            && self.rotation.is_finite()
            && self.angular_velocity.is_finite()
    }
}
