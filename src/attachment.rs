//! Independent physics for detached visual pieces (weapons, hats, shields...).

use crate::body::{Impact, RigidBody, Surface};
use crate::config::{AttachmentConfig, Bounds};
use crate::float::Float;
use crate::rig::{BoneId, BoneTransform, SlotInfo};
use alloc::string::String;
use rand::Rng;

/// A detached attachment with its own rigid body.
///
/// The optional parent link is bookkeeping for grouped rendering and the
/// one-time initial impulse. There is no spring or joint: every attachment
/// integrates on its own.
#[derive(Clone, Debug)]
pub struct Attachment<F: Float> {
    pub body: RigidBody<F>,
    name: String,
    slot: String,
    bone: BoneId,
    snapshot: BoneTransform<F>,
    parent: Option<String>,
    on_ground: bool,
}

impl<F: Float> Attachment<F> {
    /// Detach the attachment in `slot`, starting at the bone's current world transform.
    pub fn new(slot: &SlotInfo, snapshot: BoneTransform<F>, parent: Option<String>) -> Self {
        Attachment {
            body: RigidBody::new(snapshot.position).with_rotation(snapshot.rotation),
            name: slot.attachment.clone(),
            slot: slot.slot.clone(),
            bone: slot.bone,
            snapshot,
            parent,
            on_ground: false,
        }
    }

    pub fn update<R: Rng>(
        &mut self,
        dt: F,
        zero_gravity: bool,
        ground_y: F,
        bounds: &Bounds<F>,
        config: &AttachmentConfig<F>,
        rng: &mut R,
    ) -> Option<Impact<F>> {
        if dt <= F::zero() {
            return None;
        }
        let gravity = if zero_gravity { F::zero() } else { config.gravity };
        self.body.integrate(dt, gravity);

        let b = &mut self.body;
        let mut impact = None;

        if b.pos.x < bounds.left || b.pos.x > bounds.right {
            let direction = if b.pos.x < bounds.left { F::one() } else { -F::one() };
            b.pos.x = b.pos.x.clamp(bounds.left, bounds.right);
            let speed = b.vel.x.abs();
            b.vel.x = direction * speed * config.wall_restitution;
            let kick = F::from_f32(rng.gen_range(-1.0f32..1.0));
            b.angular_velocity = b.angular_velocity + kick * speed * config.wall_kick;
            impact = Some(Impact { surface: Surface::Wall, speed, bounced: true });
        }

        if b.pos.y > bounds.ceiling {
            b.pos.y = bounds.ceiling;
            let speed = b.vel.y.abs();
            b.vel.y = -speed * config.ceiling_restitution;
            impact = Impact::strongest(impact, Some(Impact { surface: Surface::Ceiling, speed, bounced: true }));
        }

        let was_on_ground = self.on_ground;
        self.on_ground = false;
        if b.pos.y <= ground_y {
            b.pos.y = ground_y;
            self.on_ground = true;
            let speed = b.vel.y.abs();
            if speed > config.bounce_threshold {
                b.vel.y = speed * config.ground_restitution;
                b.vel.x = b.vel.x * config.bounce_friction;
                b.angular_velocity = b.angular_velocity * config.bounce_angular_retention;
                impact = Impact::strongest(impact, Some(Impact { surface: Surface::Ground, speed, bounced: true }));
            } else {
                b.vel.y = F::zero();
                b.vel.x = b.vel.x * config.ground_friction.frame_decay(dt);
                b.angular_velocity = b.angular_velocity * config.ground_angular_damping.frame_decay(dt);
                if !was_on_ground {
                    impact = Impact::strongest(impact, Some(Impact { surface: Surface::Ground, speed, bounced: false }));
                }
            }
        } else {
            b.vel = b.vel.scale(config.air_damping.frame_decay(dt));
            b.angular_velocity = b.angular_velocity * config.air_angular_damping.frame_decay(dt);
        }

        impact
    }

    /// Grounded with negligible linear and angular speed.
    pub fn has_settled(&self, config: &AttachmentConfig<F>) -> bool {
        self.on_ground
            && self.body.vel.length() < config.rest_speed
            && self.body.angular_velocity.abs() < config.rest_speed * F::from_f32(10.0)
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn slot(&self) -> &str { &self.slot }
    pub fn bone(&self) -> BoneId { self.bone }
    /// Source bone transform at the moment of detachment.
    pub fn snapshot(&self) -> &BoneTransform<F> { &self.snapshot }
    pub fn parent(&self) -> Option<&str> { self.parent.as_deref() }
    pub fn on_ground(&self) -> bool { self.on_ground }
}
