//! Lifecycle events emitted by ragdolls.
//!
//! The simulation never formats strings while stepping. It reports what
//! happened at fixed points (created, collided, settled, timed out, failed,
//! disposed) and leaves presentation to the observer.

use crate::body::Impact;
use crate::error::RagdollError;
use crate::float::Float;

/// Which body a collision event refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BodyKind<'a> {
    Main,
    Attachment(&'a str),
}

/// Trait for observing ragdoll lifecycle events.
///
/// All methods have default no-op implementations.
pub trait RagdollObserver<F: Float> {
    /// A ragdoll was built for `entity`.
    fn on_created(&mut self, _entity: &str, _bones: usize, _attachments: usize) {}

    /// A body hit the ground, a wall or the ceiling.
    fn on_collision(&mut self, _entity: &str, _body: BodyKind<'_>, _impact: &Impact<F>) {}

    /// The ragdoll settled `age` seconds after creation.
    fn on_settled(&mut self, _entity: &str, _age: F) {}

    /// The fail-safe timeout expired before the ragdoll settled.
    fn on_timeout(&mut self, _entity: &str, _age: F) {}

    /// Construction, stepping or posing failed; the host falls back to the plain death.
    fn on_failed(&mut self, _entity: &str, _error: &RagdollError) {}

    /// The ragdoll was disposed and the rig restored.
    fn on_disposed(&mut self, _entity: &str) {}
}

/// A no-op observer that does nothing. Use as default when no observation needed.
pub struct NoOpObserver;

impl<F: Float> RagdollObserver<F> for NoOpObserver {}

/// Forwards events to the `log` facade.
///
/// Collisions go to `debug`, lifecycle to `info`, failures to `warn`.
#[cfg(feature = "log")]
#[derive(Copy, Clone, Debug, Default)]
pub struct LogObserver;

#[cfg(feature = "log")]
impl<F: Float> RagdollObserver<F> for LogObserver {
    fn on_created(&mut self, entity: &str, bones: usize, attachments: usize) {
        log::info!(target: "ragdoll", "created entity={} bones={} attachments={}", entity, bones, attachments);
    }

    fn on_collision(&mut self, entity: &str, body: BodyKind<'_>, impact: &Impact<F>) {
        log::debug!(
            target: "ragdoll",
            "collision entity={} body={:?} surface={:?} speed={:.1} bounced={}",
            entity,
            body,
            impact.surface,
            impact.speed.to_f32(),
            impact.bounced
        );
    }

    fn on_settled(&mut self, entity: &str, age: F) {
        log::info!(target: "ragdoll", "settled entity={} age={:.2}s", entity, age.to_f32());
    }

    fn on_timeout(&mut self, entity: &str, age: F) {
        log::info!(target: "ragdoll", "settle timeout entity={} age={:.2}s", entity, age.to_f32());
    }

    fn on_failed(&mut self, entity: &str, error: &RagdollError) {
        log::warn!(target: "ragdoll", "falling back to default death entity={}: {}", entity, error);
    }

    fn on_disposed(&mut self, entity: &str) {
        log::info!(target: "ragdoll", "disposed entity={}", entity);
    }
}
