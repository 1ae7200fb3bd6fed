#![allow(dead_code)]

use ragdoll::{BodyKind, Impact, RagdollError, RagdollObserver, Skeleton, Vec2};

/// A small humanoid: root, torso, head, one arm with a hand, one leg.
///
/// The helmet and sword detach under the default keywords; the body-part
/// images stay on their bones.
pub fn humanoid() -> Skeleton<f32> {
    let mut rig = Skeleton::new(Vec2::new(400.0, 300.0));
    rig.add_bone("root", None, Vec2::zero(), 0.0).unwrap();
    rig.add_bone("torso", Some("root"), Vec2::new(0.0, 40.0), 0.0).unwrap();
    rig.add_bone("head", Some("torso"), Vec2::new(0.0, 30.0), 0.0).unwrap();
    rig.add_bone("arm_l", Some("torso"), Vec2::new(-20.0, 20.0), 0.0).unwrap();
    rig.add_bone("hand_l", Some("arm_l"), Vec2::new(-15.0, 0.0), 0.0).unwrap();
    rig.add_bone("leg_l", Some("root"), Vec2::new(-10.0, -30.0), 270.0).unwrap();

    rig.add_slot("torso-slot", "torso", "torso_image").unwrap();
    rig.add_slot("head-slot", "head", "helmet").unwrap();
    rig.add_slot("arm-slot", "arm_l", "arm_image").unwrap();
    rig.add_slot("hand-slot", "hand_l", "sword").unwrap();
    rig.add_slot("leg-slot", "leg_l", "leg_image").unwrap();
    rig
}

/// Records every lifecycle event as a short string.
#[derive(Default)]
pub struct Recorder {
    pub events: Vec<String>,
}

impl Recorder {
    pub fn count(&self, prefix: &str) -> usize {
        self.events.iter().filter(|e| e.starts_with(prefix)).count()
    }
}

impl RagdollObserver<f32> for Recorder {
    fn on_created(&mut self, entity: &str, bones: usize, attachments: usize) {
        self.events.push(format!("created {} {} {}", entity, bones, attachments));
    }

    fn on_collision(&mut self, entity: &str, body: BodyKind<'_>, impact: &Impact<f32>) {
        let body = match body {
            BodyKind::Main => "main".to_string(),
            BodyKind::Attachment(name) => name.to_string(),
        };
        self.events.push(format!("collision {} {} {:?}", entity, body, impact.surface));
    }

    fn on_settled(&mut self, entity: &str, _age: f32) {
        self.events.push(format!("settled {}", entity));
    }

    fn on_timeout(&mut self, entity: &str, _age: f32) {
        self.events.push(format!("timeout {}", entity));
    }

    fn on_failed(&mut self, entity: &str, error: &RagdollError) {
        self.events.push(format!("failed {} {}", entity, error));
    }

    fn on_disposed(&mut self, entity: &str) {
        self.events.push(format!("disposed {}", entity));
    }
}
