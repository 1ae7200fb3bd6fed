use std::collections::BTreeMap;

use ragdoll::{
    Bounds, NoOpObserver, PolicyTable, RagdollConfig, RagdollError, RagdollRegistry, RagdollSpawn, Rig, Skeleton,
    Vec2, WeightClass,
};
use wasm_bindgen::prelude::*;

fn stick_figure(x: f32, y: f32) -> Result<Skeleton<f32>, RagdollError> {
    let mut rig = Skeleton::new(Vec2::new(x, y));
    let bones: [(&str, Option<&str>, (f32, f32), f32); 10] = [
        ("root", None, (0.0, 0.0), 0.0),
        ("torso", Some("root"), (0.0, 30.0), 0.0),
        ("head", Some("torso"), (0.0, 28.0), 0.0),
        ("arm_l", Some("torso"), (-12.0, 22.0), 0.0),
        ("hand_l", Some("arm_l"), (-18.0, 0.0), 0.0),
        ("arm_r", Some("torso"), (12.0, 22.0), 0.0),
        ("hand_r", Some("arm_r"), (18.0, 0.0), 0.0),
        ("leg_l", Some("root"), (-8.0, 0.0), 0.0),
        ("foot_l", Some("leg_l"), (0.0, -24.0), 0.0),
        ("leg_r", Some("root"), (8.0, 0.0), 0.0),
    ];
    for (name, parent, (lx, ly), rotation) in bones {
        // the table is ordered parent-first
        rig.add_bone(name, parent, Vec2::new(lx, ly), rotation)?;
    }
    let slots = [
        ("torso-slot", "torso", "torso_image"),
        ("head-slot", "head", "helmet"),
        ("arm_l-slot", "arm_l", "arm_image"),
        ("arm_r-slot", "arm_r", "arm_image"),
        ("leg_l-slot", "leg_l", "leg_image"),
        ("leg_r-slot", "leg_r", "leg_image"),
        ("weapon-slot", "hand_r", "sword"),
        ("offhand-slot", "hand_l", "shield"),
    ];
    for (slot, bone, attachment) in slots {
        rig.add_slot(slot, bone, attachment)?;
    }
    Ok(rig)
}

// ---- Ragdoll Demo ----

/// Stick figures that die on click. Positions are y-up world units; the page
/// flips them for the canvas.
#[wasm_bindgen]
pub struct RagdollDemo {
    registry: RagdollRegistry<u32, f32>,
    rigs: BTreeMap<u32, Skeleton<f32>>,
    ground_y: f32,
    next_id: u32,
    clock: f32,
}

#[wasm_bindgen]
impl RagdollDemo {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32, ground_y: f32) -> Self {
        let policy = PolicyTable::new()
            .with_weight("brute", WeightClass::Heavy)
            .with_weight("imp", WeightClass::Light)
            .with_zero_gravity("wisp")
            .with_attachment_parent("knight", "helmet", "sword");
        let config = RagdollConfig::new().with_bounds(Bounds::new(0.0, width, height));
        RagdollDemo {
            registry: RagdollRegistry::new(policy, config),
            rigs: BTreeMap::new(),
            ground_y,
            next_id: 0,
            clock: 0.0,
        }
    }

    /// Kill a fresh figure of `kind` at (x, y). Returns its id, or -1 if the
    /// ragdoll could not start.
    pub fn kill(&mut self, kind: &str, x: f32, y: f32, fx: f32, fy: f32, overkill: f32) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        let rig = match stick_figure(x, y) {
            Ok(rig) => rig,
            Err(_) => return -1,
        };
        let spawn = RagdollSpawn::new(kind, Vec2::new(x, y), self.ground_y)
            .with_force(Vec2::new(fx, fy))
            .with_overkill(overkill)
            .with_created_at(self.clock)
            .with_seed(id as u64);
        match self.registry.begin(id, &spawn, Some(&rig), &mut NoOpObserver) {
            Ok(_) => {
                self.rigs.insert(id, rig);
                id as i32
            }
            Err(_) => -1,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.clock += dt;
        for id in self.registry.step_all(dt, &mut NoOpObserver) {
            self.rigs.remove(&id);
        }
        for (id, rig) in self.rigs.iter_mut() {
            // a failed pose only skips this frame
            let _ = self.registry.apply_pose(id, rig, &mut NoOpObserver);
        }
    }

    /// Dispose every finished ragdoll. Returns how many were removed.
    pub fn dispose_finished(&mut self) -> usize {
        let finished: Vec<u32> = self.registry.keys().copied().filter(|id| self.registry.is_finished(id)).collect();
        for id in &finished {
            if let Some(mut rig) = self.rigs.remove(id) {
                let _ = self.registry.dispose(id, &mut rig, &mut NoOpObserver);
            }
        }
        finished.len()
    }

    pub fn ids(&self) -> Vec<u32> {
        self.registry.keys().copied().collect()
    }

    pub fn is_finished(&self, id: u32) -> bool {
        self.registry.is_finished(&id)
    }

    /// Returns bone world positions as flat [x0, y0, x1, y1, ...]
    pub fn bone_positions(&self, id: u32) -> Vec<f32> {
        let rig = match self.rigs.get(&id) {
            Some(rig) => rig,
            None => return Vec::new(),
        };
        let mut out = Vec::with_capacity(rig.bone_count() * 2);
        for bone in 0..rig.bone_count() {
            if let Some(t) = rig.world_transform(ragdoll::BoneId(bone)) {
                out.push(t.position.x);
                out.push(t.position.y);
            }
        }
        out
    }

    /// Returns bone parents as indices; -1 for roots.
    pub fn bone_parents(&self, id: u32) -> Vec<i32> {
        let rig = match self.rigs.get(&id) {
            Some(rig) => rig,
            None => return Vec::new(),
        };
        (0..rig.bone_count())
            .map(|b| rig.bone_parent(ragdoll::BoneId(b)).map_or(-1, |p| p.0 as i32))
            .collect()
    }

    /// Returns detached pieces as flat [x0, y0, rotation0, x1, y1, rotation1, ...]
    pub fn attachment_transforms(&self, id: u32) -> Vec<f32> {
        let ragdoll = match self.registry.get(&id) {
            Some(r) => r,
            None => return Vec::new(),
        };
        let mut out = Vec::new();
        for a in ragdoll.attachments() {
            out.push(a.body.pos.x);
            out.push(a.body.pos.y);
            out.push(a.body.rotation);
        }
        out
    }

    pub fn ragdoll_count(&self) -> usize {
        self.registry.len()
    }
}
