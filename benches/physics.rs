//! Benchmarks for ragdoll simulation.

use criterion::{criterion_group, criterion_main, Criterion};
use ragdoll::*;

fn humanoid() -> Skeleton<f32> {
    let mut rig = Skeleton::new(Vec2::new(400.0, 300.0));
    rig.add_bone("root", None, Vec2::zero(), 0.0).unwrap();
    rig.add_bone("torso", Some("root"), Vec2::new(0.0, 40.0), 0.0).unwrap();
    rig.add_bone("head", Some("torso"), Vec2::new(0.0, 30.0), 0.0).unwrap();
    for side in ["l", "r"] {
        let arm = format!("arm_{}", side);
        let hand = format!("hand_{}", side);
        let leg = format!("leg_{}", side);
        let foot = format!("foot_{}", side);
        rig.add_bone(&arm, Some("torso"), Vec2::new(-20.0, 20.0), 0.0).unwrap();
        rig.add_bone(&hand, Some(arm.as_str()), Vec2::new(-15.0, 0.0), 0.0).unwrap();
        rig.add_bone(&leg, Some("root"), Vec2::new(-10.0, -30.0), 270.0).unwrap();
        rig.add_bone(&foot, Some(leg.as_str()), Vec2::new(25.0, 0.0), 0.0).unwrap();
        rig.add_slot(&format!("{}-slot", arm), &arm, &format!("{}_image", arm)).unwrap();
        rig.add_slot(&format!("{}-slot", leg), &leg, &format!("{}_image", leg)).unwrap();
    }
    rig.add_slot("head-slot", "head", "helmet").unwrap();
    rig.add_slot("hand-slot", "hand_r", "sword").unwrap();
    rig.add_slot("offhand-slot", "hand_l", "shield").unwrap();
    rig
}

fn spawn(seed: u64) -> RagdollSpawn<f32> {
    RagdollSpawn::new("knight", Vec2::new(400.0, 300.0), 0.0)
        .with_force(Vec2::new(650.0, 900.0))
        .with_overkill(30.0)
        .with_seed(seed)
}

fn bench_single_ragdoll(c: &mut Criterion) {
    let rig = humanoid();
    let policy = PolicyTable::new();
    c.bench_function("ragdoll_humanoid_300_frames", |b| {
        b.iter(|| {
            let mut ragdoll =
                Ragdoll::new(&spawn(7), Some(&rig), &policy, RagdollConfig::new(), &mut NoOpObserver).unwrap();
            for _ in 0..300 {
                ragdoll.step(1.0 / 60.0, &mut NoOpObserver).unwrap();
            }
            ragdoll.main_body().body.pos
        });
    });
}

fn bench_registry(c: &mut Criterion) {
    let rig = humanoid();
    c.bench_function("registry_32_ragdolls_60_frames", |b| {
        b.iter(|| {
            let mut registry = RagdollRegistry::new(PolicyTable::new(), RagdollConfig::new());
            for key in 0..32u32 {
                registry.begin(key, &spawn(key as u64), Some(&rig), &mut NoOpObserver).unwrap();
            }
            for _ in 0..60 {
                registry.step_all(1.0 / 60.0, &mut NoOpObserver);
            }
            registry.len()
        });
    });
}

fn bench_apply_pose(c: &mut Criterion) {
    let mut rig = humanoid();
    let mut ragdoll =
        Ragdoll::new(&spawn(3), Some(&rig), &PolicyTable::new(), RagdollConfig::new(), &mut NoOpObserver).unwrap();
    for _ in 0..30 {
        ragdoll.step(1.0 / 60.0, &mut NoOpObserver).unwrap();
    }
    c.bench_function("apply_pose_humanoid", |b| {
        b.iter(|| ragdoll.apply_pose(&mut rig).unwrap());
    });
}

criterion_group!(benches, bench_single_ragdoll, bench_registry, bench_apply_pose);
criterion_main!(benches);
