mod common;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use common::Recorder;
use ragdoll::{
    compute_multipliers, BodyRef, ForceConfig, NoOpObserver, PolicyTable, Ragdoll, RagdollConfig, RagdollError,
    RagdollSpawn, Rig, Skeleton, Vec2, WeightClass,
};

const DT: f32 = 1.0 / 60.0;

fn spawn() -> RagdollSpawn<f32> {
    RagdollSpawn::new("knight", Vec2::new(400.0, 300.0), 0.0)
        .with_force(Vec2::new(300.0, 500.0))
        .with_overkill(20.0)
        .with_seed(11)
}

fn ragdoll(policy: &PolicyTable, config: RagdollConfig<f32>) -> Ragdoll<f32> {
    let rig = common::humanoid();
    Ragdoll::new(&spawn(), Some(&rig), policy, config, &mut NoOpObserver).unwrap()
}

#[test]
fn missing_rig_is_rejected() {
    let err = Ragdoll::<f32>::new::<Skeleton<f32>, _>(&spawn(), None, &PolicyTable::new(), RagdollConfig::new(), &mut NoOpObserver)
        .err()
        .unwrap();
    assert_eq!(err, RagdollError::MissingRig);
}

#[test]
fn empty_rig_is_rejected() {
    let rig = Skeleton::new(Vec2::zero());
    let err = Ragdoll::new(&spawn(), Some(&rig), &PolicyTable::new(), RagdollConfig::new(), &mut NoOpObserver)
        .err()
        .unwrap();
    assert_eq!(err, RagdollError::EmptyRig);
}

#[test]
fn non_finite_spawn_is_rejected() {
    let rig = common::humanoid();
    let bad = spawn().with_force(Vec2::new(f32::NAN, 0.0));
    let err = Ragdoll::new(&bad, Some(&rig), &PolicyTable::new(), RagdollConfig::new(), &mut NoOpObserver)
        .err()
        .unwrap();
    assert!(matches!(err, RagdollError::InvalidParameter(_)));
}

#[test]
fn baseline_kill_launch_velocity() {
    let rig = common::humanoid();
    let spawn = RagdollSpawn::new("knight", Vec2::new(400.0, 300.0), 0.0)
        .with_force(Vec2::new(700.0, 1200.0))
        .with_overkill(20.0);
    let ragdoll = Ragdoll::new(&spawn, Some(&rig), &PolicyTable::new(), RagdollConfig::new(), &mut NoOpObserver).unwrap();

    let m = compute_multipliers(WeightClass::Medium, 20.0f32, &ForceConfig::default());
    let vel = ragdoll.main_body().body.vel;
    assert_relative_eq!(vel.x, 700.0 * 0.8 * m.horizontal, epsilon = 1e-3);
    assert_relative_eq!(vel.y, 1200.0 * 0.8 * m.vertical, epsilon = 1e-3);
    assert_eq!(ragdoll.multipliers(), m);
}

#[test]
fn body_starts_at_center_of_mass() {
    let r = ragdoll(&PolicyTable::new(), RagdollConfig::new());
    assert_eq!(r.center_offset(), Vec2::new(0.0, 40.0));
    assert_eq!(r.main_body().body.pos, Vec2::new(400.0, 340.0));
}

#[test]
fn frame_hitch_takes_two_steps() {
    let mut r = ragdoll(&PolicyTable::new(), RagdollConfig::new());
    assert_eq!(r.step(10.0, &mut NoOpObserver).unwrap(), 2);
    assert_abs_diff_eq!(r.accumulator(), 0.0);
}

#[test]
fn step_cap_drops_leftover_time() {
    let mut r = ragdoll(&PolicyTable::new(), RagdollConfig::new().with_max_steps(1));
    assert_eq!(r.step(1.0 / 30.0, &mut NoOpObserver).unwrap(), 1);
    assert!(r.accumulator() < 1.0 / 60.0);
}

#[test]
fn small_deltas_accumulate() {
    let mut r = ragdoll(&PolicyTable::new(), RagdollConfig::new());
    assert_eq!(r.step(1.0 / 240.0, &mut NoOpObserver).unwrap(), 0);
    assert_eq!(r.step(1.0 / 240.0, &mut NoOpObserver).unwrap(), 0);
    assert_eq!(r.step(1.0 / 120.0 + 1e-4, &mut NoOpObserver).unwrap(), 1);
}

#[test]
fn negative_delta_does_nothing() {
    let mut r = ragdoll(&PolicyTable::new(), RagdollConfig::new());
    let before = r.main_body().body.pos;
    assert_eq!(r.step(-1.0, &mut NoOpObserver).unwrap(), 0);
    assert_eq!(r.main_body().body.pos, before);
}

#[test]
fn non_finite_delta_is_an_error() {
    let mut r = ragdoll(&PolicyTable::new(), RagdollConfig::new());
    assert!(r.step(f32::NAN, &mut NoOpObserver).is_err());
}

#[test]
fn corrupted_state_is_reported() {
    let mut r = ragdoll(&PolicyTable::new(), RagdollConfig::new());
    r.main_body_mut().body.vel.x = f32::INFINITY;
    let err = r.step(DT, &mut NoOpObserver).unwrap_err();
    assert_eq!(err, RagdollError::NonFiniteState { body: BodyRef::Main });
}

#[test]
fn falls_lands_and_settles() {
    let mut recorder = Recorder::default();
    let rig = common::humanoid();
    let mut r = Ragdoll::new(&spawn(), Some(&rig), &PolicyTable::new(), RagdollConfig::new(), &mut recorder).unwrap();

    for _ in 0..480 {
        r.step(DT, &mut recorder).unwrap();
        if r.has_settled() {
            break;
        }
    }

    assert!(r.has_settled());
    assert!(r.is_finished());
    assert!(!r.is_timed_out());
    assert!(r.main_body().on_ground());
    assert!(r.bones().all(|b| b.is_locked()));
    assert_eq!(recorder.count("created"), 1);
    assert_eq!(recorder.count("settled"), 1);
    assert!(recorder.count("collision knight main Ground") >= 1);
    assert_eq!(recorder.count("timeout"), 0);
}

#[test]
fn floating_entity_times_out() {
    let mut recorder = Recorder::default();
    let rig = common::humanoid();
    let policy = PolicyTable::new().with_zero_gravity("knight");
    let spawn = RagdollSpawn::new("knight", Vec2::new(400.0, 300.0), 0.0).with_seed(2);
    let config = RagdollConfig::new().with_settle_timeout(0.5);
    let mut r = Ragdoll::new(&spawn, Some(&rig), &policy, config, &mut recorder).unwrap();

    for _ in 0..60 {
        r.step(DT, &mut recorder).unwrap();
    }

    assert!(!r.has_settled());
    assert!(r.is_timed_out());
    assert!(r.is_finished());
    assert_eq!(recorder.count("timeout"), 1);
    // no gravity and no force: the body hangs where it died
    assert_abs_diff_eq!(r.main_body().body.pos.y, 340.0, epsilon = 1e-3);
}

#[test]
fn ground_offset_shifts_ground() {
    let policy = PolicyTable::new().with_ground_offset("knight", 25.0);
    let r = ragdoll(&policy, RagdollConfig::new());
    assert_eq!(r.ground_y(), 25.0);
    assert_eq!(r.main_body().ground_y(), 25.0);
}

#[test]
fn pose_follows_simulation() {
    let mut rig = common::humanoid();
    let mut r = ragdoll(&PolicyTable::new(), RagdollConfig::new());
    for _ in 0..20 {
        r.step(DT, &mut NoOpObserver).unwrap();
    }

    r.apply_pose(&mut rig).unwrap();

    let main = r.main_body();
    assert_eq!(rig.root_position(), main.body.pos - r.center_offset());
    assert_eq!(rig.root_rotation(), main.body.rotation);
    for bone in r.bones() {
        assert_eq!(rig.bone_rotation(bone.bone()), Some(bone.setup_rotation() + bone.rotation()));
    }
    assert_eq!(rig.is_slot_visible("head-slot"), Some(false));
    assert_eq!(rig.is_slot_visible("hand-slot"), Some(false));
    assert_eq!(rig.is_slot_visible("torso-slot"), Some(true));
}

#[test]
fn dispose_restores_rest_pose() {
    let mut recorder = Recorder::default();
    let mut rig = common::humanoid();
    let mut r = ragdoll(&PolicyTable::new(), RagdollConfig::new());
    for _ in 0..20 {
        r.step(DT, &mut recorder).unwrap();
    }
    r.apply_pose(&mut rig).unwrap();

    r.dispose(&mut rig, &mut recorder).unwrap();

    assert_eq!(rig.root_position(), Vec2::new(400.0, 300.0));
    assert_eq!(rig.root_rotation(), 0.0);
    let leg = rig.find_bone("leg_l").unwrap();
    assert_eq!(rig.bone_rotation(leg), Some(270.0));
    assert_eq!(rig.is_slot_visible("hand-slot"), Some(true));
    assert_eq!(recorder.count("disposed knight"), 1);
}

#[test]
fn dispose_restores_a_rotated_root() {
    let mut rig = common::humanoid().with_root_rotation(15.0);
    let mut r = ragdoll(&PolicyTable::new(), RagdollConfig::new());
    for _ in 0..20 {
        r.step(DT, &mut NoOpObserver).unwrap();
    }
    r.apply_pose(&mut rig).unwrap();
    assert_ne!(rig.root_rotation(), 15.0);

    r.dispose(&mut rig, &mut NoOpObserver).unwrap();

    assert_eq!(rig.root_rotation(), 15.0);
    assert_eq!(rig.root_position(), Vec2::new(400.0, 300.0));
}

#[test]
fn pose_into_incompatible_rig_fails() {
    let r = ragdoll(&PolicyTable::new(), RagdollConfig::new());
    let mut other = Skeleton::new(Vec2::zero());
    other.add_bone("root", None, Vec2::zero(), 0.0).unwrap();
    assert!(matches!(r.apply_pose(&mut other), Err(RagdollError::PoseFailed { .. })));
}
