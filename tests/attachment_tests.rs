mod common;

use approx::assert_abs_diff_eq;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use ragdoll::{
    Attachment, AttachmentConfig, BoneId, BoneTransform, Bounds, DetachOverride, NoOpObserver, PolicyTable,
    Ragdoll, RagdollConfig, RagdollSpawn, Rig, SlotInfo, Surface, Vec2,
};

const DT: f32 = 1.0 / 60.0;

fn loose(y: f32) -> Attachment<f32> {
    let slot = SlotInfo { slot: "hand-slot".into(), attachment: "sword".into(), bone: BoneId(0) };
    let snapshot = BoneTransform { position: Vec2::new(500.0, y), rotation: 30.0, scale: Vec2::new(1.0, 1.0) };
    Attachment::new(&slot, snapshot, None)
}

fn spawn(entity: &str) -> RagdollSpawn<f32> {
    RagdollSpawn::new(entity, Vec2::new(400.0, 300.0), 0.0)
        .with_force(Vec2::new(500.0, 800.0))
        .with_overkill(10.0)
        .with_seed(3)
}

fn build(entity: &str, policy: &PolicyTable) -> Ragdoll<f32> {
    let rig = common::humanoid();
    Ragdoll::new(&spawn(entity), Some(&rig), policy, RagdollConfig::new(), &mut NoOpObserver).unwrap()
}

#[test]
fn starts_at_bone_snapshot() {
    let a = loose(100.0);
    assert_eq!(a.body.pos, Vec2::new(500.0, 100.0));
    assert_eq!(a.body.rotation, 30.0);
    assert_eq!(a.slot(), "hand-slot");
    assert_eq!(a.name(), "sword");
}

#[test]
fn bounces_on_hard_landing() {
    let mut rng = Pcg32::seed_from_u64(9);
    let config = AttachmentConfig::default();
    let mut a = loose(1.0);
    a.body.apply_impulse(Vec2::new(0.0, -300.0), 0.0);

    let impact = a.update(DT, true, 0.0, &Bounds::default(), &config, &mut rng).expect("impact");

    assert_eq!(impact.surface, Surface::Ground);
    assert!(impact.bounced);
    assert_abs_diff_eq!(a.body.vel.y, 135.0, epsilon = 1e-3);
}

#[test]
fn comes_to_rest_on_the_ground() {
    let mut rng = Pcg32::seed_from_u64(9);
    let config = AttachmentConfig::default();
    let mut a = loose(0.0);
    a.body.apply_impulse(Vec2::new(40.0, 0.0), 90.0);
    for _ in 0..120 {
        a.update(DT, false, 0.0, &Bounds::default(), &config, &mut rng);
    }
    assert!(a.on_ground());
    assert!(a.has_settled(&config));
}

#[test]
fn only_keyword_attachments_detach() {
    let ragdoll = build("knight", &PolicyTable::new());
    let mut names: Vec<&str> = ragdoll.attachments().map(|a| a.name()).collect();
    names.sort();
    assert_eq!(names, vec!["helmet", "sword"]);
}

#[test]
fn detach_overrides_adjust_keywords() {
    let rule = DetachOverride { add: vec!["arm_image".into()], remove: vec!["helmet".into()], disabled: false };
    let ragdoll = build("knight", &PolicyTable::new().with_detach_override("knight", rule));
    let mut names: Vec<&str> = ragdoll.attachments().map(|a| a.name()).collect();
    names.sort();
    assert_eq!(names, vec!["arm_image", "sword"]);

    let off = DetachOverride { disabled: true, ..Default::default() };
    let ragdoll = build("knight", &PolicyTable::new().with_detach_override("knight", off));
    assert_eq!(ragdoll.attachments().count(), 0);
}

#[test]
fn parents_launch_before_children() {
    // helmet is bound before sword in the rig; the link reverses the order
    let policy = PolicyTable::new().with_attachment_parent("knight", "helmet", "sword");
    let ragdoll = build("knight", &policy);

    let order: Vec<&str> = ragdoll.attachments().map(|a| a.name()).collect();
    assert_eq!(order, vec!["sword", "helmet"]);

    let helmet = ragdoll.attachment("helmet").unwrap();
    let sword = ragdoll.attachment("sword").unwrap();
    assert_eq!(helmet.parent(), Some("sword"));
    assert_eq!(sword.parent(), None);
    // the child inherits the parent's launch plus a quarter of the jitter
    assert!(helmet.body.vel.distance(sword.body.vel) < 2.0 * 120.0 * 0.25 * 1.5);
}

#[test]
fn link_to_a_piece_that_stays_attached_is_dropped() {
    let policy = PolicyTable::new().with_attachment_parent("knight", "sword", "torso_image");
    let ragdoll = build("knight", &policy);
    assert_eq!(ragdoll.attachment("sword").unwrap().parent(), None);
}

#[test]
fn cyclic_links_still_build_every_piece() {
    let policy = PolicyTable::new()
        .with_attachment_parent("knight", "sword", "helmet")
        .with_attachment_parent("knight", "helmet", "sword");
    let ragdoll = build("knight", &policy);
    assert_eq!(ragdoll.attachments().count(), 2);
    let roots = ragdoll.attachments().filter(|a| a.parent().is_none()).count();
    assert_eq!(roots, 1);
}

#[test]
fn attachments_move_independently() {
    let rig = common::humanoid();
    let policy = PolicyTable::new();
    let mut a = Ragdoll::new(&spawn("knight"), Some(&rig), &policy, RagdollConfig::new(), &mut NoOpObserver).unwrap();
    let mut b = Ragdoll::new(&spawn("knight"), Some(&rig), &policy, RagdollConfig::new(), &mut NoOpObserver).unwrap();

    // shove one piece in one ragdoll only
    a.attachment_mut("sword").unwrap().body.apply_impulse(Vec2::new(0.0, 2000.0), 0.0);
    for _ in 0..30 {
        a.step(DT, &mut NoOpObserver).unwrap();
        b.step(DT, &mut NoOpObserver).unwrap();
    }

    assert_ne!(a.attachment("sword").unwrap().body.pos, b.attachment("sword").unwrap().body.pos);
    assert_eq!(a.attachment("helmet").unwrap().body.pos, b.attachment("helmet").unwrap().body.pos);
    assert_eq!(a.main_body().body.pos, b.main_body().body.pos);
}

#[test]
fn linked_child_ignores_its_parent() {
    let policy = PolicyTable::new().with_attachment_parent("knight", "helmet", "sword");
    let mut shoved = build("knight", &policy);
    let mut twin = build("knight", &policy);
    assert_eq!(shoved.attachment("helmet").unwrap().parent(), Some("sword"));

    let helmet_before = shoved.attachment("helmet").unwrap().body;
    shoved.attachment_mut("sword").unwrap().body.vel = Vec2::zero();
    assert_eq!(shoved.attachment("helmet").unwrap().body, helmet_before);

    for _ in 0..30 {
        shoved.step(DT, &mut NoOpObserver).unwrap();
        twin.step(DT, &mut NoOpObserver).unwrap();
    }

    assert_ne!(shoved.attachment("sword").unwrap().body, twin.attachment("sword").unwrap().body);
    assert_eq!(shoved.attachment("helmet").unwrap().body, twin.attachment("helmet").unwrap().body);
}

#[test]
fn snapshot_records_source_bone() {
    let rig = common::humanoid();
    let ragdoll = build("knight", &PolicyTable::new());
    let sword = ragdoll.attachment("sword").unwrap();
    let hand = rig.find_bone("hand_l").unwrap();
    assert_eq!(sword.bone(), hand);
    assert_eq!(sword.snapshot().position, rig.world_transform(hand).unwrap().position);
}
