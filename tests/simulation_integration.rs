//! End-to-end tests driving [`Simulation`] through `simulate` calls.
//!
//! # Test Categories
//!
//! 1. **Clock** - determinism, catch-up cap, blend factor range
//! 2. **Dispatch** - symmetric detection, asymmetric response, reflection
//! 3. **Rules** - shattering, cleanup of resting fragments, boundary despawn
//! 4. **Session** - respawn, win, timeout, magazine, player hit
//! 5. **Configuration** - invalid settings are rejected

use bevy_ecs::prelude::*;
use glam::{Mat4, Vec3};

use shatterbox::components::body::Body;
use shatterbox::components::bodykind::BodyKind;
use shatterbox::events::gameplay::SimEvent;
use shatterbox::game;
use shatterbox::resources::session::Outcome;
use shatterbox::resources::simconfig::{ConfigError, SimConfig};
use shatterbox::resources::spawngrid::{GridSlot, SpawnGrid};
use shatterbox::simulation::Simulation;

const EPSILON: f32 = 1e-5;
const DT: f32 = 0.05;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// Defaults, minus the initial targets and the round time limit.
fn quiet_config() -> SimConfig {
    let mut config = SimConfig::new();
    config.target_count = 0;
    config.time_limit = 0.0;
    config
}

fn sim(config: SimConfig) -> Simulation {
    Simulation::new(config).expect("config should validate")
}

/// Run `steps` fixed steps one call at a time, collecting every message.
fn run_steps(sim: &mut Simulation, steps: usize) -> Vec<SimEvent> {
    let mut events = Vec::new();
    for _ in 0..steps {
        sim.simulate(DT);
        events.extend(sim.drain_events());
    }
    events
}

fn count_kind(sim: &mut Simulation, pred: impl Fn(&BodyKind) -> bool) -> usize {
    sim.bodies().iter().filter(|(_, _, kind)| pred(kind)).count()
}

fn is_wall(kind: &BodyKind) -> bool {
    matches!(kind, BodyKind::Wall { .. })
}

fn is_target(kind: &BodyKind) -> bool {
    matches!(kind, BodyKind::Target { .. })
}

fn projectile(sim: &mut Simulation, origin: Vec3, direction: Vec3) -> Entity {
    let (body, kind) = game::projectile(origin, direction, 4.0, false).unwrap();
    sim.spawn_body(body, kind)
}

fn wall(sim: &mut Simulation, position: Vec3, normal: Vec3) -> Entity {
    let (body, kind) = game::wall(game::MATERIAL_WALL, Vec3::new(5.0, 5.0, 1.0), position, normal);
    sim.spawn_body(body, kind)
}

// =============================================================================
// CATEGORY 1: Clock
// =============================================================================

#[test]
fn stepping_is_independent_of_frame_slicing() {
    let mut config = quiet_config();
    config.dt = 1.0 / 16.0;
    config.max_frame_time = 0.5;

    let mut fine = sim(config.clone());
    let mut coarse = sim(config);
    let start = Mat4::from_translation(Vec3::new(0.0, 5.0, 30.0));
    let velocity = Vec3::new(1.0, 0.5, -3.0);
    let body = Body::new(game::SHAPE_CUBE, game::MATERIAL_DEBRIS, Vec3::ONE, game::CUBE_BOUNDS, true, false)
        .placed(start, velocity, 0.7, Some(Vec3::Y));
    let a = fine.spawn_body(body.clone(), BodyKind::Fragment);
    let b = coarse.spawn_body(body, BodyKind::Fragment);

    let fine_steps: u32 = (0..40).map(|_| fine.simulate(0.125)).sum();
    let coarse_steps: u32 = (0..20).map(|_| coarse.simulate(0.25)).sum();

    assert_eq!(fine_steps, 80);
    assert_eq!(coarse_steps, 80);
    assert_eq!(fine.clock().steps_taken, coarse.clock().steps_taken);
    assert_eq!(fine.clock().t, coarse.clock().t);
    assert!(approx_eq(fine.clock().t, 5.0));
    assert_eq!(fine.body(a).unwrap().center, coarse.body(b).unwrap().center);
    assert_eq!(fine.body(a).unwrap().orientation, coarse.body(b).unwrap().orientation);
}

#[test]
fn long_frames_are_capped() {
    let mut config = quiet_config();
    config.dt = 1.0 / 16.0;
    config.max_frame_time = 0.25;
    let mut sim = sim(config);

    assert_eq!(sim.simulate(100.0), 4);
    assert!(approx_eq(sim.clock().t, 0.25));
    assert!(sim.clock().accumulator.abs() < EPSILON);
}

#[test]
fn alpha_stays_in_unit_interval() {
    let mut sim = sim(quiet_config());
    for frame in [0.01, 0.033, 0.07, 0.2, 0.016, 0.049, 0.051, 1.0, 0.0, 0.0333] {
        sim.simulate(frame);
        let alpha = sim.clock().alpha;
        assert!((0.0..1.0).contains(&alpha), "alpha {alpha} after frame {frame}");
    }
}

#[test]
fn zero_time_scale_freezes_the_world() {
    let mut sim = sim(quiet_config());
    let p = projectile(&mut sim, Vec3::new(0.0, 5.0, 20.0), Vec3::Z);
    sim.set_time_scale(0.0);
    assert_eq!(sim.simulate(0.1), 0);
    assert_eq!(sim.body(p).unwrap().center, Vec3::new(0.0, 5.0, 20.0));
}

#[test]
fn infinite_frame_while_paused_does_not_poison_the_clock() {
    let mut sim = sim(quiet_config());
    let p = projectile(&mut sim, Vec3::new(0.0, 5.0, 20.0), Vec3::Z);
    sim.set_time_scale(0.0);
    assert_eq!(sim.simulate(f32::INFINITY), 0);
    sim.set_time_scale(1.0);

    let steps: u32 = (0..10).map(|_| sim.simulate(DT)).sum();

    assert_eq!(steps, 10);
    assert!(sim.clock().accumulator.is_finite());
    assert!(sim.clock().alpha.is_finite());
    let drawn = sim.drawables().into_iter().find(|d| d.entity == p).unwrap();
    assert!(drawn.transform.is_finite());
}

// =============================================================================
// CATEGORY 2: Dispatch
// =============================================================================

#[test]
fn detection_is_symmetric_but_only_the_projectile_responds() {
    let mut sim = sim(quiet_config());
    let w = wall(&mut sim, Vec3::new(0.0, 5.0, 20.0), Vec3::Z);
    let p = projectile(&mut sim, Vec3::new(0.0, 5.0, 20.5), Vec3::NEG_Z);

    {
        let pb = sim.body(p).unwrap();
        let wb = sim.body(w).unwrap();
        assert!(pb.is_colliding_with(wb));
        assert!(wb.is_colliding_with(pb));
    }
    let wall_before = sim.body(w).unwrap().clone();

    assert_eq!(sim.simulate(DT), 1);

    let pb = sim.body(p).unwrap();
    assert!(pb.linear_velocity.abs_diff_eq(Vec3::new(0.0, 0.0, 4.0), EPSILON));
    assert_eq!(sim.kind(p), Some(BodyKind::Projectile { last_collided: Some(w) }));
    let wall_after = sim.body(w).unwrap();
    assert_eq!(wall_after.center, wall_before.center);
    assert_eq!(wall_after.linear_velocity, Vec3::ZERO);
}

#[test]
fn reflection_preserves_speed_and_flips_normal_component() {
    let mut sim = sim(quiet_config());
    let n = Vec3::new(0.0, 1.0, 1.0).normalize();
    wall(&mut sim, Vec3::new(0.0, 5.0, 20.0), n);
    let incoming = Vec3::new(1.0, -2.0, -3.0).normalize() * 4.0;
    let p = projectile(&mut sim, Vec3::new(0.0, 5.0, 20.5), incoming);

    sim.simulate(DT);

    let v = sim.body(p).unwrap().linear_velocity;
    assert!(approx_eq(v.dot(n), -incoming.dot(n)));
    assert!(approx_eq(v.length(), incoming.length()));
}

#[test]
fn projectile_reflects_once_per_wall_while_overlapping() {
    let mut sim = sim(quiet_config());
    wall(&mut sim, Vec3::new(0.0, 5.0, 20.0), Vec3::Z);
    let p = projectile(&mut sim, Vec3::new(0.0, 5.0, 20.5), Vec3::NEG_Z);

    run_steps(&mut sim, 4);

    let body = sim.body(p).unwrap();
    assert!(body.linear_velocity.abs_diff_eq(Vec3::new(0.0, 0.0, 4.0), EPSILON));
    assert!(body.center.z > 20.5);
}

// =============================================================================
// CATEGORY 3: Rules
// =============================================================================

#[test]
fn projectile_and_resting_target_shatter_into_debris() {
    let mut sim = sim(quiet_config());
    sim.start_round();
    let slot = GridSlot::new(4, 2);
    sim.world_mut().resource_mut::<SpawnGrid>().occupy(slot);
    let (body, kind) = game::target(Vec3::new(0.0, 10.0, 40.0), Some(slot));
    let t = sim.spawn_body(body, kind);
    let p = projectile(&mut sim, Vec3::new(0.0, 10.0, 38.5), Vec3::Z);
    sim.drain_events();

    let events = run_steps(&mut sim, 1);

    assert!(sim.body(t).is_none());
    assert!(sim.body(p).is_none());
    assert!(!sim.grid().is_occupied(slot));
    assert_eq!(sim.session().score, 12);
    assert_eq!(sim.session().targets_destroyed, 1);
    assert_eq!(count_kind(&mut sim, |k| *k == BodyKind::TargetFragment), 8);
    assert_eq!(count_kind(&mut sim, |k| *k == BodyKind::Fragment), 6);
    assert_eq!(count_kind(&mut sim, is_wall), 5);
    assert!(events.iter().any(|e| matches!(
        e,
        SimEvent::TargetDestroyed { target, by, score: 12, .. } if *target == t && *by == p
    )));
}

#[test]
fn one_projectile_breaks_every_target_it_overlaps() {
    let mut sim = sim(quiet_config());
    sim.start_round();
    let left_slot = GridSlot::new(15, 5);
    let right_slot = GridSlot::new(16, 5);
    let mut targets = Vec::new();
    for (slot, x) in [(left_slot, 0.0), (right_slot, 1.0)] {
        sim.world_mut().resource_mut::<SpawnGrid>().occupy(slot);
        let (body, kind) = game::target(Vec3::new(x, 10.0, 40.0), Some(slot));
        targets.push(sim.spawn_body(body, kind));
    }
    projectile(&mut sim, Vec3::new(0.5, 10.0, 38.5), Vec3::Z);

    let events = run_steps(&mut sim, 1);

    assert_eq!(count_kind(&mut sim, is_target), 0);
    assert_eq!(sim.grid().occupied_count(), 0);
    assert_eq!(sim.session().score, 24);
    assert_eq!(sim.session().targets_destroyed, 2);
    assert_eq!(count_kind(&mut sim, |k| *k == BodyKind::TargetFragment), 16);
    assert_eq!(count_kind(&mut sim, |k| *k == BodyKind::Fragment), 12);
    let mut destroyed: Vec<Entity> = events
        .iter()
        .filter_map(|e| match e {
            SimEvent::TargetDestroyed { target, .. } => Some(*target),
            _ => None,
        })
        .collect();
    destroyed.sort();
    targets.sort();
    assert_eq!(destroyed, targets);
}

#[test]
fn winning_shot_stops_breaking_further_targets() {
    let mut config = quiet_config();
    config.win_score = 12;
    let mut sim = sim(config);
    sim.start_round();
    for x in [0.0, 1.0] {
        let (body, kind) = game::target(Vec3::new(x, 10.0, 40.0), None);
        sim.spawn_body(body, kind);
    }
    projectile(&mut sim, Vec3::new(0.5, 10.0, 38.5), Vec3::Z);

    let events = run_steps(&mut sim, 1);

    let destroyed = events
        .iter()
        .filter(|e| matches!(e, SimEvent::TargetDestroyed { .. }))
        .count();
    assert_eq!(destroyed, 1);
    assert_eq!(sim.session().targets_destroyed, 1);
    assert_eq!(
        events.last(),
        Some(&SimEvent::GameOver {
            outcome: Outcome::Won,
            score: 12
        })
    );
    assert_eq!(sim.body_count(), 0);
}

#[test]
fn moving_target_is_not_shattered() {
    let mut sim = sim(quiet_config());
    sim.start_round();
    let (mut body, kind) = game::target(Vec3::new(0.0, 10.0, 40.0), None);
    body.linear_velocity = Vec3::new(0.0, 0.0, 0.1);
    let t = sim.spawn_body(body, kind);
    projectile(&mut sim, Vec3::new(0.0, 10.0, 38.5), Vec3::Z);

    run_steps(&mut sim, 1);

    assert!(sim.body(t).is_some());
    assert_eq!(sim.session().score, 0);
}

#[test]
fn resting_fragment_on_a_wall_is_cleaned_up_but_walls_stay() {
    let mut sim = sim(quiet_config());
    sim.setup_room();
    let (body, kind) = game::target_fragment(
        Mat4::from_translation(Vec3::new(0.0, -1.0, 40.0)),
        Vec3::ZERO,
        0.0,
        Vec3::Y,
    );
    let f = sim.spawn_body(body, kind);

    let events = run_steps(&mut sim, 3);

    assert!(sim.body(f).is_none());
    assert_eq!(count_kind(&mut sim, is_wall), 5);
    assert!(events.iter().all(|e| !matches!(e, SimEvent::BodyExpired { .. })));
}

#[test]
fn falling_fragment_lands_on_the_floor() {
    let mut sim = sim(quiet_config());
    sim.setup_room();
    let (body, kind) = game::shard(
        Mat4::from_translation(Vec3::new(0.0, 1.0, 40.0)),
        Vec3::new(0.0, -2.0, 0.0),
        0.0,
        Vec3::Y,
    );
    let f = sim.spawn_body(body, kind);

    let mut lowest = f32::MAX;
    let mut events = Vec::new();
    for _ in 0..60 {
        let Some(body) = sim.body(f) else { break };
        lowest = lowest.min(body.center.y);
        events.extend(run_steps(&mut sim, 1));
    }

    assert!(sim.body(f).is_none(), "fragment should have come to rest and been removed");
    assert!(lowest > -1.5, "fragment sank to {lowest}");
    assert!(events.iter().all(|e| !matches!(e, SimEvent::BodyExpired { .. })));
}

#[test]
fn bodies_leaving_the_play_volume_expire() {
    let mut sim = sim(quiet_config());
    let front = projectile(&mut sim, Vec3::new(0.0, 5.0, -24.95), Vec3::NEG_Z);
    let below = projectile(&mut sim, Vec3::new(10.0, -19.95, 40.0), Vec3::NEG_Y);
    let behind = projectile(&mut sim, Vec3::new(-10.0, 5.0, 119.95), Vec3::Z);
    let inside = projectile(&mut sim, Vec3::new(20.0, 5.0, 40.0), Vec3::X);

    let events = run_steps(&mut sim, 2);

    for e in [front, below, behind] {
        assert!(sim.body(e).is_none());
        assert!(events.iter().any(|ev| matches!(
            ev,
            SimEvent::BodyExpired { entity, kind: "projectile", .. } if *entity == e
        )));
    }
    assert!(sim.body(inside).is_some());
}

// =============================================================================
// CATEGORY 4: Session
// =============================================================================

#[test]
fn start_round_spawns_room_and_targets() {
    let mut sim = sim(SimConfig::new());
    sim.start_round();
    assert!(sim.session().in_progress());
    assert_eq!(count_kind(&mut sim, is_wall), 5);
    assert_eq!(count_kind(&mut sim, is_target), 20);
    assert_eq!(sim.grid().occupied_count(), 20);
}

#[test]
fn respawn_timer_refills_targets() {
    let mut config = quiet_config();
    config.target_count = 3;
    config.respawn_interval = 1.0;
    let mut sim = sim(config);
    sim.start_round();

    let (_, target, _) = sim
        .bodies()
        .into_iter()
        .find(|(_, _, kind)| is_target(kind))
        .unwrap();
    projectile(&mut sim, target.center - Vec3::new(0.0, 0.0, 1.5), Vec3::Z);
    run_steps(&mut sim, 1);
    assert_eq!(count_kind(&mut sim, is_target), 2);
    assert_eq!(sim.grid().occupied_count(), 2);

    run_steps(&mut sim, 25);
    assert_eq!(count_kind(&mut sim, is_target), 3);
    assert_eq!(sim.grid().occupied_count(), 3);
}

#[test]
fn reaching_the_win_score_ends_the_round() {
    let mut config = quiet_config();
    config.win_score = 12;
    let mut sim = sim(config);
    sim.start_round();
    let (body, kind) = game::target(Vec3::new(0.0, 10.0, 40.0), None);
    sim.spawn_body(body, kind);
    projectile(&mut sim, Vec3::new(0.0, 10.0, 38.5), Vec3::Z);

    let events = run_steps(&mut sim, 1);

    assert_eq!(sim.session().outcome, Some(Outcome::Won));
    assert_eq!(sim.body_count(), 0);
    assert_eq!(sim.grid().occupied_count(), 0);
    assert_eq!(
        events.last(),
        Some(&SimEvent::GameOver {
            outcome: Outcome::Won,
            score: 12
        })
    );
}

#[test]
fn running_out_of_time_loses() {
    let mut config = SimConfig::new();
    config.target_count = 2;
    config.time_limit = 0.2;
    let mut sim = sim(config);
    sim.start_round();

    let events = run_steps(&mut sim, 10);

    assert_eq!(sim.session().outcome, Some(Outcome::Lost));
    assert_eq!(sim.body_count(), 0);
    let game_overs = events
        .iter()
        .filter(|e| matches!(e, SimEvent::GameOver { outcome: Outcome::Lost, .. }))
        .count();
    assert_eq!(game_overs, 1);
}

#[test]
fn magazine_limits_and_recharges_shots() {
    let mut sim = sim(quiet_config());
    sim.start_round();

    assert!(sim.fire_forward().is_some());
    assert!(sim.fire_forward().is_some());
    assert!(sim.fire_forward().is_some());
    assert!(sim.fire_forward().is_none());
    assert_eq!(sim.session().score, -6);

    let shots: Vec<u32> = sim
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            SimEvent::ShotFired { shots_left, .. } => Some(shots_left),
            _ => None,
        })
        .collect();
    assert_eq!(shots, vec![2, 1, 0]);

    run_steps(&mut sim, 170);
    assert_eq!(sim.session().shots, 1);
    assert!(sim.fire_forward().is_some());
}

#[test]
fn no_shots_outside_a_round() {
    let mut sim = sim(quiet_config());
    assert!(sim.fire_forward().is_none());
    assert_eq!(sim.body_count(), 0);
}

#[test]
fn gravity_toggle_applies_to_new_projectiles() {
    let mut sim = sim(quiet_config());
    sim.start_round();
    let level = sim.fire_forward().unwrap();
    sim.set_gravity(true);
    let falling = sim.fire_forward().unwrap();

    run_steps(&mut sim, 4);

    assert_eq!(sim.body(level).unwrap().linear_velocity.y, 0.0);
    assert!(sim.body(falling).unwrap().linear_velocity.y < 0.0);
}

#[test]
fn projectile_reaching_the_player_loses_the_round() {
    let mut sim = sim(quiet_config());
    sim.start_round();
    let p = projectile(&mut sim, Vec3::new(0.0, 0.5, 3.0), Vec3::NEG_Z);

    let events = run_steps(&mut sim, 30);

    assert!(events.contains(&SimEvent::PlayerHit { by: p }));
    assert_eq!(sim.session().outcome, Some(Outcome::Lost));
    assert_eq!(sim.body_count(), 0);
}

#[test]
fn reset_returns_to_a_fresh_state() {
    let mut sim = sim(SimConfig::new());
    sim.start_round();
    sim.fire_forward();
    run_steps(&mut sim, 10);

    sim.reset();

    assert_eq!(sim.body_count(), 0);
    assert_eq!(sim.clock().steps_taken, 0);
    assert_eq!(sim.clock().t, 0.0);
    assert_eq!(sim.session().score, 0);
    assert!(!sim.session().in_progress());
    assert_eq!(sim.grid().occupied_count(), 0);
    assert!(sim.drain_events().is_empty());
}

#[test]
fn drawables_follow_blended_transforms() {
    let mut sim = sim(quiet_config());
    let p = projectile(&mut sim, Vec3::new(0.0, 5.0, 20.0), Vec3::Z);

    sim.simulate(0.075);

    let drawn = sim.drawables().into_iter().find(|d| d.entity == p).unwrap();
    let z = drawn.transform.w_axis.z;
    // One step taken and half a step left over: drawn halfway between the
    // previous state (z = 20) and the current one.
    assert!(approx_eq(z, 20.0 + 4.0 * DT * 0.5), "drawn at z={z}");
    assert_eq!(drawn.shape, game::SHAPE_DISK);
}

// =============================================================================
// CATEGORY 5: Configuration
// =============================================================================

#[test]
fn invalid_configuration_is_rejected() {
    let mut config = SimConfig::new();
    config.dt = 0.0;
    assert!(matches!(Simulation::new(config), Err(ConfigError::InvalidStep(_))));

    let mut config = SimConfig::new();
    config.dt = f32::INFINITY;
    assert!(matches!(Simulation::new(config), Err(ConfigError::InvalidStep(_))));

    let mut config = SimConfig::new();
    config.grid_columns = 0;
    assert!(matches!(Simulation::new(config), Err(ConfigError::EmptyGrid { .. })));

    let mut config = SimConfig::new();
    config.world_bounds.min_z = 200.0;
    assert!(matches!(Simulation::new(config), Err(ConfigError::InvalidWorldBounds(_))));
}
