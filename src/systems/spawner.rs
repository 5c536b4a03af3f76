//! Target placement and debris generation.
//!
//! These helpers only build `(Body, BodyKind)` pairs and update the spawn
//! grid; callers decide whether to spawn them through `Commands` (inside a
//! system) or directly on the `World`.
//!
//! # Debris layout
//!
//! A shattered target leaves `target_fragments` small cubes at the corners
//! `(±0.5, ±0.5, ±0.5)` of its draw transform (cycling through the eight
//! corners if more are configured) and `shards` disk wedges fanned out about
//! its Y axis. Every piece gets
//!
//! - velocity `debris_velocity + debris_spread * (rand - 0.5)` per component
//! - angular velocity in `[0, 1)`
//! - a random spin axis

use fastrand::Rng;
use glam::{Mat4, Vec3};
use log::debug;
use std::f32::consts::TAU;

use crate::components::body::Body;
use crate::components::bodykind::BodyKind;
use crate::game::{shard, target, target_fragment};
use crate::resources::simconfig::SimConfig;
use crate::resources::spawngrid::SpawnGrid;

const CORNER_OFFSETS: [Vec3; 8] = [
    Vec3::new(0.5, 0.5, 0.5),
    Vec3::new(-0.5, 0.5, 0.5),
    Vec3::new(0.5, 0.5, -0.5),
    Vec3::new(-0.5, 0.5, -0.5),
    Vec3::new(0.5, -0.5, 0.5),
    Vec3::new(-0.5, -0.5, 0.5),
    Vec3::new(0.5, -0.5, -0.5),
    Vec3::new(-0.5, -0.5, -0.5),
];

/// Claim free grid slots until `target_count` targets are live, returning the
/// targets to spawn. Stops early when the grid is full.
pub fn plan_targets(grid: &mut SpawnGrid, rng: &mut Rng, config: &SimConfig) -> Vec<(Body, BodyKind)> {
    let mut planned = Vec::new();
    while grid.occupied_count() < config.target_count {
        let Some(slot) = grid.pick_free(rng) else {
            debug!(
                "spawn grid full with {} of {} targets",
                grid.occupied_count(),
                config.target_count
            );
            break;
        };
        grid.occupy(slot);
        let depth = if config.depth_jitter > 0 {
            rng.u32(0..config.depth_jitter)
        } else {
            0
        };
        let position = config.grid_origin + Vec3::new(slot.column as f32, slot.row as f32, depth as f32);
        planned.push(target(position, Some(slot)));
    }
    planned
}

/// Debris thrown out by a target drawn at `draw_transform`.
pub fn shatter_debris(draw_transform: Mat4, config: &SimConfig, rng: &mut Rng) -> Vec<(Body, BodyKind)> {
    let mut debris = Vec::with_capacity(config.target_fragments + config.shards);
    for i in 0..config.target_fragments {
        let offset = CORNER_OFFSETS[i % CORNER_OFFSETS.len()];
        let transform = draw_transform * Mat4::from_translation(offset);
        let (velocity, spin, axis) = debris_motion(config, rng);
        debris.push(target_fragment(transform, velocity, spin, axis));
    }
    for i in 0..config.shards {
        let angle = i as f32 / config.shards as f32 * TAU;
        let transform = draw_transform * Mat4::from_rotation_y(angle);
        let (velocity, spin, axis) = debris_motion(config, rng);
        debris.push(shard(transform, velocity, spin, axis));
    }
    debris
}

fn debris_motion(config: &SimConfig, rng: &mut Rng) -> (Vec3, f32, Vec3) {
    let jitter = Vec3::new(rng.f32() - 0.5, rng.f32() - 0.5, rng.f32() - 0.5);
    let velocity = config.debris_velocity + jitter * config.debris_spread;
    let spin = rng.f32();
    (velocity, spin, random_spin_axis(rng))
}

/// Random unit axis. Falls back to +Y in the (unlikely) zero case.
pub fn random_spin_axis(rng: &mut Rng) -> Vec3 {
    let v = Vec3::new(rng.f32() - 0.5, rng.f32() - 0.5, rng.f32() - 0.5) * 3.0;
    v.normalize_or(Vec3::Y)
}
