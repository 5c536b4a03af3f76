//! Scene prefabs: the room, targets, projectiles and debris.
//!
//! Each constructor returns the `(Body, BodyKind)` pair for one entity, so the
//! same definitions serve `Commands::spawn` inside systems and
//! `World::spawn` from the host.

use bevy_ecs::prelude::*;
use glam::{Mat4, Vec3};

use crate::components::body::{Body, MaterialHandle, ShapeHandle, heading_transform};
use crate::components::bodykind::BodyKind;
use crate::components::boundingbox::BoundingBox;
use crate::resources::spawngrid::GridSlot;

pub const SHAPE_CUBE: ShapeHandle = ShapeHandle("cube");
pub const SHAPE_DISK: ShapeHandle = ShapeHandle("disk");
pub const SHAPE_DISK_SHARD: ShapeHandle = ShapeHandle("disk_shard");

pub const MATERIAL_WALL: MaterialHandle = MaterialHandle("wall");
pub const MATERIAL_BACK_WALL: MaterialHandle = MaterialHandle("back_wall");
pub const MATERIAL_FLOOR: MaterialHandle = MaterialHandle("floor");
pub const MATERIAL_CEILING: MaterialHandle = MaterialHandle("ceiling");
pub const MATERIAL_TARGET: MaterialHandle = MaterialHandle("target");
pub const MATERIAL_RECORD: MaterialHandle = MaterialHandle("record");
pub const MATERIAL_DEBRIS: MaterialHandle = MaterialHandle("debris");

pub const CUBE_BOUNDS: BoundingBox = BoundingBox {
    min: Vec3::new(-1.0, -1.0, -1.0),
    max: Vec3::new(1.0, 1.0, 1.0),
};

pub const DISK_BOUNDS: BoundingBox = BoundingBox {
    min: Vec3::new(-1.0, -0.05, -1.0),
    max: Vec3::new(1.0, 0.05, 1.0),
};

/// Where shots leave the player's turret.
pub const MUZZLE: Vec3 = Vec3::new(0.0, 1.3, 10.0);

/// Size of a target-fragment cube.
pub const TARGET_FRAGMENT_SIZE: f32 = 0.25;

/// Immovable slab with an inward-facing normal.
pub fn wall(material: MaterialHandle, size: Vec3, position: Vec3, normal: Vec3) -> (Body, BodyKind) {
    let body = Body::new(SHAPE_CUBE, material, size, CUBE_BOUNDS, false, false)
        .placed(Mat4::from_translation(position), Vec3::ZERO, 0.0, None);
    (body, BodyKind::Wall { normal })
}

/// The five walls enclosing the target range, open towards the player.
pub fn room() -> [(Body, BodyKind); 5] {
    [
        wall(MATERIAL_WALL, Vec3::new(1.0, 20.0, 50.0), Vec3::new(-31.0, 18.0, 45.0), Vec3::X),
        wall(MATERIAL_WALL, Vec3::new(1.0, 20.0, 50.0), Vec3::new(31.0, 18.0, 45.0), Vec3::NEG_X),
        wall(MATERIAL_BACK_WALL, Vec3::new(30.0, 20.0, 1.0), Vec3::new(0.0, 18.0, 95.0), Vec3::NEG_Z),
        wall(MATERIAL_FLOOR, Vec3::new(30.0, 1.0, 50.0), Vec3::new(0.0, -2.0, 45.0), Vec3::Y),
        wall(MATERIAL_CEILING, Vec3::new(30.0, 1.0, 50.0), Vec3::new(0.0, 38.0, 45.0), Vec3::NEG_Y),
    ]
}

/// Spawn the room's walls into `world`, returning their entities.
pub fn spawn_room(world: &mut World) -> Vec<Entity> {
    room()
        .into_iter()
        .map(|(body, kind)| world.spawn((body, kind)).id())
        .collect()
}

/// Resting, breakable cube held in place at `position`.
pub fn target(position: Vec3, slot: Option<GridSlot>) -> (Body, BodyKind) {
    let body = Body::new(SHAPE_CUBE, MATERIAL_TARGET, Vec3::ONE, CUBE_BOUNDS, false, true)
        .placed(Mat4::from_translation(position), Vec3::ZERO, 0.0, None);
    (body, BodyKind::Target { slot })
}

/// Disk fired from `origin` along `direction` at `speed`.
///
/// Returns `None` for a zero direction.
pub fn projectile(origin: Vec3, direction: Vec3, speed: f32, gravity: bool) -> Option<(Body, BodyKind)> {
    let direction = direction.try_normalize()?;
    let body = Body::new(SHAPE_DISK, MATERIAL_RECORD, Vec3::ONE, DISK_BOUNDS, true, true)
        .with_gravity(gravity)
        .placed(heading_transform(origin, direction), direction * speed, 0.0, None);
    Some((body, BodyKind::projectile()))
}

/// Small cube chunk of a shattered target.
pub fn target_fragment(transform: Mat4, velocity: Vec3, angular_velocity: f32, spin_axis: Vec3) -> (Body, BodyKind) {
    let body = Body::new(
        SHAPE_CUBE,
        MATERIAL_DEBRIS,
        Vec3::splat(TARGET_FRAGMENT_SIZE),
        CUBE_BOUNDS,
        true,
        false,
    )
    .with_gravity(true)
    .placed(transform, velocity, angular_velocity, Some(spin_axis));
    (body, BodyKind::TargetFragment)
}

/// Wedge of the shattered disk.
pub fn shard(transform: Mat4, velocity: Vec3, angular_velocity: f32, spin_axis: Vec3) -> (Body, BodyKind) {
    let body = Body::new(SHAPE_DISK_SHARD, MATERIAL_RECORD, Vec3::ONE, DISK_BOUNDS, true, false)
        .with_gravity(true)
        .placed(transform, velocity, angular_velocity, Some(spin_axis));
    (body, BodyKind::Fragment)
}
