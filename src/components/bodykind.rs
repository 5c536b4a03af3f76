//! Body kinds and their collision responses.
//!
//! The set of kinds is closed, so responses are a single `match` in
//! [`BodyKind::perform_action`] rather than per-type trait objects. The
//! response is asymmetric by design: when `a` and `b` overlap, `a`'s kind
//! decides what happens to `a`, and `b` gets its own turn when the scan
//! reaches the `(b, a)` pair.
//!
//! | Kind | Response to `other` |
//! |---|---|
//! | Projectile | reflect off `other`'s surface normal, once per wall |
//! | Wall | none |
//! | Target | none |
//! | Fragment / TargetFragment | stop when `other` is a resting, non-breakable body with a normal |
//!
//! Rules that involve both bodies at once (shattering, cleanup of spent
//! props) live in [`crate::systems::collision`].

use bevy_ecs::prelude::{Component, Entity};
use glam::Vec3;

use crate::components::body::{Body, heading_transform};
use crate::resources::spawngrid::GridSlot;

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub enum BodyKind {
    /// Bouncing shot. Remembers the last body it reflected off so it does not
    /// bounce again while still overlapping it.
    Projectile { last_collided: Option<Entity> },
    /// Immovable collider that supplies a surface normal.
    Wall { normal: Vec3 },
    /// Passive breakable body occupying a spawn-grid slot.
    Target { slot: Option<GridSlot> },
    /// Disk shard thrown out by a shattered target.
    Fragment,
    /// Cube chunk thrown out by a shattered target.
    TargetFragment,
}

/// What a body knows about the other participant of a collision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub entity: Entity,
    pub breakable: bool,
    pub at_rest: bool,
    pub normal: Option<Vec3>,
}

impl Contact {
    pub fn new(entity: Entity, body: &Body, kind: &BodyKind) -> Self {
        Self {
            entity,
            breakable: body.breakable,
            at_rest: body.is_at_rest(),
            normal: kind.normal(),
        }
    }
}

impl BodyKind {
    pub fn projectile() -> Self {
        BodyKind::Projectile {
            last_collided: None,
        }
    }

    /// Surface normal exposed to other bodies, if any.
    pub fn normal(&self) -> Option<Vec3> {
        match self {
            BodyKind::Wall { normal } => Some(*normal),
            _ => None,
        }
    }

    /// Grid slot held by a target.
    pub fn slot(&self) -> Option<GridSlot> {
        match self {
            BodyKind::Target { slot } => *slot,
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BodyKind::Projectile { .. } => "projectile",
            BodyKind::Wall { .. } => "wall",
            BodyKind::Target { .. } => "target",
            BodyKind::Fragment => "fragment",
            BodyKind::TargetFragment => "target_fragment",
        }
    }

    /// Apply this kind's response to `body` after it collided with `other`.
    pub fn perform_action(&mut self, body: &mut Body, other: &Contact) {
        match self {
            BodyKind::Projectile { last_collided } => {
                let Some(normal) = other.normal else {
                    return;
                };
                if *last_collided == Some(other.entity) {
                    return;
                }
                let velocity = reflect(body.linear_velocity, normal);
                let Some(direction) = velocity.try_normalize() else {
                    return;
                };
                let transform = heading_transform(body.center, direction);
                body.place(transform, velocity, body.angular_velocity, None);
                *last_collided = Some(other.entity);
            }
            BodyKind::Fragment | BodyKind::TargetFragment => {
                // Literal predicate: any resting, non-breakable body with a
                // normal stops a fragment, not only walls.
                if !other.breakable && other.at_rest && other.normal.is_some() {
                    body.linear_velocity = Vec3::ZERO;
                }
            }
            BodyKind::Wall { .. } | BodyKind::Target { .. } => {}
        }
    }
}

/// Mirror `velocity` about the plane with unit normal `normal`.
pub fn reflect(velocity: Vec3, normal: Vec3) -> Vec3 {
    velocity - 2.0 * velocity.dot(normal) * normal
}
