//! Integration and interpolation systems.
//!
//! [`apply_gravity`] and [`integrate_bodies`] run inside the fixed step;
//! [`blend_bodies`] runs once per `simulate` call after all steps, using the
//! clock's leftover fraction.

use bevy_ecs::prelude::*;

use crate::components::body::Body;
use crate::resources::simclock::SimClock;
use crate::resources::simconfig::SimConfig;

/// Pull movable bodies flagged for gravity downwards by `gravity * dt`.
pub fn apply_gravity(mut query: Query<&mut Body>, clock: Res<SimClock>, config: Res<SimConfig>) {
    let dv = config.gravity * clock.dt;
    if dv == 0.0 {
        return;
    }
    for mut body in query.iter_mut() {
        if body.movable && body.gravity {
            body.linear_velocity.y -= dv;
        }
    }
}

/// Advance every body by one fixed step. Immovable bodies are skipped by
/// [`Body::advance`] itself.
pub fn integrate_bodies(mut query: Query<&mut Body>, clock: Res<SimClock>) {
    for mut body in query.iter_mut() {
        body.advance(clock.dt);
    }
}

pub fn blend_bodies(mut query: Query<&mut Body>, clock: Res<SimClock>) {
    for mut body in query.iter_mut() {
        body.blend(clock.alpha);
    }
}
