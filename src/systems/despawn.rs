//! Out-of-bounds removal.
//!
//! Runs every fixed step before collision dispatch. Any body whose center has
//! left the play volume described by
//! [`WorldBounds`](crate::resources::simconfig::WorldBounds) is despawned and
//! reported with [`SimEvent::BodyExpired`]. Targets give their grid slot back.

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::body::Body;
use crate::components::bodykind::BodyKind;
use crate::events::gameplay::SimEvent;
use crate::resources::simconfig::SimConfig;
use crate::resources::spawngrid::SpawnGrid;

pub fn despawn_out_of_bounds(
    query: Query<(Entity, &Body, &BodyKind)>,
    config: Res<SimConfig>,
    mut grid: ResMut<SpawnGrid>,
    mut events: MessageWriter<SimEvent>,
    mut commands: Commands,
) {
    for (entity, body, kind) in query.iter() {
        if config.world_bounds.contains(body.center) {
            continue;
        }
        if let Some(slot) = kind.slot() {
            grid.free(slot);
        }
        commands.entity(entity).try_despawn();
        debug!("{} {:?} expired at {:?}", kind.label(), entity, body.center);
        events.write(SimEvent::BodyExpired {
            entity,
            kind: kind.label(),
            position: body.center,
        });
    }
}
