//! Round timers and game-over handling.
//!
//! [`session_clock_system`] runs inside the fixed step after collision
//! dispatch. It advances the session timers by `dt`, ends the round when the
//! time limit is reached, and tops the targets back up when the respawn
//! interval elapses.

use bevy_ecs::prelude::*;
use log::{debug, info};

use crate::components::body::Body;
use crate::events::gameplay::SimEvent;
use crate::resources::session::{Outcome, Session};
use crate::resources::simclock::SimClock;
use crate::resources::simconfig::SimConfig;
use crate::resources::simrng::SimRng;
use crate::resources::spawngrid::SpawnGrid;
use crate::systems::spawner::plan_targets;

#[allow(clippy::too_many_arguments)]
pub fn session_clock_system(
    bodies: Query<Entity, With<Body>>,
    clock: Res<SimClock>,
    config: Res<SimConfig>,
    mut session: ResMut<Session>,
    mut grid: ResMut<SpawnGrid>,
    mut rng: ResMut<SimRng>,
    mut events: MessageWriter<SimEvent>,
    mut commands: Commands,
) {
    let tick = session.tick(clock.dt, &config);

    if tick.timed_out {
        info!("Time is up");
        end_round(
            Outcome::Lost,
            bodies.iter(),
            &mut session,
            &mut grid,
            &mut commands,
            &mut events,
        );
        return;
    }

    if tick.recharged {
        debug!("Shot recharged, {} of {} ready", session.shots, session.max_shots);
    }

    if tick.respawn {
        let planned = plan_targets(&mut grid, &mut rng.0, &config);
        if !planned.is_empty() {
            info!("Respawning {} targets", planned.len());
        }
        for bundle in planned {
            commands.spawn(bundle);
        }
    }
}

/// Finish the round with `outcome`, despawning `entities` and releasing the
/// whole spawn grid. Does nothing if the round already ended.
pub fn end_round(
    outcome: Outcome,
    entities: impl IntoIterator<Item = Entity>,
    session: &mut Session,
    grid: &mut SpawnGrid,
    commands: &mut Commands,
    events: &mut MessageWriter<SimEvent>,
) {
    if !session.finish(outcome) {
        return;
    }
    for entity in entities {
        commands.entity(entity).try_despawn();
    }
    grid.clear();
    info!("Round over: {:?} with score {}", outcome, session.score);
    events.write(SimEvent::GameOver {
        outcome,
        score: session.score,
    });
}
