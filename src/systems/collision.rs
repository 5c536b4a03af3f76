//! Collision detection and response dispatch.
//!
//! Once per fixed step, every ordered pair `(a, b)` of live bodies is tested
//! with [`Body::is_colliding_with`] (exhaustive scan, no broad phase). For each
//! overlap, `a`'s kind responds through [`BodyKind::perform_action`], then two
//! rules involving both bodies are checked:
//!
//! - **Shatter**: `a` and `b` both breakable and `b` at rest. Debris is spawned
//!   around `b`, `b`'s grid slot is freed, the session scores it, and both
//!   bodies are removed.
//! - **Cleanup**: neither breakable and `a` at rest (a fragment that came to
//!   rest on a wall). `a` is removed.
//!
//! Only bodies that are movable or moving initiate pairs; walls and targets
//! are only ever the `b` side. A body removed earlier in the pass takes no
//! further part in it, except that a shattering `a` finishes its own scan and
//! can break further targets it overlaps.
//!
//! After its pairs, a breakable initiator overlapping the player zone ends the
//! round lost.
//!
//! Spawns and despawns go through `Commands`, so the scan never sees its own
//! structural changes.

use bevy_ecs::prelude::*;
use log::{debug, info};
use rustc_hash::FxHashSet;

use crate::components::body::Body;
use crate::components::bodykind::{BodyKind, Contact};
use crate::events::gameplay::SimEvent;
use crate::resources::session::{Outcome, Session};
use crate::resources::simconfig::SimConfig;
use crate::resources::simrng::SimRng;
use crate::resources::spawngrid::SpawnGrid;
use crate::systems::session::end_round;
use crate::systems::spawner::shatter_debris;

#[allow(clippy::too_many_arguments)]
pub fn collision_dispatch(
    mut query: Query<(Entity, &mut Body, &mut BodyKind)>,
    config: Res<SimConfig>,
    mut grid: ResMut<SpawnGrid>,
    mut session: ResMut<Session>,
    mut rng: ResMut<SimRng>,
    mut events: MessageWriter<SimEvent>,
    mut commands: Commands,
) {
    let entities: Vec<Entity> = query.iter().map(|(entity, _, _)| entity).collect();
    let mut resolved: FxHashSet<Entity> = FxHashSet::default();
    let mut spawned: Vec<Entity> = Vec::new();

    for &a in &entities {
        if resolved.contains(&a) {
            continue;
        }
        match query.get(a) {
            Ok((_, body, _)) if body.movable || !body.is_at_rest() => {}
            _ => continue,
        }

        for &b in &entities {
            if a == b || resolved.contains(&b) {
                continue;
            }

            // Snapshot what `a` may learn about `b` while both are borrowed
            // immutably.
            let hit = match (query.get(a), query.get(b)) {
                (Ok((_, body_a, _)), Ok((_, body_b, kind_b))) if body_a.is_colliding_with(body_b) => Some((
                    Contact::new(b, body_b, kind_b),
                    body_b.draw_transform,
                    body_b.center,
                    kind_b.slot(),
                )),
                _ => None,
            };
            let Some((contact, b_draw, b_center, b_slot)) = hit else {
                continue;
            };

            let Ok((_, mut body_a, mut kind_a)) = query.get_mut(a) else {
                break;
            };
            kind_a.perform_action(&mut body_a, &contact);
            let (a_breakable, a_at_rest) = (body_a.breakable, body_a.is_at_rest());

            if a_breakable && contact.breakable && contact.at_rest {
                for bundle in shatter_debris(b_draw, &config, &mut rng.0) {
                    spawned.push(commands.spawn(bundle).id());
                }
                if let Some(slot) = b_slot {
                    grid.free(slot);
                }
                let won = session.award_target(&config);
                resolved.insert(a);
                resolved.insert(b);
                commands.entity(a).try_despawn();
                commands.entity(b).try_despawn();
                debug!("{:?} shattered {:?} at {:?}, score {}", a, b, b_center, session.score);
                events.write(SimEvent::TargetDestroyed {
                    target: b,
                    by: a,
                    position: b_center,
                    score: session.score,
                });

                if won {
                    info!("Win score reached");
                    end_round(
                        Outcome::Won,
                        entities.iter().copied().chain(spawned.iter().copied()),
                        &mut session,
                        &mut grid,
                        &mut commands,
                        &mut events,
                    );
                    return;
                }
                // `a` keeps scanning: one shot can break every target it
                // overlaps.
                continue;
            }

            if !a_breakable && !contact.breakable && a_at_rest {
                resolved.insert(a);
                commands.entity(a).try_despawn();
                debug!("{:?} came to rest against {:?}", a, b);
                break;
            }
        }

        if resolved.contains(&a) || !session.in_progress() {
            continue;
        }
        let Some(zone) = config.player_zone else {
            continue;
        };
        let reached_player = query
            .get(a)
            .is_ok_and(|(_, body, _)| body.breakable && zone.overlaps(&body.world_bounds()));
        if reached_player {
            info!("Player hit by {:?}", a);
            events.write(SimEvent::PlayerHit { by: a });
            end_round(
                Outcome::Lost,
                entities.iter().copied().chain(spawned.iter().copied()),
                &mut session,
                &mut grid,
                &mut commands,
                &mut events,
            );
            return;
        }
    }
}
