//! The simulation context.
//!
//! [`Simulation`] owns the ECS [`World`] together with two schedules:
//!
//! - the **fixed step**, run zero or more times per [`Simulation::simulate`]
//!   call, each time advancing simulated time by exactly `dt`;
//! - the **blend pass**, run once per call, which writes every body's draw
//!   transform from the clock's leftover fraction.
//!
//! ```ignore
//! let mut sim = Simulation::new(SimConfig::new())?;
//! sim.start_round();
//! loop {
//!     sim.simulate(frame_time);
//!     for d in sim.drawables() { /* draw d.shape with d.material at d.transform */ }
//!     for event in sim.drain_events() { /* ... */ }
//! }
//! ```

use bevy_ecs::prelude::*;
use bevy_ecs::system::SystemState;
use glam::{Mat4, Vec3};
use log::{debug, info, warn};

use crate::components::body::{Body, MaterialHandle, ShapeHandle};
use crate::components::bodykind::BodyKind;
use crate::events::gameplay::SimEvent;
use crate::game;
use crate::resources::session::Session;
use crate::resources::simclock::SimClock;
use crate::resources::simconfig::{ConfigError, SimConfig};
use crate::resources::simrng::SimRng;
use crate::resources::spawngrid::SpawnGrid;
use crate::systems::collision::collision_dispatch;
use crate::systems::despawn::despawn_out_of_bounds;
use crate::systems::movement::{apply_gravity, blend_bodies, integrate_bodies};
use crate::systems::session::session_clock_system;
use crate::systems::spawner::plan_targets;

/// What a renderer needs to draw one body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drawable {
    pub entity: Entity,
    pub transform: Mat4,
    pub shape: ShapeHandle,
    pub material: MaterialHandle,
}

pub struct Simulation {
    world: World,
    fixed_step: Schedule,
    blend: Schedule,
}

impl Simulation {
    /// Build an empty simulation. Fails if `config` does not validate.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut world = World::new();
        world.insert_resource(
            SimClock::new(config.dt, config.max_frame_time).with_time_scale(config.time_scale),
        );
        world.insert_resource(SpawnGrid::new(config.grid_columns, config.grid_rows));
        world.insert_resource(Session::new(&config));
        world.insert_resource(SimRng::seeded(config.seed));
        world.insert_resource(config);
        world.init_resource::<Messages<SimEvent>>();

        let mut fixed_step = Schedule::default();
        fixed_step.add_systems(
            (
                apply_gravity,
                despawn_out_of_bounds,
                collision_dispatch,
                session_clock_system,
                integrate_bodies,
            )
                .chain(),
        );

        let mut blend = Schedule::default();
        blend.add_systems(blend_bodies);

        Ok(Self {
            world,
            fixed_step,
            blend,
        })
    }

    /// Consume `frame_time` seconds of wall-clock time. Returns the number of
    /// fixed steps taken.
    ///
    /// Messages written during the previous call stay readable for one more
    /// call; drain them with [`Simulation::drain_events`].
    pub fn simulate(&mut self, frame_time: f32) -> u32 {
        self.world.resource_mut::<Messages<SimEvent>>().update();

        let Some(direction) = self.world.resource_mut::<SimClock>().accumulate(frame_time) else {
            warn!("Ignoring frame time {} at time scale {}", frame_time, self.clock().time_scale);
            return 0;
        };
        let mut steps = 0;
        while self.world.resource::<SimClock>().step_ready() {
            self.fixed_step.run(&mut self.world);
            self.world.resource_mut::<SimClock>().complete_step(direction);
            steps += 1;
        }

        self.world.resource_mut::<SimClock>().update_alpha();
        self.blend.run(&mut self.world);
        self.world.clear_trackers();
        steps
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn clock(&self) -> &SimClock {
        self.world.resource::<SimClock>()
    }

    pub fn config(&self) -> &SimConfig {
        self.world.resource::<SimConfig>()
    }

    pub fn session(&self) -> &Session {
        self.world.resource::<Session>()
    }

    pub fn grid(&self) -> &SpawnGrid {
        self.world.resource::<SpawnGrid>()
    }

    /// Add a body as-is. The body should already be placed.
    pub fn spawn_body(&mut self, body: Body, kind: BodyKind) -> Entity {
        self.world.spawn((body, kind)).id()
    }

    /// Spawn the five room walls.
    pub fn setup_room(&mut self) -> Vec<Entity> {
        game::spawn_room(&mut self.world)
    }

    /// Clear the scene, rebuild the room and begin a new round with a full
    /// set of targets.
    pub fn start_round(&mut self) {
        self.clear_bodies();
        self.setup_room();

        let mut state = SystemState::<(
            Res<SimConfig>,
            ResMut<Session>,
            ResMut<SpawnGrid>,
            ResMut<SimRng>,
        )>::new(&mut self.world);
        let planned = {
            let (config, mut session, mut grid, mut rng) = state.get_mut(&mut self.world);
            session.start(&config);
            grid.clear();
            plan_targets(&mut grid, &mut rng.0, &config)
        };

        info!("Round started with {} targets", planned.len());
        for bundle in planned {
            self.world.spawn(bundle);
        }
    }

    /// Fire a projectile from `origin` along `direction`, spending a shot.
    ///
    /// Returns `None` when no round is in progress, the magazine is empty, or
    /// `direction` is zero.
    pub fn fire_projectile(&mut self, origin: Vec3, direction: Vec3) -> Option<Entity> {
        let (speed, cost) = {
            let config = self.config();
            (config.projectile_speed, config.shot_cost)
        };
        let gravity = self.session().gravity_enabled;

        let Some(bundle) = game::projectile(origin, direction, speed, gravity) else {
            warn!("Refusing to fire along a zero direction");
            return None;
        };
        let Some(shots_left) = self.world.resource_mut::<Session>().take_shot(cost) else {
            debug!("No shot available");
            return None;
        };

        let projectile = self.world.spawn(bundle).id();
        self.world
            .resource_mut::<Messages<SimEvent>>()
            .write(SimEvent::ShotFired {
                projectile,
                shots_left,
            });
        debug!("Fired {:?}, {} shots left", projectile, shots_left);
        Some(projectile)
    }

    /// Fire from the default muzzle position straight down the range.
    pub fn fire_forward(&mut self) -> Option<Entity> {
        self.fire_projectile(game::MUZZLE, Vec3::Z)
    }

    /// Toggle gravity on projectiles fired from now on.
    pub fn set_gravity(&mut self, enabled: bool) {
        self.world.resource_mut::<Session>().gravity_enabled = enabled;
    }

    pub fn set_time_scale(&mut self, time_scale: f32) {
        if !time_scale.is_finite() {
            warn!("Ignoring non-finite time scale {}", time_scale);
            return;
        }
        self.world.resource_mut::<SimClock>().time_scale = time_scale;
    }

    /// Remove every body and return clock, session, grid and RNG to their
    /// initial state.
    pub fn reset(&mut self) {
        self.clear_bodies();
        let config = self.config().clone();
        self.world.resource_mut::<SimClock>().reset();
        *self.world.resource_mut::<Session>() = Session::new(&config);
        self.world.resource_mut::<SpawnGrid>().clear();
        *self.world.resource_mut::<SimRng>() = SimRng::seeded(config.seed);
        self.world.resource_mut::<Messages<SimEvent>>().clear();
    }

    /// Take every pending gameplay message.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.world
            .resource_mut::<Messages<SimEvent>>()
            .drain()
            .collect()
    }

    pub fn drawables(&mut self) -> Vec<Drawable> {
        self.world
            .query::<(Entity, &Body)>()
            .iter(&self.world)
            .map(|(entity, body)| Drawable {
                entity,
                transform: body.draw_transform,
                shape: body.shape,
                material: body.material,
            })
            .collect()
    }

    pub fn body_count(&mut self) -> usize {
        self.world.query::<&Body>().iter(&self.world).count()
    }

    /// Snapshot of every live body.
    pub fn bodies(&mut self) -> Vec<(Entity, Body, BodyKind)> {
        self.world
            .query::<(Entity, &Body, &BodyKind)>()
            .iter(&self.world)
            .map(|(entity, body, kind)| (entity, body.clone(), *kind))
            .collect()
    }

    pub fn body(&self, entity: Entity) -> Option<&Body> {
        self.world.get::<Body>(entity)
    }

    pub fn kind(&self, entity: Entity) -> Option<BodyKind> {
        self.world.get::<BodyKind>(entity).copied()
    }

    fn clear_bodies(&mut self) {
        let entities: Vec<Entity> = self
            .world
            .query_filtered::<Entity, With<Body>>()
            .iter(&self.world)
            .collect();
        for entity in entities {
            self.world.despawn(entity);
        }
    }
}
