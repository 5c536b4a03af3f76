//! Simulation systems.
//!
//! The fixed step runs, in order: [`movement::apply_gravity`],
//! [`despawn::despawn_out_of_bounds`], [`collision::collision_dispatch`],
//! [`session::session_clock_system`], [`movement::integrate_bodies`]. The
//! blend pass runs [`movement::blend_bodies`] once per `simulate` call.
//!
//! Submodules overview
//! - [`collision`] – pairwise overlap scan and response dispatch
//! - [`despawn`] – removal of bodies that left the play volume
//! - [`movement`] – gravity, integration and interpolation
//! - [`session`] – round timers, respawns and game over
//! - [`spawner`] – target placement and debris generation

pub mod collision;
pub mod despawn;
pub mod movement;
pub mod session;
pub mod spawner;
