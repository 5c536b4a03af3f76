//! Shatterbox library.
//!
//! A fixed-timestep rigid-body simulation core: bodies are spawned, bounce,
//! shatter into debris and despawn, while a renderer reads interpolated
//! transforms at its own frame rate. [`simulation::Simulation`] is the entry
//! point; the ECS components, resources, systems and events are exposed for
//! hosts and integration tests.

pub mod components;
pub mod events;
pub mod game;
pub mod resources;
pub mod simulation;
pub mod systems;
