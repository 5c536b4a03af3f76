//! ECS resources made available to systems.
//!
//! This module groups the long-lived data injected into the simulation world
//! and read by the fixed-step systems.
//!
//! Overview
//! - `session` – score, shot magazine, round timers and outcome
//! - `simclock` – fixed-step accumulator, simulated time and blend factor
//! - `simconfig` – every tunable, loaded from INI over defaults
//! - `simrng` – seeded random source for spawning and debris
//! - `spawngrid` – occupancy of the target spawn slots
pub mod session;
pub mod simclock;
pub mod simconfig;
pub mod simrng;
pub mod spawngrid;
