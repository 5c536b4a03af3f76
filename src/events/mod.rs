//! Message types exchanged between the simulation and its host.
//!
//! Submodules:
//! - [`gameplay`] – target destruction, expiry, player hits, shots and game over
pub mod gameplay;
