//! ECS components for simulated bodies.
//!
//! Submodules overview:
//! - [`body`] – physical state, fixed-step integration and draw interpolation
//! - [`bodykind`] – closed set of body kinds and their collision responses
//! - [`boundingbox`] – local/world axis-aligned boxes and overlap tests

pub mod body;
pub mod bodykind;
pub mod boundingbox;
