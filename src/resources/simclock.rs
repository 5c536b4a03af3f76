//! Fixed-timestep simulation clock.
//!
//! Frame time (wall clock, variable) is fed into an accumulator; the
//! simulation consumes it in constant `dt` slices. Whatever is left over
//! after the last whole step becomes the blend factor `alpha` used to
//! interpolate drawn bodies between the two latest physical states.
//!
//! ```ignore
//! let Some(direction) = clock.accumulate(frame_time) else { return };
//! while clock.step_ready() {
//!     // run one fixed step
//!     clock.complete_step(direction);
//! }
//! let alpha = clock.update_alpha();
//! ```

use bevy_ecs::prelude::Resource;

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct SimClock {
    /// Fixed step length in seconds.
    pub dt: f32,
    /// Largest slice of (scaled) frame time accepted per call. Prevents the
    /// spiral of death after a stall.
    pub max_frame_time: f32,
    /// Multiplier applied to incoming frame time. Negative runs time backwards.
    pub time_scale: f32,
    /// Frame time not yet consumed by a fixed step.
    pub accumulator: f32,
    /// Simulation time, advanced only in whole `dt` increments.
    pub t: f32,
    pub steps_taken: u64,
    /// Blend factor computed at the end of the last `simulate` call.
    pub alpha: f32,
}

impl SimClock {
    pub fn new(dt: f32, max_frame_time: f32) -> Self {
        Self {
            dt,
            max_frame_time,
            time_scale: 1.0,
            accumulator: 0.0,
            t: 0.0,
            steps_taken: 0,
            alpha: 0.0,
        }
    }

    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }

    /// Scale `frame_time`, cap it, and add it to the accumulator.
    ///
    /// The cap applies to both signs: a scaled frame time is clamped to
    /// `[-max_frame_time, max_frame_time]`, so a rewinding clock cannot queue
    /// up an unbounded backlog either.
    ///
    /// Returns the direction time is flowing in for this frame (`1.0` or
    /// `-1.0`), which [`SimClock::complete_step`] needs, or `None` when the
    /// scaled frame time is NaN (e.g. an infinite frame at zero time scale).
    /// The accumulator is left untouched in that case.
    pub fn accumulate(&mut self, frame_time: f32) -> Option<f32> {
        let scaled = frame_time * self.time_scale;
        if scaled.is_nan() {
            return None;
        }
        self.accumulator += scaled.clamp(-self.max_frame_time, self.max_frame_time);
        Some(if scaled < 0.0 { -1.0 } else { 1.0 })
    }

    /// True while the accumulator holds at least one whole step.
    pub fn step_ready(&self) -> bool {
        self.accumulator.abs() >= self.dt
    }

    pub fn complete_step(&mut self, direction: f32) {
        self.t += direction * self.dt;
        self.accumulator -= direction * self.dt;
        self.steps_taken += 1;
    }

    pub fn update_alpha(&mut self) -> f32 {
        self.alpha = self.accumulator / self.dt;
        self.alpha
    }

    /// Forget accumulated time and counters; keep `dt`, cap and scale.
    pub fn reset(&mut self) {
        *self = Self::new(self.dt, self.max_frame_time).with_time_scale(self.time_scale);
    }
}
