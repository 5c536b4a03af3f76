//! Round bookkeeping: score, shot magazine and timers.
//!
//! A round starts with [`Session::start`] and ends exactly once, either won
//! (score reached the win threshold) or lost (time ran out, or the player was
//! hit). Timers only run while a round is in progress.

use bevy_ecs::prelude::Resource;
use serde::Serialize;

use crate::resources::simconfig::SimConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Won,
    Lost,
}

/// What a call to [`Session::tick`] asks the caller to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionTick {
    /// Respawn interval elapsed; top up the targets.
    pub respawn: bool,
    /// A shot was added back to the magazine.
    pub recharged: bool,
    /// Time limit reached.
    pub timed_out: bool,
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Session {
    pub running: bool,
    pub outcome: Option<Outcome>,
    /// Can go negative: every shot costs points whether it hits or not.
    pub score: i32,
    pub shots: u32,
    pub max_shots: u32,
    pub shot_timer: f32,
    pub spawn_timer: f32,
    pub remaining_time: f32,
    /// Projectiles fired while this is set fall under gravity.
    pub gravity_enabled: bool,
    pub targets_destroyed: u32,
}

impl Session {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            running: false,
            outcome: None,
            score: 0,
            shots: config.max_shots,
            max_shots: config.max_shots,
            shot_timer: 0.0,
            spawn_timer: 0.0,
            remaining_time: config.time_limit,
            gravity_enabled: false,
            targets_destroyed: 0,
        }
    }

    /// Begin a fresh round. The gravity toggle carries over.
    pub fn start(&mut self, config: &SimConfig) {
        let gravity_enabled = self.gravity_enabled;
        *self = Self::new(config);
        self.gravity_enabled = gravity_enabled;
        self.running = true;
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// True between `start` and the end of the round.
    pub fn in_progress(&self) -> bool {
        self.running && self.outcome.is_none()
    }

    /// Score a destroyed target. Returns true when this destruction wins the
    /// round. Ignored outside a round.
    pub fn award_target(&mut self, config: &SimConfig) -> bool {
        if !self.in_progress() {
            return false;
        }
        self.targets_destroyed += 1;
        let win = i32::try_from(config.win_score).unwrap_or(i32::MAX);
        let points = i32::try_from(config.points_per_target).unwrap_or(i32::MAX);
        self.score = self.score.saturating_add(points).min(win);
        self.score >= win
    }

    /// Spend a shot. Returns the shots left, or `None` if the magazine is
    /// empty or no round is in progress.
    pub fn take_shot(&mut self, cost: u32) -> Option<u32> {
        if !self.in_progress() || self.shots == 0 {
            return None;
        }
        self.shots -= 1;
        self.score = self
            .score
            .saturating_sub(i32::try_from(cost).unwrap_or(i32::MAX));
        Some(self.shots)
    }

    /// Advance round timers by `dt` seconds.
    pub fn tick(&mut self, dt: f32, config: &SimConfig) -> SessionTick {
        let mut tick = SessionTick::default();
        if !self.in_progress() {
            return tick;
        }

        self.spawn_timer += dt;
        self.shot_timer += dt;

        if self.spawn_timer > config.respawn_interval {
            self.spawn_timer = 0.0;
            tick.respawn = true;
        }

        // The timer restarts even with a full magazine.
        if self.shot_timer > config.shot_recharge {
            if self.shots < self.max_shots {
                self.shots += 1;
                tick.recharged = true;
            }
            self.shot_timer = 0.0;
        }

        if config.time_limit > 0.0 {
            self.remaining_time = (self.remaining_time - dt).max(0.0);
            tick.timed_out = self.remaining_time <= 0.0;
        }

        tick
    }

    /// End the round. Returns false if it had already ended.
    pub fn finish(&mut self, outcome: Outcome) -> bool {
        if self.is_over() {
            return false;
        }
        self.outcome = Some(outcome);
        self.running = false;
        true
    }
}
