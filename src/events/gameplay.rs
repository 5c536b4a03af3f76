//! Gameplay messages emitted by the fixed-step systems.
//!
//! Systems write [`SimEvent`]s through a `MessageWriter`; the host drains the
//! `Messages<SimEvent>` queue after each `simulate` call. Entity handles in
//! these messages may already be despawned by the time they are read.

use bevy_ecs::message::Message;
use bevy_ecs::prelude::Entity;
use glam::Vec3;

use crate::resources::session::Outcome;

#[derive(Message, Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// A target shattered. `by` is the breakable body that hit it and
    /// `score` the session score after awarding it.
    TargetDestroyed {
        target: Entity,
        by: Entity,
        position: Vec3,
        score: i32,
    },
    /// A body left the play volume and was removed.
    BodyExpired {
        entity: Entity,
        kind: &'static str,
        position: Vec3,
    },
    /// A moving breakable body reached the player zone.
    PlayerHit { by: Entity },
    ShotFired { projectile: Entity, shots_left: u32 },
    GameOver { outcome: Outcome, score: i32 },
}

impl SimEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SimEvent::TargetDestroyed { .. } => "target_destroyed",
            SimEvent::BodyExpired { .. } => "body_expired",
            SimEvent::PlayerHit { .. } => "player_hit",
            SimEvent::ShotFired { .. } => "shot_fired",
            SimEvent::GameOver { .. } => "game_over",
        }
    }
}
