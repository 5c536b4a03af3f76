//! Seeded random source shared by the spawner and debris generation.

use bevy_ecs::prelude::Resource;
use fastrand::Rng;

#[derive(Resource, Debug, Clone)]
pub struct SimRng(pub Rng);

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(Rng::with_seed(seed))
    }
}
