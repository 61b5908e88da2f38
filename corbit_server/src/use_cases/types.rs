// Use-case level outputs of the world loop.

use super::simulation::Simulation;
use crate::domain::{Body, SimClock};

/// Copy of the simulation taken under the lock at the end of a tick batch.
#[derive(Debug, Clone)]
pub struct WorldUpdate {
    pub tick: u64,
    pub clock: SimClock,
    pub bodies: Vec<Body>,
}

impl From<&Simulation> for WorldUpdate {
    fn from(sim: &Simulation) -> Self {
        Self {
            tick: sim.tick(),
            clock: sim.clock.clone(),
            bodies: sim.bodies().to_vec(),
        }
    }
}
