// The authoritative simulation state and one tick of dynamics.

use crate::domain::systems::collision::{self, Collision, RESTITUTION};
use crate::domain::systems::{gravity, propulsion};
use crate::domain::{Body, MAIN_ENGINES, SimClock};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

/// Physics switches for a simulation.
#[derive(Debug, Clone, Copy)]
pub struct SimulationSettings {
    pub gravity: bool,
    pub restitution: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            gravity: true,
            restitution: RESTITUTION,
        }
    }
}

/// Bodies plus the clock that drives them.
///
/// Exactly one of these exists per server, behind [`SharedSimulation`].
#[derive(Debug, Clone)]
pub struct Simulation {
    bodies: Vec<Body>,
    pub clock: SimClock,
    settings: SimulationSettings,
    tick: u64,
    // Simulated seconds since start.
    elapsed: f64,
}

/// One lock over the whole simulation: tick mutation and snapshot copies both take it.
pub type SharedSimulation = Arc<Mutex<Simulation>>;

impl Simulation {
    pub fn new(bodies: Vec<Body>, clock: SimClock, settings: SimulationSettings) -> Self {
        Self {
            bodies,
            clock,
            settings,
            tick: 0,
            elapsed: 0.0,
        }
    }

    pub fn into_shared(self) -> SharedSimulation {
        Arc::new(Mutex::new(self))
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Swaps in a whole new body list at once.
    pub fn replace_bodies(&mut self, bodies: Vec<Body>) {
        self.bodies = bodies;
    }

    /// Runs gravity, main-engine thrust, collision resolution and movement
    /// for one tick of `clock.time_per_tick()` simulated seconds.
    pub fn step(&mut self) -> Vec<Collision> {
        let dt = self.clock.time_per_tick();

        if self.settings.gravity {
            gravity::apply_gravity(&mut self.bodies);
        }

        for body in self
            .bodies
            .iter_mut()
            .filter(|b| b.engine_system(MAIN_ENGINES).is_some())
        {
            if let Err(e) = propulsion::burn_main_engines(body, dt) {
                warn!(error = %e, "main engine burn skipped");
            }
        }

        let collisions =
            collision::resolve_and_advance(&mut self.bodies, dt, self.settings.restitution);

        self.tick += 1;
        self.elapsed += dt;
        collisions
    }
}
