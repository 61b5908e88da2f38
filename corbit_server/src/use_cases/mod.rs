// Use cases layer: application workflows for the orbital simulation server.

pub mod autosave;
pub mod commands;
pub mod interpreter;
pub mod scheduler;
pub mod simulation;
pub mod types;
pub mod world;

pub use commands::{Command, CommandBatch, CommandError, parse_batch, parse_command};
pub use simulation::{SharedSimulation, Simulation, SimulationSettings};
pub use types::WorldUpdate;
pub use world::{WorldChannels, WorldSettings, world_task};
