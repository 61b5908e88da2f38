// Applies pilot commands to the simulation at the start of a tick.

use super::commands::Command;
use super::simulation::Simulation;
use crate::domain::systems::collision::Collision;
use crate::domain::systems::propulsion;
use crate::domain::{Body, MAIN_ENGINES, find_body};
use std::collections::HashMap;
use tracing::{info, warn};

/// Snapshots for `open` commands, read ahead of time keyed by path so the
/// simulation lock is never held across file I/O.
pub type PreloadedSnapshots = HashMap<String, Result<Vec<Body>, String>>;

/// Paths named by `open` commands in `commands`.
pub fn snapshot_paths<'a>(commands: impl IntoIterator<Item = &'a Command>) -> Vec<String> {
    let mut paths: Vec<String> = commands
        .into_iter()
        .filter_map(|c| match c {
            Command::Open { path } => Some(path.clone()),
            _ => None,
        })
        .collect();
    paths.dedup();
    paths
}

/// Applies one command. Failures (unknown target, missing engines, unreadable
/// snapshot) are logged and leave the simulation untouched.
pub fn apply_command(sim: &mut Simulation, command: &Command, snapshots: &PreloadedSnapshots) {
    let dt = sim.clock.time_per_tick();

    match command {
        Command::FireVerniers { target, amount } => {
            if let Some(body) = target_body(sim, target) {
                if let Err(e) = propulsion::fire_verniers(body, *amount, dt) {
                    warn!(error = %e, "fire_verniers ignored");
                }
            }
        }
        Command::ChangeEngines { target, delta } => {
            if let Some(body) = target_body(sim, target) {
                match body.engine_system_mut(MAIN_ENGINES) {
                    Some(engines) => engines.throttle += delta,
                    None => warn!(body = %target, "change_engines ignored: no main engines"),
                }
            }
        }
        Command::FireRcs { target, direction } => {
            if let Some(body) = target_body(sim, target) {
                if let Err(e) = propulsion::fire_rcs(body, *direction, dt) {
                    warn!(error = %e, "fire_rcs ignored");
                }
            }
        }
        Command::AccelerateTime { delta } => {
            if sim.clock.accelerate_time(*delta) {
                info!(
                    multiplier = sim.clock.multiplier(),
                    time_per_tick = sim.clock.time_per_tick(),
                    "time acceleration changed"
                );
            }
        }
        Command::Open { path } => match snapshots.get(path) {
            Some(Ok(bodies)) => {
                info!(%path, bodies = bodies.len(), "snapshot opened");
                sim.replace_bodies(bodies.clone());
            }
            Some(Err(e)) => warn!(%path, error = %e, "open ignored: snapshot unreadable"),
            None => warn!(%path, "open ignored: snapshot was not loaded"),
        },
    }
}

/// Drains commands into the simulation in order, then runs one tick and
/// returns the collisions it resolved.
pub fn run_tick<'a>(
    sim: &mut Simulation,
    commands: impl IntoIterator<Item = &'a Command>,
    snapshots: &PreloadedSnapshots,
) -> Vec<Collision> {
    for command in commands {
        apply_command(sim, command, snapshots);
    }
    sim.step()
}

fn target_body<'a>(sim: &'a mut Simulation, target: &str) -> Option<&'a mut Body> {
    let bodies = sim.bodies_mut();
    match find_body(bodies, target) {
        Some(index) => Some(&mut bodies[index]),
        None => {
            warn!(body = %target, "command target not found");
            None
        }
    }
}
