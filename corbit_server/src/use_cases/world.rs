// The single authoritative world loop.

use super::commands::{Command, CommandBatch};
use super::interpreter::{PreloadedSnapshots, run_tick, snapshot_paths};
use super::scheduler::TickScheduler;
use super::simulation::SharedSimulation;
use super::types::WorldUpdate;
use crate::domain::SnapshotStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Shared configuration for the world loop.
#[derive(Debug, Clone)]
pub struct WorldSettings {
    /// Wall-clock time between ticks.
    pub tick_period: Duration,
    /// Most ticks run under one lock acquisition while catching up.
    pub max_ticks_per_batch: u64,
}

/// Everything the world loop talks to.
pub struct WorldChannels {
    pub command_rx: mpsc::Receiver<CommandBatch>,
    pub world_tx: broadcast::Sender<WorldUpdate>,
    /// Flips to `true` once; the loop exits at its next check.
    pub shutdown: watch::Receiver<bool>,
}

pub async fn world_task(
    sim: SharedSimulation,
    channels: WorldChannels,
    store: Arc<dyn SnapshotStore>,
    settings: WorldSettings,
) {
    let WorldChannels {
        mut command_rx,
        world_tx,
        mut shutdown,
    } = channels;

    let mut scheduler = TickScheduler::new(settings.tick_period, Instant::now().into_std());
    let mut interval = tokio::time::interval(settings.tick_period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut backlog: u64 = 0;

    info!(
        tick_period_ms = settings.tick_period.as_secs_f64() * 1000.0,
        "world loop started"
    );

    loop {
        if *shutdown.borrow_and_update() {
            info!("world loop stopping");
            break;
        }

        if backlog == 0 {
            // Sleep only when fully caught up.
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        info!("world loop stopping");
                        break;
                    }
                    continue;
                }
                _ = interval.tick() => {}
            }
        } else {
            tokio::task::yield_now().await;
        }

        backlog += scheduler.due(Instant::now().into_std());
        if backlog == 0 {
            continue;
        }

        // Whole batches only: each one was queued atomically by a session.
        let mut commands: Vec<Command> = Vec::new();
        while let Ok(batch) = command_rx.try_recv() {
            commands.extend(batch);
        }
        let snapshots = preload_snapshots(&store, &commands).await;

        let ticks = backlog.min(settings.max_ticks_per_batch.max(1));
        let (update, collisions) = {
            let mut sim = sim.lock().await;
            let mut collisions = run_tick(&mut sim, &commands, &snapshots).len();
            for _ in 1..ticks {
                collisions += sim.step().len();
            }
            (WorldUpdate::from(&*sim), collisions)
        };
        backlog -= ticks;

        if collisions > 0 {
            debug!(tick = update.tick, collisions, "collisions resolved");
        }
        if backlog > 0 {
            debug!(backlog, "catching up");
        }
        // No subscribers is fine; nobody is watching yet.
        let _ = world_tx.send(update);
    }
}

// Reads every snapshot named by an `open` command off the async runtime.
async fn preload_snapshots(
    store: &Arc<dyn SnapshotStore>,
    commands: &[Command],
) -> PreloadedSnapshots {
    let mut snapshots = PreloadedSnapshots::new();
    for path in snapshot_paths(commands) {
        let store = Arc::clone(store);
        let key = path.clone();
        let result = tokio::task::spawn_blocking(move || store.load(&path))
            .await
            .unwrap_or_else(|e| Err(format!("snapshot loader failed: {e}")));
        if let Err(e) = &result {
            warn!(path = %key, error = %e, "failed to load snapshot");
        }
        snapshots.insert(key, result);
    }
    snapshots
}
