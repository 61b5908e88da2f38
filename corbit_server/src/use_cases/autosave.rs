// Periodic export of the live world to a snapshot file.

use super::simulation::SharedSimulation;
use crate::domain::SnapshotStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Copies the bodies under the lock, then writes them without holding it.
pub async fn save_now(
    sim: &SharedSimulation,
    store: &Arc<dyn SnapshotStore>,
    path: &str,
) -> Result<usize, String> {
    let bodies = sim.lock().await.bodies().to_vec();
    let count = bodies.len();

    let store = Arc::clone(store);
    let path = path.to_string();
    tokio::task::spawn_blocking(move || store.save(&path, &bodies))
        .await
        .map_err(|e| format!("snapshot writer failed: {e}"))??;
    Ok(count)
}

pub async fn autosave_task(
    sim: SharedSimulation,
    store: Arc<dyn SnapshotStore>,
    path: String,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately; skip it so startup does not overwrite.
    interval.tick().await;

    info!(%path, period_secs = period.as_secs_f64(), "autosave enabled");

    loop {
        if *shutdown.borrow_and_update() {
            break;
        }
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
            _ = interval.tick() => {}
        }

        match save_now(&sim, &store, &path).await {
            Ok(bodies) => debug!(%path, bodies, "autosaved"),
            Err(e) => warn!(%path, error = %e, "autosave failed"),
        }
    }
}
