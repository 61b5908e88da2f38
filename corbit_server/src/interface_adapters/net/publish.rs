use crate::interface_adapters::snapshot::encode_snapshot;
use crate::use_cases::WorldUpdate;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{error, warn};

pub async fn snapshot_serializer(
    mut world_rx: broadcast::Receiver<WorldUpdate>,
    snapshot_latest_tx: watch::Sender<Arc<str>>,
) {
    // Serialize each world update once; every pilot reply shares the latest text.
    loop {
        match world_rx.recv().await {
            Ok(update) => {
                let text: Arc<str> = match encode_snapshot(&update.bodies) {
                    Ok(text) => text.into(),
                    Err(e) => {
                        error!(error = %e, tick = update.tick, "failed to serialize snapshot");
                        continue;
                    }
                };

                snapshot_latest_tx.send_replace(text);
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(
                    missed = n,
                    "snapshot serializer lagged; skipping to latest update"
                );
            }
            Err(broadcast::error::RecvError::Closed) => {
                warn!("world updates channel closed; serializer exiting");
                break;
            }
        }
    }
}
