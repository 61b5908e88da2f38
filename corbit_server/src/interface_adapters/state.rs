use crate::domain::SnapshotStore;
use crate::use_cases::{CommandBatch, SharedSimulation, WorldUpdate};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

#[derive(Clone)]
pub struct AppState {
    // The one authoritative world; viewers lock it only to copy.
    pub sim: SharedSimulation,
    // Whole command batches flowing from pilot sessions into the world loop.
    pub command_tx: mpsc::Sender<CommandBatch>,
    // Tick batch results produced by the world loop (domain structs).
    pub world_tx: broadcast::Sender<WorldUpdate>,
    // Latest serialized snapshot document, replied to every pilot message.
    pub snapshot_latest_tx: watch::Sender<Arc<str>>,
    pub store: Arc<dyn SnapshotStore>,
    // Set to `true` once on shutdown; every background task subscribes.
    pub shutdown_tx: watch::Sender<bool>,
}
