use crate::domain::body::Body;

// Port for reading and writing persisted snapshots of the body list.
pub trait SnapshotStore: Send + Sync {
    fn load(&self, path: &str) -> Result<Vec<Body>, String>;
    fn save(&self, path: &str, bodies: &[Body]) -> Result<(), String>;
}
