// Domain layer: core simulation types and rules.

pub mod body;
pub mod clock;
pub mod engine;
pub mod errors;
pub mod ports;
pub mod systems;

pub use body::{Body, BodyKind, EngineSystems, Kinematics, find_body};
pub use clock::{SimClock, TIME_ACCELERATION};
pub use engine::{EngineSystem, MAIN_ENGINES, Placement, RCS};
pub use errors::{BodyError, MissingEngineSystem};
pub use ports::SnapshotStore;
