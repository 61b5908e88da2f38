// Per-tick systems acting on the body list.

pub mod collision;
pub mod gravity;
pub mod propulsion;
pub mod telemetry;
