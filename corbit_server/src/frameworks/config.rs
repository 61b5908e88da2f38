use std::{env, time::Duration};

// Runtime/server constants (physics tuning lives in the domain).

pub fn pilot_port() -> u16 {
    env::var("CORBIT_PILOT_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3415)
}

pub fn http_port() -> u16 {
    env::var("CORBIT_HTTP_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3416)
}

pub fn save_path() -> String {
    env::var("CORBIT_SAVE_PATH").unwrap_or_else(|_| "saves/OCESS.json".to_string())
}

// Highest accepted tick rate in Hz; faster rates round the tick period to zero.
pub const MAX_TICK_RATE: f64 = 1000.0;

pub fn tick_rate() -> f64 {
    parse_tick_rate(env::var("CORBIT_TICK_RATE").ok().as_deref())
}

fn parse_tick_rate(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|rate| rate.is_finite() && *rate > 0.0 && *rate <= MAX_TICK_RATE)
        .unwrap_or(30.0)
}

pub fn gravity_enabled() -> bool {
    env::var("CORBIT_GRAVITY")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(true)
}

pub fn autosave_path() -> Option<String> {
    env::var("CORBIT_AUTOSAVE_PATH")
        .ok()
        .filter(|path| !path.trim().is_empty())
}

pub fn autosave_period() -> Duration {
    let secs = env::var("CORBIT_AUTOSAVE_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(10);
    Duration::from_secs(secs)
}

pub const COMMAND_CHANNEL_CAPACITY: usize = 1024;
pub const WORLD_BROADCAST_CAPACITY: usize = 128;
// Upper bound on ticks run under one lock while the loop catches up.
pub const MAX_TICKS_PER_BATCH: u64 = 32;
