// Converts elapsed wall-clock time into a count of due ticks.

use std::time::{Duration, Instant};

/// Fixed-cadence tick accounting against a monotonic clock.
///
/// Time that does not fill a whole period carries over to the next sample,
/// so a slow iteration defers ticks instead of dropping them.
#[derive(Debug, Clone)]
pub struct TickScheduler {
    period: Duration,
    last: Instant,
    carry: Duration,
}

impl TickScheduler {
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            last: now,
            carry: Duration::ZERO,
        }
    }

    /// Wall-clock period for a tick rate in Hz, never shorter than 1ns.
    pub fn period_for(tick_rate: f64) -> Duration {
        Duration::try_from_secs_f64(1.0 / tick_rate)
            .unwrap_or(Duration::MAX)
            .max(Duration::from_nanos(1))
    }

    /// Number of whole ticks that became due since the previous call.
    pub fn due(&mut self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.last) + self.carry;
        self.last = now;

        let period = self.period.as_nanos().max(1);
        let ticks = elapsed.as_nanos() / period;
        let consumed = Duration::from_nanos((ticks * period) as u64);
        self.carry = elapsed.saturating_sub(consumed);
        ticks as u64
    }
}
