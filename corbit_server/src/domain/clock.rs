// Simulated-time clock with a fixed time-acceleration ladder.

/// Simulated seconds per real second at each ladder step.
pub const TIME_ACCELERATION: [u32; 8] = [1, 5, 10, 50, 100, 1000, 10000, 100000];

#[derive(Debug, Clone, PartialEq)]
pub struct SimClock {
    /// Ticks per wall-clock second.
    tick_rate: f64,
    index: usize,
}

impl SimClock {
    pub fn new(tick_rate: f64) -> Self {
        Self {
            tick_rate,
            index: 0,
        }
    }

    pub fn tick_rate(&self) -> f64 {
        self.tick_rate
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Current ladder multiplier.
    pub fn multiplier(&self) -> u32 {
        TIME_ACCELERATION[self.index]
    }

    /// Simulated seconds covered by one tick.
    pub fn time_per_tick(&self) -> f64 {
        f64::from(self.multiplier()) / self.tick_rate
    }

    /// Moves along the ladder by `delta` steps. Requests that would leave the
    /// ladder are ignored. Returns whether the index changed.
    pub fn accelerate_time(&mut self, delta: i64) -> bool {
        let Some(target) = (self.index as i64).checked_add(delta) else {
            return false;
        };
        if target < 0 || target >= TIME_ACCELERATION.len() as i64 || delta == 0 {
            return false;
        }
        self.index = target as usize;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_clock_starts_then_real_time() {
        let clock = SimClock::new(30.0);

        assert_eq!(clock.index(), 0);
        assert_eq!(clock.time_per_tick(), 1.0 / 30.0);
    }

    #[test]
    fn when_accelerating_then_time_per_tick_scales() {
        let mut clock = SimClock::new(10.0);

        assert!(clock.accelerate_time(3));

        assert_eq!(clock.multiplier(), 50);
        assert_eq!(clock.time_per_tick(), 5.0);
    }

    #[test]
    fn when_request_goes_below_zero_then_noop() {
        let mut clock = SimClock::new(30.0);

        assert!(!clock.accelerate_time(-1));
        assert_eq!(clock.index(), 0);
    }

    #[test]
    fn when_request_goes_past_top_then_noop() {
        let mut clock = SimClock::new(30.0);
        clock.accelerate_time(7);

        assert!(!clock.accelerate_time(1));
        assert!(!clock.accelerate_time(i64::MAX));
        assert_eq!(clock.index(), 7);
        assert!(clock.accelerate_time(-7));
        assert_eq!(clock.index(), 0);
    }

    #[test]
    fn when_walking_randomly_then_index_stays_on_ladder() {
        let mut clock = SimClock::new(30.0);
        for delta in [3, -5, 9, 2, 2, 1, 1, -8, -1, 100, -100, 4] {
            clock.accelerate_time(delta);
            assert!(clock.index() < TIME_ACCELERATION.len());
        }
    }
}
