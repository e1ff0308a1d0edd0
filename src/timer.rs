use std::time::{Duration, Instant};

/// Fixed-period tick source that can be stopped and restarted.
pub struct Ticker {
    period: Duration,
    next_tick: Option<Instant>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Ticker { period, next_tick: None }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// (Re)arms the ticker; the first tick fires one period from `now`.
    pub fn start(&mut self, now: Instant) {
        self.next_tick = Some(now + self.period);
    }

    pub fn stop(&mut self) {
        self.next_tick = None;
    }

    pub fn is_due(&self, now: Instant) -> bool {
        matches!(self.next_tick, Some(next) if now >= next)
    }

    /// How long to wait for input before the next tick. A stopped ticker waits a full period.
    pub fn time_until_tick(&self, now: Instant) -> Duration {
        match self.next_tick {
            Some(next) => next.saturating_duration_since(now),
            None => self.period,
        }
    }

    /// Consumes a due tick. Keeps the cadence anchored to the schedule unless
    /// more than a whole period was missed.
    pub fn advance(&mut self, now: Instant) {
        if let Some(next) = self.next_tick {
            let following = next + self.period;
            self.next_tick = Some(if following <= now { now + self.period } else { following });
        }
    }
}
