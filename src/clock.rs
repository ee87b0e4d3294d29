use std::time::{Duration, Instant};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Repeating real-time tick source.
///
/// The clock never calls back on its own: the owner polls it with
/// [`Clock::take_due`] and dispatches every tick it yields. At most one tick
/// stream is armed at a time; `start` on a running clock replaces the old
/// stream, and once `stop` returns no further tick is yielded.
#[derive(Debug, Clone)]
pub struct Clock {
    period: Duration,
    next_due: Option<Instant>,
}

impl Clock {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    /// Arm a fresh stream whose first tick is one period after `now`.
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Pop the oldest elapsed tick, returning the instant it was due.
    ///
    /// Call repeatedly until `None` to catch up after a late poll.
    pub fn take_due(&mut self, now: Instant) -> Option<Instant> {
        let due = self.next_due?;
        if due > now {
            return None;
        }
        self.next_due = Some(due + self.period);
        Some(due)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(TICK_PERIOD)
    }
}
