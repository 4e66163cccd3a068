//! Process-wide spacing of outbound image calls

use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Best-effort throttle consulted before every outbound image call
pub trait Throttle: Send + Sync {
    /// How long the caller should wait before calling out at `now`.
    /// Implementations may record the call as scheduled.
    fn should_delay(&self, now: Instant) -> Duration;
}

/// Never delays
#[derive(Debug, Clone, Copy, Default)]
pub struct NoThrottle;

impl Throttle for NoThrottle {
    fn should_delay(&self, _now: Instant) -> Duration {
        Duration::ZERO
    }
}

/// Keeps consecutive calls at least `interval` apart
#[derive(Debug)]
pub struct MinIntervalThrottle {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl MinIntervalThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }
}

impl Throttle for MinIntervalThrottle {
    fn should_delay(&self, now: Instant) -> Duration {
        let mut next_slot = self.next_slot.lock();
        let start = match *next_slot {
            Some(slot) if slot > now => slot,
            _ => now,
        };
        *next_slot = Some(start + self.interval);
        start - now
    }
}
