//! Absolute tick sources.
//!
//! A session only ever sees the absolute tick a command executes at. On
//! chain that is the block number; here it comes from a [`TickSource`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Supplies the absolute tick commands execute at.
pub trait TickSource: Send + Sync {
    fn now(&self) -> u64;
}

/// Tick advanced explicitly by the caller, like mining blocks on a dev chain.
///
/// Clones share the same counter.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    tick: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self {
            tick: Arc::new(AtomicU64::new(start)),
        }
    }

    /// Advances by `ticks` and returns the new tick.
    pub fn advance(&self, ticks: u64) -> u64 {
        self.tick.fetch_add(ticks, Ordering::SeqCst) + ticks
    }

    /// Moves to `tick`; the clock never runs backwards.
    pub fn advance_to(&self, tick: u64) -> u64 {
        self.tick.fetch_max(tick, Ordering::SeqCst).max(tick)
    }
}

impl TickSource for ManualClock {
    fn now(&self) -> u64 {
        self.tick.load(Ordering::SeqCst)
    }
}

/// Tick derived from elapsed wall time.
#[derive(Clone, Copy, Debug)]
pub struct WallClock {
    origin: Instant,
    tick_duration: Duration,
}

impl WallClock {
    pub fn new(tick_duration: Duration) -> Self {
        Self {
            origin: Instant::now(),
            tick_duration: tick_duration.max(Duration::from_millis(1)),
        }
    }
}

impl TickSource for WallClock {
    fn now(&self) -> u64 {
        let elapsed = self.origin.elapsed().as_nanos() / self.tick_duration.as_nanos();
        u64::try_from(elapsed).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_is_shared_and_monotonic() {
        let clock = ManualClock::new(5);
        let other = clock.clone();
        assert_eq!(clock.advance(3), 8);
        assert_eq!(other.now(), 8);
        assert_eq!(other.advance_to(4), 8);
        assert_eq!(other.advance_to(20), 20);
        assert_eq!(clock.now(), 20);
    }

    #[test]
    fn wall_clock_starts_at_zero() {
        let clock = WallClock::new(Duration::from_secs(3600));
        assert_eq!(clock.now(), 0);
    }
}
