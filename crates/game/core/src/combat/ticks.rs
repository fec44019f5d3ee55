//! Exact per-tick damage arithmetic.
//!
//! Every function here reproduces what a naive loop applying one tick at a
//! time would compute, for spans over which the rates are constant. Rates
//! are never averaged across spans.

/// Apply `rate` damage per tick for `span` ticks to `current`.
///
/// # Formula
///
/// ```text
/// max(0, current - rate * span)
/// ```
///
/// Never negative; a zero rate, zero span, or already empty pool is a no-op.
#[inline]
pub fn apply_ticks(current: u64, rate: u64, span: u64) -> u64 {
    current.saturating_sub(rate.saturating_mul(span))
}

/// Number of ticks until `current` reaches zero when drained at `rate`.
///
/// Returns `None` (never) when the rate is zero or the pool is already empty.
/// Otherwise this is `ceil(current / rate)`: the pool is exactly zero after
/// that many ticks and still positive one tick earlier.
#[inline]
pub fn ticks_until_depleted(current: u64, rate: u64) -> Option<u64> {
    if rate == 0 || current == 0 {
        return None;
    }
    Some(current.div_ceil(rate))
}

/// Armour/health pair protected by the zero-armour gate.
///
/// Health only takes damage on ticks that start with armour already at
/// exactly zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GatedPool {
    pub armour: u64,
    pub health: u64,
}

impl GatedPool {
    pub const fn new(armour: u64, health: u64) -> Self {
        Self { armour, health }
    }

    pub const fn is_depleted(&self) -> bool {
        self.health == 0
    }

    /// Health damage rate in effect for the next tick.
    #[inline]
    pub const fn effective_health_rate(&self, health_rate: u64) -> u64 {
        if self.armour == 0 { health_rate } else { 0 }
    }

    /// Ticks until the next change in the pool's gating: armour breaking
    /// (which opens the health gate) or health running out.
    pub fn ticks_until_transition(&self, armour_rate: u64, health_rate: u64) -> Option<u64> {
        if self.armour > 0 {
            ticks_until_depleted(self.armour, armour_rate)
        } else {
            ticks_until_depleted(self.health, health_rate)
        }
    }

    /// Advance the pool by `span` ticks of constant rates.
    ///
    /// The span is split at the tick where armour reaches zero; only the
    /// remainder damages health.
    #[must_use]
    pub fn advance(self, armour_rate: u64, health_rate: u64, span: u64) -> Self {
        if span == 0 {
            return self;
        }
        let armour_ticks = if self.armour == 0 {
            0
        } else {
            ticks_until_depleted(self.armour, armour_rate).map_or(span, |ticks| ticks.min(span))
        };
        let armour = apply_ticks(self.armour, armour_rate, armour_ticks);
        let health_ticks = if armour == 0 { span - armour_ticks } else { 0 };
        Self {
            armour,
            health: apply_ticks(self.health, health_rate, health_ticks),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One tick at a time, gate evaluated at tick start.
    fn naive(mut pool: GatedPool, armour_rate: u64, health_rate: u64, span: u64) -> GatedPool {
        for _ in 0..span {
            let gate_open = pool.armour == 0;
            pool.armour = pool.armour.saturating_sub(armour_rate);
            if gate_open {
                pool.health = pool.health.saturating_sub(health_rate);
            }
        }
        pool
    }

    #[test]
    fn apply_ticks_never_negative() {
        assert_eq!(apply_ticks(10, 3, 3), 1);
        assert_eq!(apply_ticks(10, 3, 4), 0);
        assert_eq!(apply_ticks(10, u64::MAX, u64::MAX), 0);
    }

    #[test]
    fn apply_ticks_noops() {
        assert_eq!(apply_ticks(10, 0, 100), 10);
        assert_eq!(apply_ticks(10, 5, 0), 10);
        assert_eq!(apply_ticks(0, 5, 10), 0);
    }

    #[test]
    fn depletion_rounds_up() {
        assert_eq!(ticks_until_depleted(100, 4), Some(25));
        assert_eq!(ticks_until_depleted(101, 4), Some(26));
        assert_eq!(ticks_until_depleted(100, 0), None);
        assert_eq!(ticks_until_depleted(0, 4), None);
    }

    #[test]
    fn armour_breaks_exactly_without_touching_health() {
        // two seekers hitting 2 each: 4 per tick against 100 armour
        let pool = GatedPool::new(100, 100).advance(4, 4, 25);
        assert_eq!(pool, GatedPool::new(0, 100));

        // health damage starts on tick 26
        let pool = pool.advance(4, 4, 1);
        assert_eq!(pool, GatedPool::new(0, 96));
    }

    #[test]
    fn split_span_matches_naive_loop() {
        for armour in [0, 1, 7, 30] {
            for health in [0, 5, 40] {
                for armour_rate in [0, 1, 3, 8] {
                    for health_rate in [0, 2, 9] {
                        for span in [0, 1, 4, 13, 50] {
                            let start = GatedPool::new(armour, health);
                            assert_eq!(
                                start.advance(armour_rate, health_rate, span),
                                naive(start, armour_rate, health_rate, span),
                                "pool {start:?} rates ({armour_rate}, {health_rate}) span {span}"
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn advancing_is_monotonic() {
        let mut pool = GatedPool::new(17, 23);
        for step in 0..20 {
            let next = pool.advance(2, 3, step % 4);
            assert!(next.armour <= pool.armour);
            assert!(next.health <= pool.health);
            pool = next;
        }
        assert!(pool.is_depleted());
    }

    #[test]
    fn transition_tracks_active_gate() {
        assert_eq!(GatedPool::new(10, 10).ticks_until_transition(3, 5), Some(4));
        assert_eq!(GatedPool::new(0, 10).ticks_until_transition(3, 5), Some(2));
        assert_eq!(GatedPool::new(10, 10).ticks_until_transition(0, 5), None);
        assert_eq!(GatedPool::new(0, 0).ticks_until_transition(3, 5), None);
    }
}
