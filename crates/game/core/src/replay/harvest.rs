//! Resource-session replay: yield is the integral of the slot's yield rate.

use super::{ReplayError, validate_configs};
use crate::state::{SeekerRates, SlotAction, SlotConfig, SlotId, Tick};

/// Rates in effect between two consecutive configs of one slot.
///
/// Enter sets the base rates and clears boosts, Equip replaces the base
/// rates, Drink stacks a boost until the next Leave, and Leave stops accrual.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Occupancy {
    pub present: bool,
    pub base: SeekerRates,
    pub boost: SeekerRates,
}

impl Occupancy {
    pub fn apply(&mut self, action: &SlotAction) {
        match *action {
            SlotAction::Enter { rates, .. } => {
                self.present = true;
                self.base = rates;
                self.boost = SeekerRates::ZERO;
            }
            SlotAction::Equip { rates, .. } => self.base = rates,
            SlotAction::Drink { boost, .. } => self.boost = self.boost.combined(&boost),
            SlotAction::Leave => {
                self.present = false;
                self.boost = SeekerRates::ZERO;
            }
        }
    }

    pub fn rates(&self) -> SeekerRates {
        self.base.combined(&self.boost)
    }
}

/// Cumulative yield of one slot from its first config up to `target`.
///
/// Each config's rates hold from its tick until the next config's tick or
/// `target`, whichever comes first; ticks at or after `target` contribute
/// nothing.
///
/// # Errors
///
/// [`ReplayError::Malformed`] if the log could not have been produced by the
/// action log.
pub fn replay_slot(slot: SlotId, configs: &[SlotConfig], target: Tick) -> Result<u64, ReplayError> {
    validate_configs(slot, configs)?;

    let mut occupancy = Occupancy::default();
    let mut total: u64 = 0;
    for (index, config) in configs.iter().enumerate() {
        if config.tick >= target {
            break;
        }
        occupancy.apply(&config.action);
        if !occupancy.present {
            continue;
        }
        let end = configs
            .get(index + 1)
            .map_or(target, |next| next.tick.min(target));
        let span = end.since(config.tick);
        total = total.saturating_add(occupancy.rates().yield_rate().saturating_mul(span));
    }
    Ok(total)
}
