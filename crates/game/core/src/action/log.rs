//! Append-only per-slot config log.
//!
//! The log owns the slot roster. Every accepted append updates occupancy and
//! the slot's rolling commitment, and yields exactly one [`SlotUpdated`]
//! record for external indexers.

use super::{ActionError, Commitment, InvalidActionReason};
use crate::state::{Slot, SlotAction, SlotConfig, SlotId};

/// Observable record of one accepted append.
///
/// Replaying these records in order through [`crate::action::ActionLog`]
/// (or any indexer) reproduces the on-record slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotUpdated {
    pub slot: SlotId,
    /// Session iteration the config belongs to.
    pub iteration: u32,
    pub config: SlotConfig,
    /// Slot commitment after this config was folded in.
    pub commitment: Commitment,
}

/// Roster of slots with their config histories for the current iteration.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionLog {
    slots: Vec<Slot>,
    iteration: u32,
}

impl ActionLog {
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![Slot::default(); slot_count],
            iteration: 0,
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, slot: SlotId) -> Option<&Slot> {
        self.slots.get(slot.index())
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Config histories of every slot, indexed by slot.
    pub fn configs(&self) -> Vec<Vec<SlotConfig>> {
        self.slots.iter().map(|slot| slot.configs.clone()).collect()
    }

    /// On-record commitment of every slot, indexed by slot.
    pub fn commitments(&self) -> Vec<Commitment> {
        self.slots.iter().map(|slot| slot.commitment).collect()
    }

    /// Checks whether `config` could be appended to `slot` without mutating
    /// anything.
    pub fn check(&self, slot: SlotId, config: &SlotConfig) -> Result<(), ActionError> {
        let current = self
            .slot(slot)
            .ok_or(ActionError::invalid(slot, InvalidActionReason::SlotOutOfRange))?;

        if let Some(last) = current.last_tick()
            && config.tick < last
        {
            return Err(ActionError::OutOfOrder {
                slot,
                last,
                tick: config.tick,
            });
        }

        match config.action {
            SlotAction::Enter { .. } if current.is_occupied() => Err(ActionError::invalid(
                slot,
                InvalidActionReason::SlotOccupied,
            )),
            SlotAction::Enter { .. } => Ok(()),
            _ if !current.is_occupied() => {
                Err(ActionError::invalid(slot, InvalidActionReason::SlotEmpty))
            }
            SlotAction::Equip { bonus, .. } => {
                let equipped = current.current_occupancy().iter().any(|config| {
                    matches!(config.action, SlotAction::Equip { bonus: b, .. } if b == bonus)
                });
                if equipped {
                    Err(ActionError::invalid(
                        slot,
                        InvalidActionReason::AlreadyEquipped,
                    ))
                } else {
                    Ok(())
                }
            }
            SlotAction::Drink { .. } | SlotAction::Leave => Ok(()),
        }
    }

    /// Appends a config to a slot.
    ///
    /// # Errors
    ///
    /// * [`ActionError::OutOfOrder`] if the tick precedes the slot's last tick.
    /// * [`ActionError::InvalidAction`] if the action cannot follow the
    ///   slot's occupancy or the slot does not exist.
    pub fn append(&mut self, slot: SlotId, config: SlotConfig) -> Result<SlotUpdated, ActionError> {
        self.check(slot, &config)?;

        let iteration = self.iteration;
        let entry = self
            .slots
            .get_mut(slot.index())
            .ok_or(ActionError::invalid(slot, InvalidActionReason::SlotOutOfRange))?;

        match config.action {
            SlotAction::Enter { seeker, .. } => entry.seeker = Some(seeker),
            SlotAction::Leave => entry.seeker = None,
            SlotAction::Equip { .. } | SlotAction::Drink { .. } => {}
        }
        entry.commitment = entry.commitment.extend(&config);
        entry.configs.push(config);

        tracing::debug!(
            %slot,
            iteration,
            tick = %config.tick,
            action = config.action.as_str(),
            "slot updated"
        );

        Ok(SlotUpdated {
            slot,
            iteration,
            config,
            commitment: entry.commitment,
        })
    }

    /// Starts a fresh occupancy epoch for a vacated slot.
    ///
    /// Clears the config history, commitment, and claimed amount so the next
    /// Enter is the only entry of the epoch. Occupied slots are left alone.
    pub fn truncate_after_rejoin(&mut self, slot: SlotId) -> Result<(), ActionError> {
        let entry = self
            .slots
            .get_mut(slot.index())
            .ok_or(ActionError::invalid(slot, InvalidActionReason::SlotOutOfRange))?;
        if entry.is_occupied() {
            return Err(ActionError::invalid(slot, InvalidActionReason::SlotOccupied));
        }
        *entry = Slot::default();
        Ok(())
    }

    /// Moves the log to a new session iteration, dropping every slot's
    /// previous epoch.
    pub fn begin_iteration(&mut self, iteration: u32) {
        self.iteration = iteration;
        for slot in &mut self.slots {
            *slot = Slot::default();
        }
    }

    /// Records a successful claim for `slot`.
    pub(crate) fn set_claimed(&mut self, slot: SlotId, claimed: u64) {
        if let Some(entry) = self.slots.get_mut(slot.index()) {
            entry.claimed = claimed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{BonusId, SeekerId, SeekerRates, Tick, Vitals};

    fn enter(tick: u64, seeker: u32) -> SlotConfig {
        let rates = SeekerRates {
            harvest: 5,
            ..SeekerRates::ZERO
        };
        SlotConfig::enter(Tick(tick), SeekerId(seeker), Vitals::new(10, 10), rates)
    }

    #[test]
    fn append_tracks_occupancy_and_commitment() {
        let mut log = ActionLog::new(2);
        let record = log.append(SlotId(0), enter(3, 1)).unwrap();

        assert_eq!(record.slot, SlotId(0));
        assert_eq!(record.iteration, 0);
        let slot = log.slot(SlotId(0)).unwrap();
        assert_eq!(slot.seeker, Some(SeekerId(1)));
        assert_eq!(slot.commitment, Commitment::chain(&slot.configs));
        assert_eq!(record.commitment, slot.commitment);

        log.append(SlotId(0), SlotConfig::leave(Tick(5))).unwrap();
        assert!(!log.slot(SlotId(0)).unwrap().is_occupied());
        assert_eq!(log.configs()[0].len(), 2);
    }

    #[test]
    fn rejects_out_of_order_tick() {
        let mut log = ActionLog::new(1);
        log.append(SlotId(0), enter(10, 1)).unwrap();
        let before = log.clone();

        let err = log.append(SlotId(0), SlotConfig::leave(Tick(9))).unwrap_err();
        assert!(matches!(err, ActionError::OutOfOrder { last: Tick(10), .. }));
        assert_eq!(log, before);
    }

    #[test]
    fn equal_ticks_are_accepted() {
        let mut log = ActionLog::new(1);
        log.append(SlotId(0), enter(4, 1)).unwrap();
        log.append(SlotId(0), SlotConfig::leave(Tick(4))).unwrap();
        assert_eq!(log.slot(SlotId(0)).unwrap().last_tick(), Some(Tick(4)));
    }

    #[test]
    fn enforces_enter_leave_alternation() {
        let mut log = ActionLog::new(1);
        let err = log.append(SlotId(0), SlotConfig::leave(Tick(0))).unwrap_err();
        assert_eq!(err, ActionError::invalid(SlotId(0), InvalidActionReason::SlotEmpty));

        log.append(SlotId(0), enter(0, 1)).unwrap();
        let err = log.append(SlotId(0), enter(1, 2)).unwrap_err();
        assert_eq!(
            err,
            ActionError::invalid(SlotId(0), InvalidActionReason::SlotOccupied)
        );
    }

    #[test]
    fn unknown_slot_is_invalid() {
        let mut log = ActionLog::new(1);
        let err = log.append(SlotId(3), enter(0, 1)).unwrap_err();
        assert_eq!(
            err,
            ActionError::invalid(SlotId(3), InvalidActionReason::SlotOutOfRange)
        );
    }

    #[test]
    fn same_mod_cannot_be_equipped_twice() {
        let mut log = ActionLog::new(1);
        log.append(SlotId(0), enter(0, 1)).unwrap();
        log.append(SlotId(0), SlotConfig::equip(Tick(1), BonusId(7), SeekerRates::ZERO))
            .unwrap();
        let err = log
            .append(SlotId(0), SlotConfig::equip(Tick(2), BonusId(7), SeekerRates::ZERO))
            .unwrap_err();
        assert_eq!(
            err,
            ActionError::invalid(SlotId(0), InvalidActionReason::AlreadyEquipped)
        );

        // a new occupancy may equip it again
        log.append(SlotId(0), SlotConfig::leave(Tick(3))).unwrap();
        log.append(SlotId(0), enter(4, 1)).unwrap();
        log.append(SlotId(0), SlotConfig::equip(Tick(5), BonusId(7), SeekerRates::ZERO))
            .unwrap();
    }

    #[test]
    fn truncate_leaves_single_enter_after_rejoin() {
        let mut log = ActionLog::new(1);
        log.append(SlotId(0), enter(0, 1)).unwrap();
        log.append(SlotId(0), SlotConfig::leave(Tick(5))).unwrap();
        log.set_claimed(SlotId(0), 25);

        log.truncate_after_rejoin(SlotId(0)).unwrap();
        log.append(SlotId(0), enter(0, 2)).unwrap();

        let slot = log.slot(SlotId(0)).unwrap();
        assert_eq!(slot.configs.len(), 1);
        assert!(slot.configs[0].action.is_enter());
        assert_eq!(slot.claimed, 0);
        assert_eq!(slot.commitment, Commitment::chain(&slot.configs));
    }

    #[test]
    fn truncate_refuses_occupied_slot() {
        let mut log = ActionLog::new(1);
        log.append(SlotId(0), enter(0, 1)).unwrap();
        assert!(log.truncate_after_rejoin(SlotId(0)).is_err());
    }

    #[test]
    fn begin_iteration_resets_every_slot() {
        let mut log = ActionLog::new(2);
        log.append(SlotId(0), enter(0, 1)).unwrap();
        log.append(SlotId(1), enter(2, 2)).unwrap();

        log.begin_iteration(2);
        assert_eq!(log.iteration(), 2);
        assert!(log.slots().iter().all(|slot| slot.configs.is_empty()));
        let record = log.append(SlotId(1), enter(0, 2)).unwrap();
        assert_eq!(record.iteration, 2);
    }
}
