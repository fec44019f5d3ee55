//! Off-record view of the session rebuilt from its event stream.
//!
//! Clients never read the session's logs directly: they fold the public
//! `SlotUpdated` events into per-slot config logs, which is exactly what
//! a direct claim or a prover needs. A new iteration wipes every slot.

use game_core::{Commitment, Slot, SlotAction, SlotConfig, SlotUpdated};

use crate::events::{ClaimEvent, Event, SessionEvent};

/// Slots and config logs of the latest iteration seen in the stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionIndex {
    iteration: u32,
    slots: Vec<Slot>,
    /// Updates whose commitment disagreed with the folded chain.
    diverged: usize,
}

impl SessionIndex {
    pub fn new(slot_count: usize) -> Self {
        Self {
            iteration: 0,
            slots: vec![Slot::default(); slot_count],
            diverged: 0,
        }
    }

    /// Index over a complete event history.
    pub fn from_events<'a>(slot_count: usize, events: impl IntoIterator<Item = &'a Event>) -> Self {
        let mut index = Self::new(slot_count);
        for event in events {
            index.apply(event);
        }
        index
    }

    pub fn apply(&mut self, event: &Event) {
        match event {
            Event::Session(SessionEvent::SlotUpdated { update, .. }) => self.apply_update(update),
            Event::Session(SessionEvent::Spawned { iteration, .. }) => self.enter_iteration(*iteration),
            Event::Claim(ClaimEvent::Paid { payout, .. }) => {
                if let Some(slot) = self.slots.get_mut(payout.slot.index()) {
                    slot.claimed = payout.claimed;
                }
            }
            Event::Session(SessionEvent::CommandRejected { .. })
            | Event::Claim(ClaimEvent::Rejected { .. }) => {}
        }
    }

    fn enter_iteration(&mut self, iteration: u32) {
        if iteration > self.iteration {
            self.iteration = iteration;
            self.slots.iter_mut().for_each(|slot| *slot = Slot::default());
        }
    }

    fn apply_update(&mut self, update: &SlotUpdated) {
        if update.iteration < self.iteration {
            tracing::warn!(
                iteration = update.iteration,
                current = self.iteration,
                "stale slot update ignored"
            );
            return;
        }
        self.enter_iteration(update.iteration);

        let index = update.slot.index();
        if index >= self.slots.len() {
            self.slots.resize(index + 1, Slot::default());
        }
        let slot = &mut self.slots[index];
        if slot.commitment.extend(&update.config) != update.commitment {
            self.diverged += 1;
            tracing::warn!(slot = %update.slot, "slot update does not extend the indexed chain");
        }
        slot.seeker = match update.config.action {
            SlotAction::Enter { seeker, .. } => Some(seeker),
            SlotAction::Leave => None,
            _ => slot.seeker,
        };
        slot.configs.push(update.config);
        slot.commitment = update.commitment;
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Config logs in the layout `claim_reward` and the prover expect.
    pub fn configs(&self) -> Vec<Vec<SlotConfig>> {
        self.slots.iter().map(|slot| slot.configs.clone()).collect()
    }

    pub fn commitments(&self) -> Vec<Commitment> {
        self.slots.iter().map(|slot| slot.commitment).collect()
    }

    /// Whether every update extended the chain the index had folded so far.
    pub fn is_consistent(&self) -> bool {
        self.diverged == 0
    }
}
