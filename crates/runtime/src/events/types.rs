//! Event types for different topics.

use game_core::{Payout, SessionCommand, SlotId, SlotUpdated, Tick, TransitionPhase};
use serde::{Deserialize, Serialize};

/// Roster and lifecycle changes of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A config was appended to a slot.
    SlotUpdated {
        update: SlotUpdated,
        /// Absolute tick the command was executed at.
        at: u64,
    },

    /// A join started a new iteration.
    Spawned {
        iteration: u32,
        start: u64,
        reward_supply: u64,
    },

    /// A command failed somewhere in the transition pipeline.
    CommandRejected {
        command: SessionCommand,
        phase: TransitionPhase,
        error: String,
        at: u64,
    },
}

/// Reward claim outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimEvent {
    Paid {
        payout: Payout,
        tick: Tick,
        /// Whether the yields were backed by a proof rather than a replay.
        proven: bool,
        at: u64,
    },

    Rejected {
        slot: SlotId,
        error: String,
        at: u64,
    },
}
