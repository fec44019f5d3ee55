//! Session state representation.
//!
//! This module owns the plain data structures describing slots, configs, and
//! the dungeon. The roster itself is owned by [`crate::action::ActionLog`] and
//! mutated only through [`crate::session::Session`].
pub mod types;

pub use types::{
    Bonus, BonusId, BonusKind, DungeonSpec, DungeonState, SeekerId, SeekerProfile, SeekerRates,
    Slot, SlotAction, SlotConfig, SlotId, SlotRates, Tick, Vitals,
};
