//! Plain data types shared by the session, replay, and claim modules.
mod common;
mod dungeon;
mod seeker;
mod slot;

pub use common::{BonusId, SeekerId, SlotId, Tick};
pub use dungeon::{DungeonSpec, DungeonState, SlotRates};
pub use seeker::{Bonus, BonusKind, SeekerProfile, SeekerRates, Vitals};
pub use slot::{Slot, SlotAction, SlotConfig};
