//! [`game_core::SeekerOracle`] backed by in-memory maps.
use std::collections::HashMap;

use game_core::{Bonus, BonusId, SeekerId, SeekerOracle, SeekerProfile};
use serde::{Deserialize, Serialize};

/// Seeker stats and mod definitions known to the runtime.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeekerRegistry {
    #[serde(default)]
    seekers: HashMap<SeekerId, SeekerProfile>,
    #[serde(default)]
    bonuses: HashMap<BonusId, Bonus>,
}

impl SeekerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces a seeker.
    pub fn add_seeker(&mut self, id: SeekerId, profile: SeekerProfile) {
        self.seekers.insert(id, profile);
    }

    /// Registers or replaces a mod or consumable.
    pub fn add_bonus(&mut self, id: BonusId, bonus: Bonus) {
        self.bonuses.insert(id, bonus);
    }

    #[must_use]
    pub fn with_seeker(mut self, id: SeekerId, profile: SeekerProfile) -> Self {
        self.add_seeker(id, profile);
        self
    }

    #[must_use]
    pub fn with_bonus(mut self, id: BonusId, bonus: Bonus) -> Self {
        self.add_bonus(id, bonus);
        self
    }

    pub fn seeker_count(&self) -> usize {
        self.seekers.len()
    }
}

impl SeekerOracle for SeekerRegistry {
    fn seeker(&self, id: SeekerId) -> Option<SeekerProfile> {
        self.seekers.get(&id).copied()
    }

    fn bonus(&self, id: BonusId) -> Option<Bonus> {
        self.bonuses.get(&id).copied()
    }
}
