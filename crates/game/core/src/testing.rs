//! Fixtures shared by unit tests.

use std::collections::HashMap;

use crate::env::SeekerOracle;
use crate::state::{Bonus, BonusId, BonusKind, SeekerId, SeekerProfile, SeekerRates, Vitals};

#[derive(Default)]
pub struct Roster {
    pub seekers: HashMap<SeekerId, SeekerProfile>,
    pub bonuses: HashMap<BonusId, Bonus>,
}

impl Roster {
    /// Seekers 1..=4 harvesting 5, 6, 4, and 3 per tick; bonus 1 is a +2
    /// harvest mod, bonus 2 a +10 attack mod.
    pub fn standard() -> Self {
        let mut roster = Self::default();
        for (id, harvest) in [(1, 5), (2, 6), (3, 4), (4, 3)] {
            roster.seekers.insert(
                SeekerId(id),
                SeekerProfile {
                    vitals: Vitals::new(50, 100),
                    rates: SeekerRates {
                        attack_armour: 2,
                        attack_health: 2,
                        harvest,
                        yield_bonus: 0,
                    },
                },
            );
        }
        roster
            .bonuses
            .insert(BonusId(1), Bonus::new(BonusKind::Harvest, 2));
        roster
            .bonuses
            .insert(BonusId(2), Bonus::new(BonusKind::Attack, 10));
        roster
    }
}

impl SeekerOracle for Roster {
    fn seeker(&self, id: SeekerId) -> Option<SeekerProfile> {
        self.seekers.get(&id).copied()
    }

    fn bonus(&self, id: BonusId) -> Option<Bonus> {
        self.bonuses.get(&id).copied()
    }
}
