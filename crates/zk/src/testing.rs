//! Fixtures shared by unit tests.

use game_core::{
    Bonus, BonusId, BonusKind, SeekerId, SeekerOracle, SeekerProfile, SeekerRates, Session,
    SessionConfig, SlotId, Vitals,
};

/// Seeker `n` harvests `n + 4` per tick; bonus 1 is a +2 harvest mod.
pub struct Fixed;

impl SeekerOracle for Fixed {
    fn seeker(&self, id: SeekerId) -> Option<SeekerProfile> {
        Some(SeekerProfile {
            vitals: Vitals::new(50, 100),
            rates: SeekerRates {
                attack_armour: 2,
                attack_health: 2,
                harvest: u64::from(id.0) + 4,
                yield_bonus: 0,
            },
        })
    }

    fn bonus(&self, id: BonusId) -> Option<Bonus> {
        (id == BonusId(1)).then_some(Bonus::new(BonusKind::Harvest, 2))
    }
}

/// Seekers 1 and 2 harvest 5 and 6 from tick 0 and leave at tick 10.
pub fn played_session() -> Session {
    let mut session = Session::new(SessionConfig::harvest(100, 2));
    for (slot, seeker) in [1, 2].into_iter().enumerate() {
        session
            .join(0, SeekerId(seeker), SlotId(slot as u16), &Fixed)
            .unwrap();
    }
    for (slot, seeker) in [1, 2].into_iter().enumerate() {
        session
            .leave(10, SeekerId(seeker), SlotId(slot as u16), &Fixed)
            .unwrap();
    }
    session
}
