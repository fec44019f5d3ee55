use crate::state::{Bonus, BonusId, SeekerId, SeekerProfile};

/// Read-only access to seeker stats and mod/consumable definitions.
pub trait SeekerOracle: Send + Sync {
    /// Computed stats a seeker enters with, or `None` for unknown seekers.
    fn seeker(&self, id: SeekerId) -> Option<SeekerProfile>;

    /// Definition of an equippable mod or consumable.
    fn bonus(&self, id: BonusId) -> Option<Bonus>;
}

impl<T: SeekerOracle + ?Sized> SeekerOracle for &T {
    fn seeker(&self, id: SeekerId) -> Option<SeekerProfile> {
        (**self).seeker(id)
    }

    fn bonus(&self, id: BonusId) -> Option<Bonus> {
        (**self).bonus(id)
    }
}
