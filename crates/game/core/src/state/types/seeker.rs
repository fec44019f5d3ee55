//! Seeker combat attributes as seen by the replay.

/// Armour and health pools a seeker brings into a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vitals {
    pub armour: u64,
    pub health: u64,
}

impl Vitals {
    pub const fn new(armour: u64, health: u64) -> Self {
        Self { armour, health }
    }
}

/// Per-tick contribution rates of a seeker.
///
/// These are the computed stats after mods are applied; the action log stores
/// them verbatim so the replay never needs to consult token data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeekerRates {
    /// Damage dealt to the dungeon's armour each tick.
    pub attack_armour: u64,
    /// Damage dealt to the dungeon's health each tick once its armour is gone.
    pub attack_health: u64,
    /// Base yield harvested each tick.
    pub harvest: u64,
    /// Flat yield added on top of `harvest` each tick.
    pub yield_bonus: u64,
}

impl SeekerRates {
    pub const ZERO: Self = Self {
        attack_armour: 0,
        attack_health: 0,
        harvest: 0,
        yield_bonus: 0,
    };

    /// Yield accrued per tick while the seeker is present and alive.
    #[inline]
    pub const fn yield_rate(&self) -> u64 {
        self.harvest.saturating_add(self.yield_bonus)
    }

    /// Component-wise saturating sum.
    #[must_use]
    pub const fn combined(&self, other: &SeekerRates) -> SeekerRates {
        SeekerRates {
            attack_armour: self.attack_armour.saturating_add(other.attack_armour),
            attack_health: self.attack_health.saturating_add(other.attack_health),
            harvest: self.harvest.saturating_add(other.harvest),
            yield_bonus: self.yield_bonus.saturating_add(other.yield_bonus),
        }
    }
}

/// Stats a seeker enters a session with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeekerProfile {
    pub vitals: Vitals,
    pub rates: SeekerRates,
}

/// Attribute a mod or consumable improves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum BonusKind {
    Attack,
    Harvest,
    YieldBonus,
}

/// Mod or consumable definition resolved through [`crate::env::SeekerOracle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bonus {
    pub kind: BonusKind,
    pub amount: u64,
}

impl Bonus {
    pub const fn new(kind: BonusKind, amount: u64) -> Self {
        Self { kind, amount }
    }

    /// Rates delta contributed by this bonus.
    ///
    /// Attack mods raise armour and health damage alike.
    pub const fn as_rates(&self) -> SeekerRates {
        let mut rates = SeekerRates::ZERO;
        match self.kind {
            BonusKind::Attack => {
                rates.attack_armour = self.amount;
                rates.attack_health = self.amount;
            }
            BonusKind::Harvest => rates.harvest = self.amount,
            BonusKind::YieldBonus => rates.yield_bonus = self.amount,
        }
        rates
    }
}
