//! Roster slots and the tick-stamped configs recorded against them.

use super::common::{BonusId, SeekerId, Tick};
use super::seeker::{SeekerRates, Vitals};
use crate::action::Commitment;

/// Action that produced a [`SlotConfig`].
///
/// Each variant carries only the data relevant to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum SlotAction {
    /// Seeker occupies the slot with its entry stats.
    Enter {
        seeker: SeekerId,
        vitals: Vitals,
        rates: SeekerRates,
    },
    /// Mod equipped; `rates` replace the base rates from this tick on.
    Equip { bonus: BonusId, rates: SeekerRates },
    /// Consumable taken; `boost` stacks on top of the base rates until leave.
    Drink { bonus: BonusId, boost: SeekerRates },
    /// Seeker leaves the slot; nothing accrues afterwards.
    Leave,
}

impl SlotAction {
    /// Stable numeric code used in commitments and circuit inputs.
    pub const fn code(&self) -> u8 {
        match self {
            Self::Enter { .. } => 0,
            Self::Equip { .. } => 1,
            Self::Drink { .. } => 2,
            Self::Leave => 3,
        }
    }

    pub const fn is_enter(&self) -> bool {
        matches!(self, Self::Enter { .. })
    }

    pub const fn is_leave(&self) -> bool {
        matches!(self, Self::Leave)
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Immutable snapshot of a slot's configuration, valid from `tick` until
/// superseded by the next config of the same slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotConfig {
    pub tick: Tick,
    pub action: SlotAction,
}

impl SlotConfig {
    pub const fn new(tick: Tick, action: SlotAction) -> Self {
        Self { tick, action }
    }

    pub const fn enter(tick: Tick, seeker: SeekerId, vitals: Vitals, rates: SeekerRates) -> Self {
        Self::new(
            tick,
            SlotAction::Enter {
                seeker,
                vitals,
                rates,
            },
        )
    }

    pub const fn equip(tick: Tick, bonus: BonusId, rates: SeekerRates) -> Self {
        Self::new(tick, SlotAction::Equip { bonus, rates })
    }

    pub const fn drink(tick: Tick, bonus: BonusId, boost: SeekerRates) -> Self {
        Self::new(tick, SlotAction::Drink { bonus, boost })
    }

    pub const fn leave(tick: Tick) -> Self {
        Self::new(tick, SlotAction::Leave)
    }
}

/// Roster position holding one occupancy epoch of history.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Slot {
    /// Current occupant; `None` when the slot is vacant.
    pub seeker: Option<SeekerId>,
    /// Cumulative amount already withdrawn from this slot.
    pub claimed: u64,
    /// Rolling commitment over every config in `configs`.
    pub commitment: Commitment,
    /// Configs of the current epoch, ordered by tick.
    pub configs: Vec<SlotConfig>,
}

impl Slot {
    pub fn is_occupied(&self) -> bool {
        self.seeker.is_some()
    }

    pub fn last_tick(&self) -> Option<Tick> {
        self.configs.last().map(|config| config.tick)
    }

    /// Configs recorded since the current occupant entered.
    pub fn current_occupancy(&self) -> &[SlotConfig] {
        if !self.is_occupied() {
            return &[];
        }
        let start = self
            .configs
            .iter()
            .rposition(|config| config.action.is_enter())
            .unwrap_or(0);
        &self.configs[start..]
    }

    /// Base rates in effect for the current occupant, ignoring drinks.
    pub fn base_rates(&self) -> Option<SeekerRates> {
        self.current_occupancy()
            .iter()
            .rev()
            .find_map(|config| match config.action {
                SlotAction::Enter { rates, .. } | SlotAction::Equip { rates, .. } => Some(rates),
                _ => None,
            })
    }
}
