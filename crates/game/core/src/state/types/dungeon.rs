//! The dungeon side of a combat session.

use arrayvec::ArrayVec;

use super::common::{SlotId, Tick};
use crate::config::SessionConfig;

/// Per-slot attack rates of the dungeon.
pub type SlotRates = ArrayVec<u64, { SessionConfig::MAX_SLOTS }>;

/// Static combat attributes of the dungeon for one session iteration.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DungeonSpec {
    pub armour: u64,
    pub health: u64,
    /// Armour damage dealt each tick to the occupant of each slot.
    pub attack_armour: SlotRates,
    /// Health damage dealt each tick to the occupant of each slot once its
    /// armour is gone.
    pub attack_health: SlotRates,
    /// Reward split between the occupants present when the dungeon falls.
    pub defeat_reward: u64,
}

impl DungeonSpec {
    /// Dungeon attacking every slot with the same rates.
    pub fn uniform(
        armour: u64,
        health: u64,
        slots: usize,
        attack_armour: u64,
        attack_health: u64,
    ) -> Self {
        let slots = slots.min(SessionConfig::MAX_SLOTS);
        Self {
            armour,
            health,
            attack_armour: core::iter::repeat_n(attack_armour, slots).collect(),
            attack_health: core::iter::repeat_n(attack_health, slots).collect(),
            defeat_reward: 0,
        }
    }

    #[must_use]
    pub fn with_defeat_reward(mut self, reward: u64) -> Self {
        self.defeat_reward = reward;
        self
    }

    /// Armour damage aimed at `slot`; slots without an entry are not attacked.
    pub fn attack_armour_at(&self, slot: SlotId) -> u64 {
        self.attack_armour.get(slot.index()).copied().unwrap_or(0)
    }

    /// Health damage aimed at `slot`.
    pub fn attack_health_at(&self, slot: SlotId) -> u64 {
        self.attack_health.get(slot.index()).copied().unwrap_or(0)
    }
}

/// Dungeon pools after replaying a session up to some tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DungeonState {
    pub armour: u64,
    pub health: u64,
    /// Tick at which health reached zero.
    pub defeated_at: Option<Tick>,
}

impl DungeonState {
    pub fn from_spec(spec: &DungeonSpec) -> Self {
        Self {
            armour: spec.armour,
            health: spec.health,
            defeated_at: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}
