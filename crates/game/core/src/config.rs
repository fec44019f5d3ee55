use crate::state::DungeonSpec;

/// Respawn parameters of the location a session lives at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileData {
    /// Total number of spawns allowed; 0 means unlimited.
    pub max_spawn: u32,
    /// Ticks after the session ends before it may respawn.
    pub regen_duration: u64,
    /// Percentage the reward pool shrinks by on every respawn.
    pub respawn_supply_decay_perc: u8,
    /// Floor the decayed pool never drops below.
    pub min_decayed_supply: u64,
    /// Flat amount added to the pool after decay.
    pub bonus_supply: u64,
}

impl TileData {
    pub const DEFAULT_REGEN_DURATION: u64 = 10;
    pub const DEFAULT_DECAY_PERC: u8 = 10;

    /// Applies one respawn worth of decay to `supply`.
    ///
    /// Decay first, then the floor, then the bonus.
    pub fn decay(&self, supply: u64) -> u64 {
        let perc = u64::from(self.respawn_supply_decay_perc.min(100));
        let decayed = (u128::from(supply) * u128::from(100 - perc) / 100) as u64;
        decayed
            .max(self.min_decayed_supply)
            .saturating_add(self.bonus_supply)
    }
}

impl Default for TileData {
    fn default() -> Self {
        Self {
            max_spawn: 0,
            regen_duration: Self::DEFAULT_REGEN_DURATION,
            respawn_supply_decay_perc: Self::DEFAULT_DECAY_PERC,
            min_decayed_supply: 0,
            bonus_supply: 0,
        }
    }
}

/// Which yield model a session replays with.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameVariant {
    /// Seekers fight the dungeon; yield stops when a seeker falls and the
    /// survivors of the killing tick share the defeat reward.
    Dungeon(DungeonSpec),
    /// Resource session without combat; yield is the integral of each slot's
    /// yield rate.
    Harvest,
}

/// Session configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionConfig {
    /// Length of one session iteration in ticks.
    pub num_ticks: u64,
    /// Number of roster slots (at most [`Self::MAX_SLOTS`]).
    pub max_slots: usize,
    pub tile: TileData,
    /// Reward pool of the first spawn.
    pub reward_supply: u64,
    pub variant: GameVariant,
}

impl SessionConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_SLOTS: usize = 32;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_NUM_TICKS: u64 = 100;
    pub const DEFAULT_SLOTS: usize = 3;
    pub const DEFAULT_REWARD_SUPPLY: u64 = 1_000;

    pub fn new() -> Self {
        Self {
            num_ticks: Self::DEFAULT_NUM_TICKS,
            max_slots: Self::DEFAULT_SLOTS,
            tile: TileData::default(),
            reward_supply: Self::DEFAULT_REWARD_SUPPLY,
            variant: GameVariant::Harvest,
        }
    }

    /// Harvest session with `slots` roster positions.
    pub fn harvest(num_ticks: u64, slots: usize) -> Self {
        Self {
            num_ticks,
            max_slots: slots.min(Self::MAX_SLOTS),
            ..Self::new()
        }
    }

    /// Dungeon session sized to the dungeon's per-slot attack table.
    pub fn dungeon(num_ticks: u64, spec: DungeonSpec) -> Self {
        let slots = spec.attack_armour.len().max(spec.attack_health.len());
        Self {
            num_ticks,
            max_slots: slots.min(Self::MAX_SLOTS),
            variant: GameVariant::Dungeon(spec),
            ..Self::new()
        }
    }

    #[must_use]
    pub fn with_tile(mut self, tile: TileData) -> Self {
        self.tile = tile;
        self
    }

    #[must_use]
    pub fn with_reward_supply(mut self, supply: u64) -> Self {
        self.reward_supply = supply;
        self
    }

    /// Number of usable slots after clamping to [`Self::MAX_SLOTS`].
    pub fn slot_count(&self) -> usize {
        self.max_slots.min(Self::MAX_SLOTS)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}
