//! Per-tick input expansion.
//!
//! Every slot's configs are expanded into fixed `[tick][slot]` arrays of the
//! rates in effect at each tick, for tooling that works on grids rather than
//! variable-length logs. The per-slot commitment and the "updated" flags let
//! a consumer re-derive the commitment and bind the arrays to the on-record
//! chain.

use game_core::{
    Commitment, Occupancy, SeekerRates, SlotConfig, SlotId, Tick, validate_configs,
};

use crate::prover::ProofError;

/// Longest session the expansion accepts.
pub const MAX_CIRCUIT_TICKS: u64 = 1 << 14;

/// Largest `ticks * slots` grid the expansion allocates.
pub const MAX_CIRCUIT_CELLS: u64 = 1 << 20;

fn check_shape(num_ticks: u64, slots: usize) -> Result<usize, ProofError> {
    let cells = num_ticks.saturating_mul(slots as u64);
    if num_ticks > MAX_CIRCUIT_TICKS || cells > MAX_CIRCUIT_CELLS {
        return Err(ProofError::CircuitTooLarge {
            ticks: num_ticks,
            slots,
        });
    }
    usize::try_from(num_ticks).map_err(|_| ProofError::CircuitTooLarge {
        ticks: num_ticks,
        slots,
    })
}

/// Config in effect at every tick in `0..num_ticks`.
///
/// Entry `t` is the last config stamped at or before `t`, or `None` before
/// the slot's first config.
///
/// # Errors
///
/// [`ProofError::CircuitTooLarge`] past [`MAX_CIRCUIT_TICKS`].
pub fn explode(configs: &[SlotConfig], num_ticks: u64) -> Result<Vec<Option<SlotConfig>>, ProofError> {
    let mut exploded = Vec::with_capacity(check_shape(num_ticks, 1)?);
    let mut cursor = 0;
    let mut current = None;
    for tick in 0..num_ticks {
        while let Some(config) = configs.get(cursor) {
            if config.tick.0 > tick {
                break;
            }
            current = Some(*config);
            cursor += 1;
        }
        exploded.push(current);
    }
    Ok(exploded)
}

/// Fixed-shape inputs of the yield circuit.
///
/// Rate arrays hold the rates a slot contributes at each tick, zero while
/// vacant. `action` holds the code of the config in effect, or
/// [`CircuitInputs::IDLE`] before a slot's first config.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CircuitInputs {
    pub current_tick: Tick,
    pub harvest: Vec<Vec<u64>>,
    pub yield_bonus: Vec<Vec<u64>>,
    pub attack_armour: Vec<Vec<u64>>,
    pub attack_health: Vec<Vec<u64>>,
    pub action: Vec<Vec<u8>>,
    /// `values_updated[t][s]` is set when slot `s` recorded a config at `t`.
    pub values_updated: Vec<Vec<bool>>,
    /// Commitment over each slot's whole log.
    pub values_hash: Vec<Commitment>,
}

impl CircuitInputs {
    pub const IDLE: u8 = u8::MAX;

    /// Expands `configs[slot]` over `num_ticks` ticks.
    ///
    /// # Errors
    ///
    /// * [`ProofError::CircuitTooLarge`] if the grid exceeds
    ///   [`MAX_CIRCUIT_TICKS`] or [`MAX_CIRCUIT_CELLS`].
    /// * [`ProofError::Replay`] for logs the replay would reject.
    pub fn generate(
        configs: &[Vec<SlotConfig>],
        num_ticks: u64,
        current_tick: Tick,
    ) -> Result<Self, ProofError> {
        let slots = configs.len();
        let ticks = check_shape(num_ticks, slots)?;
        let grid = || vec![vec![0u64; slots]; ticks];
        let mut inputs = Self {
            current_tick,
            harvest: grid(),
            yield_bonus: grid(),
            attack_armour: grid(),
            attack_health: grid(),
            action: vec![vec![Self::IDLE; slots]; ticks],
            values_updated: vec![vec![false; slots]; ticks],
            values_hash: Vec::with_capacity(slots),
        };

        for (index, log) in configs.iter().enumerate() {
            validate_configs(SlotId(u16::try_from(index).unwrap_or(u16::MAX)), log)?;

            for config in log {
                if let Some(row) = inputs.values_updated.get_mut(config.tick.0 as usize) {
                    row[index] = true;
                }
            }

            let mut occupancy = Occupancy::default();
            let mut cursor = 0;
            for tick in 0..ticks {
                while let Some(config) = log.get(cursor) {
                    if config.tick.0 as usize > tick {
                        break;
                    }
                    occupancy.apply(&config.action);
                    inputs.action[tick][index] = config.action.code();
                    cursor += 1;
                }
                let rates = if occupancy.present {
                    occupancy.rates()
                } else {
                    SeekerRates::ZERO
                };
                inputs.harvest[tick][index] = rates.harvest;
                inputs.yield_bonus[tick][index] = rates.yield_bonus;
                inputs.attack_armour[tick][index] = rates.attack_armour;
                inputs.attack_health[tick][index] = rates.attack_health;
            }

            inputs.values_hash.push(Commitment::chain(log));
        }
        Ok(inputs)
    }

    /// Harvest-session yield of `slot` at the current tick, summed from the
    /// expanded arrays.
    pub fn harvest_yield(&self, slot: usize) -> u64 {
        let end = (self.current_tick.0 as usize).min(self.harvest.len());
        (0..end)
            .map(|tick| self.harvest[tick][slot].saturating_add(self.yield_bonus[tick][slot]))
            .fold(0u64, u64::saturating_add)
    }
}

#[cfg(test)]
mod tests {
    use game_core::{BonusId, ReplayError, SeekerId, Vitals, replay_slot};

    use super::*;
    use crate::testing::played_session;

    fn rates(harvest: u64) -> SeekerRates {
        SeekerRates {
            harvest,
            ..SeekerRates::ZERO
        }
    }

    #[test]
    fn explode_holds_last_config() {
        let enter = SlotConfig::enter(Tick(2), SeekerId(1), Vitals::new(1, 1), rates(5));
        let equip = SlotConfig::equip(Tick(4), BonusId(1), rates(7));
        let leave = SlotConfig::leave(Tick(4));
        let exploded = explode(&[enter, equip, leave], 6).unwrap();

        assert_eq!(exploded.len(), 6);
        assert_eq!(exploded[0], None);
        assert_eq!(exploded[1], None);
        assert_eq!(exploded[2], Some(enter));
        assert_eq!(exploded[3], Some(enter));
        // same-tick configs: the later one wins
        assert_eq!(exploded[4], Some(leave));
        assert_eq!(exploded[5], Some(leave));
    }

    #[test]
    fn inputs_match_replay_and_commitments() {
        let session = played_session();
        let configs = session.log().configs();
        let inputs = CircuitInputs::generate(&configs, 100, Tick(20)).unwrap();

        assert_eq!(inputs.harvest[9], vec![5, 6]);
        assert_eq!(inputs.harvest[10], vec![0, 0]);
        assert_eq!(inputs.action[0], vec![0, 0]);
        assert_eq!(inputs.action[10], vec![3, 3]);
        assert!(inputs.values_updated[0].iter().all(|flag| *flag));
        assert!(inputs.values_updated[5].iter().all(|flag| !*flag));
        assert_eq!(inputs.values_hash, session.log().commitments());

        for (slot, log) in configs.iter().enumerate() {
            let replayed = replay_slot(SlotId(slot as u16), log, Tick(20)).unwrap();
            assert_eq!(inputs.harvest_yield(slot), replayed);
        }
    }

    #[test]
    fn idle_before_first_config() {
        let enter = SlotConfig::enter(Tick(3), SeekerId(1), Vitals::new(1, 1), rates(5));
        let inputs = CircuitInputs::generate(&[vec![enter]], 5, Tick(5)).unwrap();
        assert_eq!(inputs.action[2][0], CircuitInputs::IDLE);
        assert_eq!(inputs.action[3][0], 0);
        assert_eq!(inputs.harvest_yield(0), 10);
    }

    #[test]
    fn oversized_sessions_are_refused_before_allocating() {
        let enter = SlotConfig::enter(Tick(0), SeekerId(1), Vitals::new(1, 1), rates(5));
        let err = CircuitInputs::generate(&[vec![enter]], u64::MAX, Tick(5)).unwrap_err();
        assert!(matches!(err, ProofError::CircuitTooLarge { ticks: u64::MAX, slots: 1 }));

        let err = explode(&[enter], MAX_CIRCUIT_TICKS + 1).unwrap_err();
        assert!(matches!(err, ProofError::CircuitTooLarge { .. }));

        // wide rosters hit the cell cap below the tick cap
        let wide = vec![Vec::new(); 1 << 10];
        let err = CircuitInputs::generate(&wide, 2048, Tick(5)).unwrap_err();
        assert!(matches!(err, ProofError::CircuitTooLarge { ticks: 2048, slots: 1024 }));

        assert!(CircuitInputs::generate(&[vec![enter]], MAX_CIRCUIT_TICKS, Tick(5)).is_ok());
    }

    #[test]
    fn malformed_log_is_rejected() {
        let err = CircuitInputs::generate(&[vec![SlotConfig::leave(Tick(1))]], 5, Tick(5)).unwrap_err();
        assert!(matches!(err, ProofError::Replay(ReplayError::Malformed { .. })));
    }
}
