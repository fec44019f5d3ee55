//! Rolling slot commitments.
//!
//! Every config appended to a slot is folded into a SHA-256 hash chain. The
//! chain head is stored on record, so any supplied config log (from the
//! public event stream or a prover) can be checked against it: dropping,
//! reordering, or editing a single entry changes the head.
//!
//! ```text
//! c0     = [0; 32]
//! c(n+1) = sha256(c(n) || encode(config(n)))
//! ```
//!
//! `encode` is a fixed-width little-endian layout rather than a serializer
//! output, so the chain is identical wherever it is computed, including
//! inside a proving circuit.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::state::{SeekerRates, SlotAction, SlotConfig, Vitals};

/// Head of a slot's rolling hash chain.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Commitment(pub [u8; 32]);

impl Commitment {
    /// Commitment of an empty slot.
    pub const EMPTY: Self = Self([0u8; 32]);

    /// Folds one more config into the chain.
    #[must_use]
    pub fn extend(&self, config: &SlotConfig) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(self.0);
        hasher.update(encode_config(config));
        Self(hasher.finalize().into())
    }

    /// Commitment over a whole ordered config sequence.
    pub fn chain<'a>(configs: impl IntoIterator<Item = &'a SlotConfig>) -> Self {
        configs
            .into_iter()
            .fold(Self::EMPTY, |head, config| head.extend(config))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", hex::encode(&self.0[..8]))
    }
}

/// Length of [`encode_config`] output for every action kind.
pub const ENCODED_CONFIG_LEN: usize = 61;

/// Canonical byte encoding of a config.
///
/// ```text
/// tick u64 | code u8 | id u32 | armour u64 | health u64 |
/// attack_armour u64 | attack_health u64 | harvest u64 | yield_bonus u64
/// ```
///
/// Fields an action does not carry are zero, so every chain step hashes the
/// same number of bytes.
pub fn encode_config(config: &SlotConfig) -> [u8; ENCODED_CONFIG_LEN] {
    let (id, vitals, rates) = match &config.action {
        SlotAction::Enter {
            seeker,
            vitals,
            rates,
        } => (seeker.0, *vitals, *rates),
        SlotAction::Equip { bonus, rates } => (bonus.0, Vitals::new(0, 0), *rates),
        SlotAction::Drink { bonus, boost } => (bonus.0, Vitals::new(0, 0), *boost),
        SlotAction::Leave => (0, Vitals::new(0, 0), SeekerRates::ZERO),
    };

    let mut out = [0u8; ENCODED_CONFIG_LEN];
    out[0..8].copy_from_slice(&config.tick.0.to_le_bytes());
    out[8] = config.action.code();
    out[9..13].copy_from_slice(&id.to_le_bytes());
    out[13..21].copy_from_slice(&vitals.armour.to_le_bytes());
    out[21..29].copy_from_slice(&vitals.health.to_le_bytes());
    out[29..37].copy_from_slice(&rates.attack_armour.to_le_bytes());
    out[37..45].copy_from_slice(&rates.attack_health.to_le_bytes());
    out[45..53].copy_from_slice(&rates.harvest.to_le_bytes());
    out[53..61].copy_from_slice(&rates.yield_bonus.to_le_bytes());
    out
}
