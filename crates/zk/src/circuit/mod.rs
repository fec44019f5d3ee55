//! Arkworks circuit proving backend.
//!
//! A Groth16 proof over BN254 that the claimed yields are the harvest replay
//! of config logs hashing to the on-record commitments:
//!
//! ```text
//! public:  tick | yields[S] | commitments[S] (2 limbs each) | params (2 limbs)
//! witness: num_ticks, iteration, S x K encoded configs, per-slot log length
//!
//! for each slot s:
//!     head(0)   = [0; 32]
//!     head(k+1) = sha256(head(k) || config(s, k))
//!     head(len(s)) == commitments[s]
//!     yields[s] == sum over real configs of rate * span
//! params == sha256(domain || num_ticks || S || iteration || harvest)
//! ```
//!
//! The circuit has a fixed [`CircuitShape`]: every slot carries exactly `K`
//! config positions, of which the first `len(s)` are real. Keys are
//! generated once per shape and are not interchangeable across shapes.
//!
//! Dungeon sessions stop accruing on a fight outcome the circuit does not
//! model; they are refused by the prover and cannot satisfy the params
//! check.

mod backend;
pub mod gadgets;
pub mod groth16;
mod yield_circuit;

pub use backend::{Groth16Prover, Groth16Verifier};
pub use groth16::Groth16Keys;
pub use yield_circuit::{YieldCircuit, YieldWitness, public_inputs};

use serde::{Deserialize, Serialize};

/// Dimensions a set of Groth16 keys is generated for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CircuitShape {
    /// Roster slots of the sessions the keys serve.
    pub slots: usize,
    /// Config positions per slot; longer logs cannot be proven.
    pub configs_per_slot: usize,
}

impl CircuitShape {
    pub const fn new(slots: usize, configs_per_slot: usize) -> Self {
        Self {
            slots,
            configs_per_slot,
        }
    }

    /// Number of public field elements a statement expands to.
    pub const fn public_input_len(&self) -> usize {
        1 + self.slots * 3 + 2
    }
}
