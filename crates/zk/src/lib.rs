//! Yield proofs for reward claims.
//!
//! This crate provides a unified interface for proving backends:
//! - **Groth16** (`arkworks`): circuit proof over BN254, checked against a
//!   public verifying key
//! - **Attestation**: keyed SHA-256 tag by a trusted off-chain prover; the
//!   verifier holds the same key and could mint tags itself
//! - **Stub**: dummy prover for fast development iteration
//!
//! Every backend covers the same statement: running the yield replay over
//! config logs that hash to the on-record commitments yields the claimed
//! vector at the claimed tick. [`witness`] expands those logs into per-tick
//! arrays for external tooling.
//!
//! # Feature Flags
//!
//! - `arkworks`: Groth16 circuit backend
//! - `stub`: stub prover returning dummy proofs
//!
//! # Examples
//!
//! ```toml
//! # Groth16 backend
//! zk = { path = "../zk", features = ["arkworks"] }
//!
//! # Use stub prover for fast iteration
//! zk = { path = "../zk", features = ["stub"] }
//! ```

pub mod attestation;
pub mod prover;
pub mod witness;

#[cfg(feature = "arkworks")]
pub mod circuit;

#[cfg(test)]
pub(crate) mod testing;

pub use attestation::{AttestationKey, AttestationProver, AttestationVerifier};
pub use prover::{ProofBackend, ProofData, ProofError, ProvenClaim, Prover, prepare_statement};
pub use witness::{CircuitInputs, MAX_CIRCUIT_CELLS, MAX_CIRCUIT_TICKS, explode};

#[cfg(feature = "arkworks")]
pub use circuit::{CircuitShape, Groth16Keys, Groth16Prover, Groth16Verifier};

#[cfg(feature = "stub")]
pub use prover::StubProver;

// Re-export commonly used types from game-core
pub use game_core::{ClaimStatement, ProofOracle, Session, SlotConfig};
