//! Universal prover interface for yield proofs.
//!
//! Defines the common interface implemented by all proving backends.

use game_core::{
    Claim, ClaimStatement, Commitment, ReplayError, Session, SlotConfig, SlotId, Tick,
};

/// Proof data container.
///
/// Contains serialized proof bytes and backend identifier.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProofData {
    pub bytes: Vec<u8>,
    pub backend: ProofBackend,
}

impl ProofData {
    /// Wire form used when a proof leaves the process.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProofError> {
        bincode::serialize(self).map_err(|e| ProofError::SerializationError(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProofError> {
        bincode::deserialize(bytes).map_err(|e| ProofError::SerializationError(e.to_string()))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

/// Identifies which proving backend generated a proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ProofBackend {
    /// Keyed tag from a trusted prover; see [`crate::attestation`].
    Attestation,

    #[cfg(feature = "arkworks")]
    Groth16,

    #[cfg(feature = "stub")]
    Stub,
}

/// Errors that can occur during proof generation or verification.
#[derive(Debug, thiserror::Error)]
pub enum ProofError {
    #[error("expected {expected} slot logs, got {actual}")]
    SlotCount { expected: usize, actual: usize },

    #[error("config log of slot {slot} does not match its on-record commitment")]
    CommitmentMismatch { slot: SlotId },

    #[error(transparent)]
    Replay(#[from] ReplayError),

    #[error("{ticks} ticks over {slots} slots exceeds the circuit size limit")]
    CircuitTooLarge { ticks: u64, slots: usize },

    #[error("circuit proofs only cover harvest sessions")]
    UnsupportedVariant,

    #[cfg(feature = "arkworks")]
    #[error("{slots} slots with up to {configs} configs do not fit circuit {shape:?}")]
    ShapeMismatch {
        shape: crate::circuit::CircuitShape,
        slots: usize,
        configs: usize,
    },

    #[cfg(feature = "arkworks")]
    #[error("Circuit proof generation failed: {0}")]
    CircuitProofError(String),

    #[error("{expected:?} verifier cannot check {actual:?} proofs")]
    BackendMismatch {
        expected: ProofBackend,
        actual: ProofBackend,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Statement together with the proof attesting to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenClaim {
    pub statement: ClaimStatement,
    pub proof: ProofData,
}

impl ProvenClaim {
    /// Claim for `slot` carrying the proven yields.
    pub fn claim(&self, slot: SlotId) -> Claim {
        Claim::new(slot, self.statement.tick, self.statement.yields.clone())
    }
}

/// Universal prover interface for all proving backends.
pub trait Prover: Send + Sync {
    /// Replays `configs` at `tick` and proves the resulting statement.
    ///
    /// `tick` is clamped to the session length; the statement carries the
    /// clamped tick.
    fn prove(
        &self,
        session: &Session,
        tick: Tick,
        configs: &[Vec<SlotConfig>],
    ) -> Result<ProvenClaim, ProofError>;

    /// Verify a proof locally (for testing and debugging).
    fn verify(&self, proof: &ProofData, statement: &ClaimStatement) -> Result<bool, ProofError>;
}

/// Builds the statement a prover attests to.
///
/// The logs are checked against the session's commitments before replaying,
/// so a prover never signs yields derived from a forged history.
pub fn prepare_statement(
    session: &Session,
    tick: Tick,
    configs: &[Vec<SlotConfig>],
) -> Result<ClaimStatement, ProofError> {
    let slots = session.slots();
    if configs.len() != slots.len() {
        return Err(ProofError::SlotCount {
            expected: slots.len(),
            actual: configs.len(),
        });
    }
    for (index, (log, slot)) in configs.iter().zip(slots).enumerate() {
        if Commitment::chain(log) != slot.commitment {
            return Err(ProofError::CommitmentMismatch {
                slot: SlotId(u16::try_from(index).unwrap_or(u16::MAX)),
            });
        }
    }

    let tick = session.clamp_tick(tick);
    let yields = session.slot_yields(tick, configs)?;
    Ok(ClaimStatement::for_session(session, tick, yields))
}

// ============================================================================
// Stub Prover
// ============================================================================

/// Stub prover for testing and development.
///
/// Returns dummy proofs without actual proving. As an oracle it accepts any
/// stub proof for any statement.
///
/// **Warning**: Provides no guarantees - do not use in production.
#[cfg(feature = "stub")]
#[derive(Debug, Clone, Copy, Default)]
pub struct StubProver;

#[cfg(feature = "stub")]
impl StubProver {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "stub")]
impl Prover for StubProver {
    fn prove(
        &self,
        session: &Session,
        tick: Tick,
        configs: &[Vec<SlotConfig>],
    ) -> Result<ProvenClaim, ProofError> {
        let statement = prepare_statement(session, tick, configs)?;
        Ok(ProvenClaim {
            statement,
            proof: ProofData {
                bytes: vec![0xDE, 0xAD, 0xBE, 0xEF],
                backend: ProofBackend::Stub,
            },
        })
    }

    fn verify(&self, proof: &ProofData, _statement: &ClaimStatement) -> Result<bool, ProofError> {
        if proof.backend != ProofBackend::Stub {
            return Err(ProofError::BackendMismatch {
                expected: ProofBackend::Stub,
                actual: proof.backend,
            });
        }
        Ok(true)
    }
}

#[cfg(feature = "stub")]
impl game_core::ProofOracle for StubProver {
    type Proof = ProofData;

    fn verify(&self, proof: &ProofData, statement: &ClaimStatement) -> bool {
        matches!(Prover::verify(self, proof, statement), Ok(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::played_session;

    #[test]
    fn statement_rejects_foreign_logs() {
        let session = played_session();
        let mut configs = session.log().configs();

        let err = prepare_statement(&session, Tick(20), &configs[..1]).unwrap_err();
        assert!(matches!(err, ProofError::SlotCount { expected: 2, actual: 1 }));

        configs[1].pop();
        let err = prepare_statement(&session, Tick(20), &configs).unwrap_err();
        assert!(matches!(err, ProofError::CommitmentMismatch { slot: SlotId(1) }));
    }

    #[test]
    fn statement_tick_is_clamped() {
        let session = played_session();
        let configs = session.log().configs();
        let statement = prepare_statement(&session, Tick(500), &configs).unwrap();
        assert_eq!(statement.tick, Tick(session.config().num_ticks));
        assert_eq!(statement.yields, vec![50, 60]);
    }

    #[test]
    fn garbage_bytes_do_not_decode() {
        let err = ProofData::from_bytes(&[0xFF; 3]).unwrap_err();
        assert!(matches!(err, ProofError::SerializationError(_)));
    }

    #[cfg(feature = "stub")]
    #[test]
    fn stub_accepts_any_statement() {
        use game_core::ProofOracle;

        let session = played_session();
        let configs = session.log().configs();
        let proven = StubProver::new().prove(&session, Tick(20), &configs).unwrap();
        let mut forged = proven.statement.clone();
        forged.yields = vec![1_000, 1_000];
        assert!(ProofOracle::verify(&StubProver, &proven.proof, &forged));
    }
}
