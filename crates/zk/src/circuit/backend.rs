//! Groth16 backend behind the [`Prover`] and [`ProofOracle`] seams.
//!
//! The prover holds the proving key of one [`CircuitShape`]; verifiers need
//! only the matching verifying key, which is safe to publish.

use std::fmt;

use ark_bn254::Bn254;
use ark_groth16::{PreparedVerifyingKey, VerifyingKey};
use ark_std::rand::{CryptoRng, RngCore};
use game_core::{ClaimStatement, ProofOracle, Session, SlotConfig, Tick};
use rand::rngs::OsRng;

use super::groth16::{self, Groth16Keys};
use super::{CircuitShape, YieldCircuit, public_inputs};
use crate::prover::{ProofBackend, ProofData, ProofError, ProvenClaim, Prover, prepare_statement};

/// Groth16 prover for harvest sessions of one shape.
#[derive(Clone)]
pub struct Groth16Prover {
    shape: CircuitShape,
    keys: Groth16Keys,
}

impl Groth16Prover {
    /// Runs the circuit-specific setup for `shape`.
    pub fn setup<R: RngCore + CryptoRng>(
        shape: CircuitShape,
        rng: &mut R,
    ) -> Result<Self, ProofError> {
        let keys = Groth16Keys::generate(YieldCircuit::blank(shape), rng)?;
        tracing::info!(
            slots = shape.slots,
            configs_per_slot = shape.configs_per_slot,
            "groth16 keys generated"
        );
        Ok(Self { shape, keys })
    }

    pub fn from_keys(shape: CircuitShape, keys: Groth16Keys) -> Self {
        Self { shape, keys }
    }

    pub fn shape(&self) -> CircuitShape {
        self.shape
    }

    pub fn keys(&self) -> &Groth16Keys {
        &self.keys
    }

    /// Verifier accepting this prover's proofs.
    pub fn verifier(&self) -> Groth16Verifier {
        Groth16Verifier::new(self.shape, &self.keys.verifying_key)
    }
}

impl fmt::Debug for Groth16Prover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Groth16Prover")
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

impl Prover for Groth16Prover {
    fn prove(
        &self,
        session: &Session,
        tick: Tick,
        configs: &[Vec<SlotConfig>],
    ) -> Result<ProvenClaim, ProofError> {
        let statement = prepare_statement(session, tick, configs)?;
        let circuit = YieldCircuit::new(self.shape, session, statement.clone(), configs)?;
        let proof = groth16::prove(circuit, &self.keys, &mut OsRng)?;
        let proof = ProofData {
            bytes: groth16::serialize_proof(&proof)?,
            backend: ProofBackend::Groth16,
        };
        tracing::debug!(
            tick = %statement.tick,
            bytes = proof.bytes.len(),
            "groth16 yield proof generated"
        );
        Ok(ProvenClaim { statement, proof })
    }

    fn verify(&self, proof: &ProofData, statement: &ClaimStatement) -> Result<bool, ProofError> {
        self.verifier().check(proof, statement)
    }
}

/// Verifies Groth16 proofs on record.
#[derive(Clone)]
pub struct Groth16Verifier {
    shape: CircuitShape,
    pvk: PreparedVerifyingKey<Bn254>,
}

impl Groth16Verifier {
    pub fn new(shape: CircuitShape, verifying_key: &VerifyingKey<Bn254>) -> Self {
        Self {
            shape,
            pvk: groth16::prepare_verifying_key(verifying_key),
        }
    }

    /// Verifier from a published, compressed verifying key.
    pub fn from_bytes(shape: CircuitShape, verifying_key: &[u8]) -> Result<Self, ProofError> {
        let vk = Groth16Keys::deserialize_verifying_key(verifying_key)?;
        if vk.gamma_abc_g1.len() != shape.public_input_len() + 1 {
            return Err(ProofError::CircuitProofError(format!(
                "verifying key has {} public inputs, shape {:?} needs {}",
                vk.gamma_abc_g1.len().saturating_sub(1),
                shape,
                shape.public_input_len()
            )));
        }
        Ok(Self::new(shape, &vk))
    }

    pub fn shape(&self) -> CircuitShape {
        self.shape
    }

    pub fn check(&self, proof: &ProofData, statement: &ClaimStatement) -> Result<bool, ProofError> {
        if proof.backend != ProofBackend::Groth16 {
            return Err(ProofError::BackendMismatch {
                expected: ProofBackend::Groth16,
                actual: proof.backend,
            });
        }
        let inputs = public_inputs(self.shape, statement)?;
        let proof = groth16::deserialize_proof(&proof.bytes)?;
        groth16::verify_with_prepared_vk(&proof, &inputs, &self.pvk)
    }
}

impl fmt::Debug for Groth16Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Groth16Verifier")
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

impl ProofOracle for Groth16Verifier {
    type Proof = ProofData;

    fn verify(&self, proof: &ProofData, statement: &ClaimStatement) -> bool {
        match self.check(proof, statement) {
            Ok(valid) => valid,
            Err(error) => {
                tracing::warn!(%error, "proof rejected");
                false
            }
        }
    }
}
