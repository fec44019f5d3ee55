//! Trusted-prover attestation backend.
//!
//! The prover replays the logs off-chain and tags the encoded statement with
//! a secret it shares with the verifier:
//!
//! ```text
//! tag = sha256(secret || statement.encode())
//! ```
//!
//! This is not a proof. Checking a tag requires the same secret that mints
//! one, so every verifier can attest to any statement it likes. Use it for
//! development and for deployments where prover and verifier are the same
//! trusted operator; anything else needs the `arkworks` Groth16 backend.

use std::fmt;

use game_core::{ClaimStatement, ProofOracle, Session, SlotConfig, Tick};
use sha2::{Digest, Sha256};

use crate::prover::{ProofBackend, ProofData, ProofError, ProvenClaim, Prover, prepare_statement};

/// Shared secret of an [`AttestationProver`] and the verifiers trusting it.
///
/// Holding the key is enough to mint attestations; keep it out of reach of
/// anyone who could profit from a forged claim.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AttestationKey([u8; 32]);

impl AttestationKey {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derives a key from an arbitrary secret.
    pub fn from_secret(secret: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"seeker-yield-key");
        hasher.update(secret);
        Self(hasher.finalize().into())
    }

    /// Short public identifier, safe to log.
    pub fn fingerprint(&self) -> String {
        hex::encode(&Sha256::digest(self.0)[..4])
    }

    fn tag(&self, statement: &ClaimStatement) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.0);
        hasher.update(statement.encode());
        hasher.finalize().into()
    }
}

// never print the key itself
impl fmt::Debug for AttestationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AttestationKey")
            .field(&self.fingerprint())
            .finish()
    }
}

/// Off-chain prover issuing attestations.
#[derive(Debug, Clone)]
pub struct AttestationProver {
    key: AttestationKey,
}

impl AttestationProver {
    pub fn new(key: AttestationKey) -> Self {
        Self { key }
    }

    /// Attests to `statement` without replaying anything.
    pub fn tag(&self, statement: &ClaimStatement) -> ProofData {
        ProofData {
            bytes: self.key.tag(statement).to_vec(),
            backend: ProofBackend::Attestation,
        }
    }

    /// Verifier accepting this prover's attestations.
    pub fn verifier(&self) -> AttestationVerifier {
        AttestationVerifier::new(self.key)
    }
}

impl Prover for AttestationProver {
    fn prove(
        &self,
        session: &Session,
        tick: Tick,
        configs: &[Vec<SlotConfig>],
    ) -> Result<ProvenClaim, ProofError> {
        let statement = prepare_statement(session, tick, configs)?;
        let proof = self.tag(&statement);
        tracing::debug!(
            tick = %statement.tick,
            key = %self.key.fingerprint(),
            proof = %proof.to_hex(),
            "yield attestation issued"
        );
        Ok(ProvenClaim { statement, proof })
    }

    fn verify(&self, proof: &ProofData, statement: &ClaimStatement) -> Result<bool, ProofError> {
        self.verifier().check(proof, statement)
    }
}

/// Checks attestations on record.
///
/// Can mint attestations itself, see [`AttestationKey`].
#[derive(Debug, Clone)]
pub struct AttestationVerifier {
    key: AttestationKey,
}

impl AttestationVerifier {
    pub fn new(key: AttestationKey) -> Self {
        Self { key }
    }

    pub fn check(&self, proof: &ProofData, statement: &ClaimStatement) -> Result<bool, ProofError> {
        if proof.backend != ProofBackend::Attestation {
            return Err(ProofError::BackendMismatch {
                expected: ProofBackend::Attestation,
                actual: proof.backend,
            });
        }
        Ok(proof.bytes == self.key.tag(statement))
    }
}

impl ProofOracle for AttestationVerifier {
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
