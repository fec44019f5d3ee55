use crate::claim::ClaimStatement;

/// Verifies proofs whose public signals are a [`ClaimStatement`].
///
/// The circuit behind the proof is expected to enforce the same replay the
/// session runs directly, over config logs matching the statement's
/// commitments.
pub trait ProofOracle {
    type Proof;

    fn verify(&self, proof: &Self::Proof, statement: &ClaimStatement) -> bool;
}
