//! Groth16 proving and verification on BN254 curve.

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, PreparedVerifyingKey, Proof, ProvingKey, VerifyingKey};
use ark_relations::r1cs::ConstraintSynthesizer;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::rand::RngCore;

use crate::prover::ProofError;

/// Groth16 proving and verifying keys
///
/// Generated by a circuit-specific setup. The verifying key is public; the
/// setup randomness must be discarded.
#[derive(Clone)]
pub struct Groth16Keys {
    /// Proving key (used by prover)
    pub proving_key: ProvingKey<Bn254>,
    /// Verifying key (public, used by verifier)
    pub verifying_key: VerifyingKey<Bn254>,
}

impl Groth16Keys {
    /// Generate keys from a circuit (trusted setup)
    ///
    /// # Security Warning
    /// Whoever knows the setup randomness can forge proofs. In production,
    /// use a multi-party computation ceremony.
    pub fn generate<C, R>(circuit: C, rng: &mut R) -> Result<Self, ProofError>
    where
        C: ConstraintSynthesizer<Fr>,
        R: RngCore,
    {
        let params = Groth16::<Bn254>::generate_random_parameters_with_reduction(circuit, rng)
            .map_err(|e| {
                ProofError::CircuitProofError(format!("Groth16 key generation failed: {:?}", e))
            })?;

        Ok(Self {
            verifying_key: params.vk.clone(),
            proving_key: params,
        })
    }

    /// Serialize verifying key to bytes
    ///
    /// Uses compressed serialization for smaller size.
    pub fn serialize_verifying_key(&self) -> Result<Vec<u8>, ProofError> {
        let mut bytes = Vec::new();
        self.verifying_key
            .serialize_compressed(&mut bytes)
            .map_err(|e| ProofError::SerializationError(e.to_string()))?;
        Ok(bytes)
    }

    /// Deserialize verifying key from bytes
    pub fn deserialize_verifying_key(bytes: &[u8]) -> Result<VerifyingKey<Bn254>, ProofError> {
        VerifyingKey::<Bn254>::deserialize_compressed(bytes)
            .map_err(|e| ProofError::SerializationError(e.to_string()))
    }

    /// Serialize both keys to bytes
    ///
    /// Format: [pk_len (8 bytes)][pk_bytes][vk_bytes]
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProofError> {
        let mut pk_bytes = Vec::new();
        self.proving_key
            .serialize_compressed(&mut pk_bytes)
            .map_err(|e| ProofError::SerializationError(e.to_string()))?;
        let vk_bytes = self.serialize_verifying_key()?;

        let mut bytes = Vec::with_capacity(8 + pk_bytes.len() + vk_bytes.len());
        bytes.extend_from_slice(&(pk_bytes.len() as u64).to_le_bytes());
        bytes.extend_from_slice(&pk_bytes);
        bytes.extend_from_slice(&vk_bytes);
        Ok(bytes)
    }

    /// Deserialize both keys from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProofError> {
        let too_short = || ProofError::SerializationError("Invalid key bytes: too short".into());
        let (len, rest) = bytes.split_first_chunk::<8>().ok_or_else(too_short)?;
        let pk_len = usize::try_from(u64::from_le_bytes(*len)).map_err(|_| too_short())?;
        if rest.len() < pk_len {
            return Err(too_short());
        }
        let (pk_bytes, vk_bytes) = rest.split_at(pk_len);

        let proving_key = ProvingKey::<Bn254>::deserialize_compressed(pk_bytes)
            .map_err(|e| ProofError::SerializationError(e.to_string()))?;
        let verifying_key = Self::deserialize_verifying_key(vk_bytes)?;
        Ok(Self {
            proving_key,
            verifying_key,
        })
    }
}

/// Generate a Groth16 proof
pub fn prove<C, R>(circuit: C, keys: &Groth16Keys, rng: &mut R) -> Result<Proof<Bn254>, ProofError>
where
    C: ConstraintSynthesizer<Fr>,
    R: RngCore,
{
    Groth16::<Bn254>::create_random_proof_with_reduction(circuit, &keys.proving_key, rng)
        .map_err(|e| ProofError::CircuitProofError(format!("Groth16 proving failed: {:?}", e)))
}

/// Serialize a proof to bytes
pub fn serialize_proof(proof: &Proof<Bn254>) -> Result<Vec<u8>, ProofError> {
    let mut bytes = Vec::new();
    proof
        .serialize_compressed(&mut bytes)
        .map_err(|e| ProofError::SerializationError(e.to_string()))?;
    Ok(bytes)
}

/// Deserialize a proof from bytes
pub fn deserialize_proof(bytes: &[u8]) -> Result<Proof<Bn254>, ProofError> {
    Proof::<Bn254>::deserialize_compressed(bytes)
        .map_err(|e| ProofError::SerializationError(e.to_string()))
}

/// Prepare verifying key for repeated verification
pub fn prepare_verifying_key(vk: &VerifyingKey<Bn254>) -> PreparedVerifyingKey<Bn254> {
    ark_groth16::prepare_verifying_key(vk)
}

/// Verify a proof using a prepared verifying key
pub fn verify_with_prepared_vk(
    proof: &Proof<Bn254>,
    public_inputs: &[Fr],
    pvk: &PreparedVerifyingKey<Bn254>,
) -> Result<bool, ProofError> {
    Groth16::<Bn254>::verify_proof(pvk, proof, public_inputs)
        .map_err(|e| ProofError::CircuitProofError(format!("Groth16 verification failed: {:?}", e)))
}
