//! Small R1CS gadgets over BN254 shared by the yield circuit.
//!
//! Flags are carried as `FpVar`s constrained to 0 or 1 so selections and
//! masks stay single multiplications.

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

/// Packs a digest into two 128-bit little-endian limbs.
pub fn pack_digest(bytes: &[u8; 32]) -> [Fr; 2] {
    let mut lo = [0u8; 16];
    let mut hi = [0u8; 16];
    lo.copy_from_slice(&bytes[..16]);
    hi.copy_from_slice(&bytes[16..]);
    [
        Fr::from(u128::from_le_bytes(lo)),
        Fr::from(u128::from_le_bytes(hi)),
    ]
}

/// In-circuit [`pack_digest`].
pub fn pack_digest_var(bytes: &[UInt8<Fr>]) -> Result<[FpVar<Fr>; 2], SynthesisError> {
    let (lo, hi) = bytes.split_at(bytes.len() / 2);
    Ok([le_bytes_to_fp(lo)?, le_bytes_to_fp(hi)?])
}

/// Field element of little-endian `bits`.
pub fn le_bits_to_fp(bits: &[Boolean<Fr>]) -> FpVar<Fr> {
    let mut acc = FpVar::zero();
    let mut weight = Fr::from(1u64);
    for bit in bits {
        acc += FpVar::from(bit.clone()) * weight;
        weight += weight;
    }
    acc
}

/// Field element of little-endian `bytes`; at most 31 bytes fit.
pub fn le_bytes_to_fp(bytes: &[UInt8<Fr>]) -> Result<FpVar<Fr>, SynthesisError> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for byte in bytes {
        bits.extend(ToBitsGadget::to_bits_le(byte)?);
    }
    Ok(le_bits_to_fp(&bits))
}

/// Constrains `value < 2^width` and returns its bits, least significant
/// first.
pub fn enforce_width(
    cs: ConstraintSystemRef<Fr>,
    value: &FpVar<Fr>,
    width: usize,
) -> Result<Vec<Boolean<Fr>>, SynthesisError> {
    let native = value.value().ok().map(|v| v.into_bigint().to_bits_le());
    let bits = (0..width)
        .map(|i| {
            Boolean::new_witness(cs.clone(), || {
                native
                    .as_ref()
                    .and_then(|bits| bits.get(i).copied())
                    .ok_or(SynthesisError::AssignmentMissing)
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    le_bits_to_fp(&bits).enforce_equal(value)?;
    Ok(bits)
}

/// 1 if `a < b`, else 0. Both operands must already be below `2^64`.
pub fn is_lt(
    cs: ConstraintSystemRef<Fr>,
    a: &FpVar<Fr>,
    b: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    // a + 2^64 - b lies in [1, 2^65); bit 64 is set exactly when a >= b
    let shifted = a + Fr::from(1u128 << 64) - b;
    let bits = enforce_width(cs, &shifted, 65)?;
    Ok(FpVar::one() - FpVar::from(bits[64].clone()))
}

/// `a` where `flag` is 1, `b` where it is 0.
pub fn pick(flag: &FpVar<Fr>, a: &FpVar<Fr>, b: &FpVar<Fr>) -> FpVar<Fr> {
    b + flag * (a - b)
}

/// Allocates a 0/1 witness flag.
pub fn new_flag(
    cs: ConstraintSystemRef<Fr>,
    value: Option<bool>,
) -> Result<FpVar<Fr>, SynthesisError> {
    Boolean::new_witness(cs, || value.ok_or(SynthesisError::AssignmentMissing)).map(FpVar::from)
}
