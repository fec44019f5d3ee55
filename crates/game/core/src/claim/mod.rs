//! Reward claims.
//!
//! A claim withdraws the difference between a slot's recomputed yield and
//! what it already claimed. The claimed vector must match the trusted
//! recomputation for every slot, not just the claimant's, so a forged log
//! cannot shift yield between slots unnoticed.
//!
//! Verification is all-or-nothing: any error leaves `claimed` untouched.

mod error;
mod witness;

pub use error::{ClaimError, MismatchReason};
pub use witness::{DirectReplay, ProofCarrying, YieldWitness};

use sha2::{Digest, Sha256};

use crate::action::Commitment;
use crate::session::Session;
use crate::state::{SlotId, Tick};

/// Withdrawal request for one slot.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Claim {
    pub slot: SlotId,
    /// Session-relative tick the yields were computed at.
    pub tick: Tick,
    /// Yields of every slot at `tick`.
    pub yields: Vec<u64>,
}

impl Claim {
    pub fn new(slot: SlotId, tick: Tick, yields: Vec<u64>) -> Self {
        Self { slot, tick, yields }
    }
}

/// Public signals of a yield proof.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClaimStatement {
    pub tick: Tick,
    pub yields: Vec<u64>,
    /// On-record commitment of every slot's config log.
    pub commitments: Vec<Commitment>,
    /// [`Session::params_digest`] of the session the yields belong to.
    pub params: [u8; 32],
}

impl ClaimStatement {
    /// Statement over the session's on-record commitments and parameters.
    pub fn for_session(session: &Session, tick: Tick, yields: Vec<u64>) -> Self {
        Self {
            tick,
            yields,
            commitments: session.log().commitments(),
            params: session.params_digest(),
        }
    }

    /// Canonical little-endian encoding, stable across platforms.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(48 + self.yields.len() * 8 + self.commitments.len() * 32);
        out.extend_from_slice(&self.params);
        out.extend_from_slice(&self.tick.0.to_le_bytes());
        out.extend_from_slice(&(self.yields.len() as u32).to_le_bytes());
        for value in &self.yields {
            out.extend_from_slice(&value.to_le_bytes());
        }
        out.extend_from_slice(&(self.commitments.len() as u32).to_le_bytes());
        for commitment in &self.commitments {
            out.extend_from_slice(commitment.as_bytes());
        }
        out
    }

    pub fn digest(&self) -> [u8; 32] {
        Sha256::digest(self.encode()).into()
    }
}

/// Accepted claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Payout {
    pub slot: SlotId,
    /// Amount to transfer: new claimed total minus the previous one.
    pub amount: u64,
    /// Slot's claimed total after this claim.
    pub claimed: u64,
}

impl Session {
    /// Verifies `claim` against `witness` and records it.
    ///
    /// The claim tick may not be ahead of the session's current tick and is
    /// clamped to the session length before replaying.
    ///
    /// # Errors
    ///
    /// * [`ClaimError::FutureTick`] / [`ClaimError::UnknownSlot`] for bad requests
    /// * [`ClaimError::Mismatch`] when the yields, logs, or proof disagree
    /// * [`ClaimError::Malformed`] when a supplied log cannot be replayed
    /// * [`ClaimError::NonMonotonic`] when the recomputed yield is below
    ///   what the slot already claimed
    pub fn claim_reward(
        &mut self,
        now: u64,
        claim: &Claim,
        witness: &dyn YieldWitness,
    ) -> Result<Payout, ClaimError> {
        let result = self.verify_claim(now, claim, witness);
        match &result {
            Ok(payout) => {
                self.log_mut().set_claimed(payout.slot, payout.claimed);
                tracing::info!(
                    slot = %payout.slot,
                    amount = payout.amount,
                    claimed = payout.claimed,
                    "claim accepted"
                );
            }
            Err(error) => tracing::warn!(slot = %claim.slot, %error, "claim rejected"),
        }
        result
    }

    fn verify_claim(
        &self,
        now: u64,
        claim: &Claim,
        witness: &dyn YieldWitness,
    ) -> Result<Payout, ClaimError> {
        let current = self.current_tick(now);
        if claim.tick > current {
            return Err(ClaimError::FutureTick {
                tick: claim.tick,
                current,
            });
        }
        let slot = self
            .slot(claim.slot)
            .ok_or(ClaimError::UnknownSlot(claim.slot))?;
        let expected = self.slots().len();
        if claim.yields.len() != expected {
            return Err(ClaimError::Mismatch(MismatchReason::SlotCount {
                expected,
                actual: claim.yields.len(),
            }));
        }

        let trusted = witness.trusted_yields(self, claim, self.clamp_tick(claim.tick))?;
        if trusted != claim.yields {
            return Err(ClaimError::Mismatch(MismatchReason::Yields {
                claimed: claim.yields.clone(),
                trusted,
            }));
        }

        let value = trusted[claim.slot.index()];
        if value < slot.claimed {
            return Err(ClaimError::NonMonotonic {
                slot: claim.slot,
                claimed: slot.claimed,
                trusted: value,
            });
        }
        Ok(Payout {
            slot: claim.slot,
            amount: value - slot.claimed,
            claimed: value,
        })
    }
}
