//! Sources of trusted yields.
//!
//! Both witnesses end up at the same replay: [`DirectReplay`] runs it on the
//! supplied logs, [`ProofCarrying`] relies on a proof that the prover ran it
//! on logs matching the on-record commitments.

use super::{Claim, ClaimError, ClaimStatement, MismatchReason};
use crate::action::Commitment;
use crate::env::ProofOracle;
use crate::session::Session;
use crate::state::{SlotConfig, SlotId, Tick};

/// Produces the yield vector a claim is checked against.
pub trait YieldWitness {
    /// Trusted yields of every slot at `tick` (already clamped).
    fn trusted_yields(
        &self,
        session: &Session,
        claim: &Claim,
        tick: Tick,
    ) -> Result<Vec<u64>, ClaimError>;
}

/// Caller supplies every slot's full config log; the session re-runs the
/// replay itself.
#[derive(Clone, Copy, Debug)]
pub struct DirectReplay<'a> {
    pub configs: &'a [Vec<SlotConfig>],
}

impl<'a> DirectReplay<'a> {
    pub fn new(configs: &'a [Vec<SlotConfig>]) -> Self {
        Self { configs }
    }
}

impl YieldWitness for DirectReplay<'_> {
    fn trusted_yields(
        &self,
        session: &Session,
        _claim: &Claim,
        tick: Tick,
    ) -> Result<Vec<u64>, ClaimError> {
        let slots = session.slots();
        if self.configs.len() != slots.len() {
            return Err(ClaimError::Mismatch(MismatchReason::SlotCount {
                expected: slots.len(),
                actual: self.configs.len(),
            }));
        }
        for (index, (log, slot)) in self.configs.iter().zip(slots).enumerate() {
            if Commitment::chain(log) != slot.commitment {
                let slot = SlotId(u16::try_from(index).unwrap_or(u16::MAX));
                return Err(ClaimError::Mismatch(MismatchReason::Commitment { slot }));
            }
        }
        Ok(session.slot_yields(tick, self.configs)?)
    }
}

/// Caller supplies a proof whose public signals are the claimed yields plus
/// the on-record commitments.
pub struct ProofCarrying<'a, O: ProofOracle + ?Sized> {
    pub proof: &'a O::Proof,
    pub oracle: &'a O,
}

impl<'a, O: ProofOracle + ?Sized> ProofCarrying<'a, O> {
    pub fn new(proof: &'a O::Proof, oracle: &'a O) -> Self {
        Self { proof, oracle }
    }
}

impl<O: ProofOracle + ?Sized> YieldWitness for ProofCarrying<'_, O> {
    fn trusted_yields(
        &self,
        session: &Session,
        claim: &Claim,
        tick: Tick,
    ) -> Result<Vec<u64>, ClaimError> {
        let statement = ClaimStatement::for_session(session, tick, claim.yields.clone());
        if self.oracle.verify(self.proof, &statement) {
            Ok(statement.yields)
        } else {
            Err(ClaimError::Mismatch(MismatchReason::Proof))
        }
    }
}
