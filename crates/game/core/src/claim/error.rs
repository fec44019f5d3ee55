use crate::error::{ErrorSeverity, GameError};
use crate::replay::ReplayError;
use crate::state::{SlotId, Tick};

/// Why a claim disagrees with the trusted recomputation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MismatchReason {
    /// Claimed yield vector differs from the recomputed one.
    Yields { claimed: Vec<u64>, trusted: Vec<u64> },
    /// Supplied config log does not hash to the on-record commitment.
    Commitment { slot: SlotId },
    /// Proof rejected by the verifier.
    Proof,
    /// Wrong number of slots in the claim or the supplied logs.
    SlotCount { expected: usize, actual: usize },
}

impl std::fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yields { claimed, trusted } => {
                write!(f, "claimed yields {claimed:?}, recomputed {trusted:?}")
            }
            Self::Commitment { slot } => write!(f, "{slot} log does not match its commitment"),
            Self::Proof => f.write_str("proof rejected"),
            Self::SlotCount { expected, actual } => {
                write!(f, "expected {expected} slots, got {actual}")
            }
        }
    }
}

/// Errors raised while verifying a claim. A failed claim changes nothing.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClaimError {
    #[error("claim mismatch: {0}")]
    Mismatch(MismatchReason),

    #[error("{slot}: claim of {trusted} below already claimed {claimed}")]
    NonMonotonic {
        slot: SlotId,
        claimed: u64,
        trusted: u64,
    },

    #[error("supplied log rejected: {0}")]
    Malformed(#[from] ReplayError),

    #[error("unknown {0}")]
    UnknownSlot(SlotId),

    #[error("claim at tick {tick} is ahead of session tick {current}")]
    FutureTick { tick: Tick, current: Tick },
}

impl GameError for ClaimError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::FutureTick { .. } => ErrorSeverity::Recoverable,
            Self::Mismatch(_) | Self::NonMonotonic { .. } | Self::UnknownSlot(_) => {
                ErrorSeverity::Validation
            }
            Self::Malformed(error) => error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Mismatch(MismatchReason::Yields { .. }) => "CLAIM_MISMATCH_YIELDS",
            Self::Mismatch(MismatchReason::Commitment { .. }) => "CLAIM_MISMATCH_COMMITMENT",
            Self::Mismatch(MismatchReason::Proof) => "CLAIM_MISMATCH_PROOF",
            Self::Mismatch(MismatchReason::SlotCount { .. }) => "CLAIM_MISMATCH_SLOT_COUNT",
            Self::NonMonotonic { .. } => "CLAIM_NON_MONOTONIC",
            Self::Malformed(_) => "CLAIM_MALFORMED_LOG",
            Self::UnknownSlot(_) => "CLAIM_UNKNOWN_SLOT",
            Self::FutureTick { .. } => "CLAIM_FUTURE_TICK",
        }
    }
}
