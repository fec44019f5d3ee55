//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, repositories, the session rules,
//! and the prover so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use game_core::{ClaimError, ExecuteError, ReplayError};

pub use crate::repository::RepositoryError;
pub use crate::restore::RestoreError;
pub use crate::workers::PersistenceError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("session worker command channel closed")]
    CommandChannelClosed,

    #[error("session worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("session worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("event log could not be restored")]
    Restore(#[from] RestoreError),

    #[error("event log persistence failed")]
    Persistence(#[from] PersistenceError),

    #[error("event log persistence stopped; session is read-only")]
    PersistenceStopped,

    #[error(transparent)]
    Execute(#[from] ExecuteError),

    #[error(transparent)]
    Claim(#[from] ClaimError),

    #[error(transparent)]
    Replay(#[from] ReplayError),

    #[error(transparent)]
    Proof(#[from] zk::ProofError),

    #[error("runtime has no proof verifier configured")]
    VerifierNotSet,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse scenario")]
    Scenario(#[from] ron::error::SpannedError),
}

impl RuntimeError {
    /// Session-rule rejection as opposed to an infrastructure failure.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Execute(_) | Self::Claim(_) | Self::Replay(_) | Self::Proof(_)
        )
    }
}
