//! Error types for the transition pipeline.

use crate::error::{ErrorSeverity, GameError};
use crate::session::SessionError;

/// Identifies which stage of the transition pipeline produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransitionPhase {
    PreValidate,
    Apply,
    PostValidate,
}

impl TransitionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionPhase::PreValidate => "pre_validate",
            TransitionPhase::Apply => "apply",
            TransitionPhase::PostValidate => "post_validate",
        }
    }
}

/// Associates a transition phase with the underlying error.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitionPhaseError<E> {
    pub phase: TransitionPhase,
    pub error: E,
}

impl<E> TransitionPhaseError<E> {
    pub fn new(phase: TransitionPhase, error: E) -> Self {
        Self { phase, error }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for TransitionPhaseError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.phase.as_str(), self.error)
    }
}

impl<E: std::fmt::Display + std::fmt::Debug> std::error::Error for TransitionPhaseError<E> {}

/// Errors surfaced while executing a command through the session engine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecuteError {
    #[error("join failed: {0}")]
    Join(TransitionPhaseError<SessionError>),

    #[error("leave failed: {0}")]
    Leave(TransitionPhaseError<SessionError>),

    #[error("equip failed: {0}")]
    Equip(TransitionPhaseError<SessionError>),

    #[error("drink failed: {0}")]
    Drink(TransitionPhaseError<SessionError>),
}

impl ExecuteError {
    fn inner(&self) -> &TransitionPhaseError<SessionError> {
        match self {
            Self::Join(inner) | Self::Leave(inner) | Self::Equip(inner) | Self::Drink(inner) => {
                inner
            }
        }
    }

    /// The session error, whichever command raised it.
    pub fn session_error(&self) -> &SessionError {
        &self.inner().error
    }

    pub fn phase(&self) -> TransitionPhase {
        self.inner().phase
    }

    pub fn into_session_error(self) -> SessionError {
        match self {
            Self::Join(inner) | Self::Leave(inner) | Self::Equip(inner) | Self::Drink(inner) => {
                inner.error
            }
        }
    }
}

impl GameError for ExecuteError {
    fn severity(&self) -> ErrorSeverity {
        match self.phase() {
            // a failed post-condition means apply produced an inconsistent roster
            TransitionPhase::PostValidate => ErrorSeverity::Internal,
            _ => self.session_error().severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        self.session_error().error_code()
    }
}
