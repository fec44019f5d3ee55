use crate::action::ActionError;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{BonusId, SeekerId};

/// Errors raised by session lifecycle transitions.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SessionError {
    /// Every allowed spawn has been used.
    #[error("session ended after {iteration} spawns")]
    SessionEnded { iteration: u32 },

    /// Session ended and is still inside its regen window.
    #[error("session regenerating until absolute tick {ready_at}")]
    RegenPending { ready_at: u64 },

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("unknown {0}")]
    UnknownSeeker(SeekerId),

    #[error("unknown {0}")]
    UnknownBonus(BonusId),
}

impl SessionError {
    /// True for both flavours of "no joins accepted right now".
    pub fn is_session_ended(&self) -> bool {
        matches!(self, Self::SessionEnded { .. } | Self::RegenPending { .. })
    }
}

impl GameError for SessionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::SessionEnded { .. } => ErrorSeverity::Validation,
            Self::RegenPending { .. } => ErrorSeverity::Recoverable,
            Self::Action(error) => error.severity(),
            Self::UnknownSeeker(_) | Self::UnknownBonus(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::SessionEnded { .. } => "SESSION_ENDED",
            Self::RegenPending { .. } => "SESSION_REGEN_PENDING",
            Self::Action(error) => error.error_code(),
            Self::UnknownSeeker(_) => "SESSION_UNKNOWN_SEEKER",
            Self::UnknownBonus(_) => "SESSION_UNKNOWN_BONUS",
        }
    }
}
