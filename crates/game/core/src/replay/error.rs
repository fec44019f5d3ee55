use crate::error::{ErrorSeverity, GameError};
use crate::state::SlotId;

/// What makes a supplied config log unreplayable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum MalformedReason {
    /// Tick earlier than the previous config's tick.
    DecreasingTick,
    /// Log does not open with an Enter.
    FirstNotEnter,
    /// Enter while the slot is still occupied.
    EnterWhileOccupied,
    /// Leave, Equip, or Drink while the slot is vacant.
    ActionWhileVacant,
}

impl MalformedReason {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Errors raised while replaying a config log.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReplayError {
    #[error("{slot}: malformed config log at entry {index} ({})", reason.as_str())]
    Malformed {
        slot: SlotId,
        index: usize,
        reason: MalformedReason,
    },
}

impl ReplayError {
    pub fn malformed(slot: SlotId, index: usize, reason: MalformedReason) -> Self {
        Self::Malformed {
            slot,
            index,
            reason,
        }
    }
}

impl GameError for ReplayError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Malformed { .. } => "REPLAY_MALFORMED_LOG",
        }
    }
}
