//! Action log errors.
//!
//! Raised while appending a config to a slot. A rejected append leaves the
//! slot exactly as it was.

use crate::error::{ErrorSeverity, GameError};
use crate::state::{SlotId, Tick};

// ============================================================================
// Action Log Errors
// ============================================================================

/// Why an action cannot follow the slot's current occupancy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum InvalidActionReason {
    /// Enter on a slot that already has an occupant.
    SlotOccupied,
    /// Leave, Equip, or Drink on a vacant slot.
    SlotEmpty,
    /// Slot index beyond the session's roster.
    SlotOutOfRange,
    /// Caller is not the seeker occupying the slot.
    SeekerMismatch,
    /// Seeker already occupies another slot of the session.
    SeekerAlreadySeated,
    /// Mod already equipped during the current occupancy.
    AlreadyEquipped,
    /// Equip or Drink outside the active phase.
    SessionNotActive,
}

impl InvalidActionReason {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Errors raised by [`crate::action::ActionLog::append`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionError {
    /// Config tick is earlier than the last recorded tick of the slot.
    #[error("{slot}: config at tick {tick} precedes last recorded tick {last}")]
    OutOfOrder { slot: SlotId, last: Tick, tick: Tick },

    /// Action violates the Enter/Leave alternation or the slot's state.
    #[error("{slot}: invalid action ({})", reason.as_str())]
    InvalidAction {
        slot: SlotId,
        reason: InvalidActionReason,
    },
}

impl ActionError {
    pub fn invalid(slot: SlotId, reason: InvalidActionReason) -> Self {
        Self::InvalidAction { slot, reason }
    }

    pub fn slot(&self) -> SlotId {
        match self {
            Self::OutOfOrder { slot, .. } | Self::InvalidAction { slot, .. } => *slot,
        }
    }
}

impl GameError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::OutOfOrder { .. } => ErrorSeverity::Validation,
            Self::InvalidAction { reason, .. } => match reason {
                InvalidActionReason::SessionNotActive => ErrorSeverity::Recoverable,
                _ => ErrorSeverity::Validation,
            },
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::OutOfOrder { .. } => "LOG_OUT_OF_ORDER",
            Self::InvalidAction { reason, .. } => match reason {
                InvalidActionReason::SlotOccupied => "ACTION_SLOT_OCCUPIED",
                InvalidActionReason::SlotEmpty => "ACTION_SLOT_EMPTY",
                InvalidActionReason::SlotOutOfRange => "ACTION_SLOT_OUT_OF_RANGE",
                InvalidActionReason::SeekerMismatch => "ACTION_SEEKER_MISMATCH",
                InvalidActionReason::SeekerAlreadySeated => "ACTION_SEEKER_ALREADY_SEATED",
                InvalidActionReason::AlreadyEquipped => "ACTION_ALREADY_EQUIPPED",
                InvalidActionReason::SessionNotActive => "ACTION_SESSION_NOT_ACTIVE",
            },
        }
    }
}
