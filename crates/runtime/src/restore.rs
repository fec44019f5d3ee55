//! Session recovery from a persisted event log.
//!
//! The log holds only outcomes, so recovery re-runs every accepted update and
//! claim through the session's own rules at the tick it was recorded at:
//!
//! 1. `SlotUpdated` is turned back into the command that produced it and
//!    executed at `at`; the resulting commitment must match the recorded one.
//! 2. `Paid` is re-claimed by direct replay of the restored logs; the
//!    resulting `claimed` total must match the recorded one.
//!
//! Rejections and spawns carry no state of their own. A log written under a
//! different session config or seeker registry fails to reproduce and is
//! reported instead of being silently diverged from.

use game_core::{
    Claim, ClaimError, Commitment, DirectReplay, DrinkAction, EquipAction, ExecuteError,
    JoinAction, LeaveAction, SeekerOracle, Session, SessionCommand, SessionConfig, SlotAction,
    SlotId, SlotUpdated,
};
use thiserror::Error;

use crate::events::{ClaimEvent, Event, SessionEvent};

/// Errors raised while rebuilding a session from its event log.
///
/// `event` is the position of the offending event in the log.
#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("event {event}: slot {slot} has no occupant to {action}")]
    VacantSlot {
        event: usize,
        slot: SlotId,
        action: &'static str,
    },

    #[error("event {event}: persisted update no longer applies")]
    Rejected {
        event: usize,
        #[source]
        source: ExecuteError,
    },

    #[error(
        "event {event}: slot {slot} replayed to {replayed} in iteration {replayed_iteration}, \
         log recorded {recorded} in iteration {recorded_iteration}"
    )]
    Diverged {
        event: usize,
        slot: SlotId,
        recorded: Commitment,
        replayed: Commitment,
        recorded_iteration: u32,
        replayed_iteration: u32,
    },

    #[error("event {event}: persisted claim no longer verifies")]
    Claim {
        event: usize,
        #[source]
        source: ClaimError,
    },

    #[error("event {event}: slot {slot} claimed {replayed}, log recorded {recorded}")]
    ClaimDiverged {
        event: usize,
        slot: SlotId,
        recorded: u64,
        replayed: u64,
    },
}

/// Session rebuilt from a log, plus the latest tick the log reached.
#[derive(Debug)]
pub struct RestoredSession {
    pub session: Session,
    /// Absolute tick of the last replayed event; commands must not run
    /// earlier than this.
    pub resume_at: Option<u64>,
    /// Events that changed the session.
    pub applied: usize,
}

/// Rebuilds the session `events` were recorded from.
///
/// # Errors
///
/// [`RestoreError`] at the first event the rebuilt session cannot reproduce.
pub fn restore_session(
    config: SessionConfig,
    seekers: &dyn SeekerOracle,
    events: &[Event],
) -> Result<RestoredSession, RestoreError> {
    let mut restored = RestoredSession {
        session: Session::new(config),
        resume_at: None,
        applied: 0,
    };

    for (position, event) in events.iter().enumerate() {
        let at = event_tick(event);
        restored.resume_at = Some(restored.resume_at.map_or(at, |last| last.max(at)));
        match event {
            Event::Session(SessionEvent::SlotUpdated { update, at }) => {
                restore_update(&mut restored.session, seekers, position, update, *at)?;
            }
            Event::Claim(ClaimEvent::Paid {
                payout, tick, at, ..
            }) => {
                let session = &mut restored.session;
                let configs = session.log().configs();
                let yields = session
                    .slot_yields(*tick, &configs)
                    .map_err(|error| RestoreError::Claim {
                        event: position,
                        source: error.into(),
                    })?;
                let claim = Claim::new(payout.slot, *tick, yields);
                let replayed = session
                    .claim_reward(*at, &claim, &DirectReplay::new(&configs))
                    .map_err(|source| RestoreError::Claim {
                        event: position,
                        source,
                    })?;
                if replayed.claimed != payout.claimed {
                    return Err(RestoreError::ClaimDiverged {
                        event: position,
                        slot: payout.slot,
                        recorded: payout.claimed,
                        replayed: replayed.claimed,
                    });
                }
            }
            Event::Session(SessionEvent::Spawned { .. } | SessionEvent::CommandRejected { .. })
            | Event::Claim(ClaimEvent::Rejected { .. }) => continue,
        }
        restored.applied += 1;
    }

    if restored.applied > 0 {
        tracing::info!(
            iteration = restored.session.iteration(),
            applied = restored.applied,
            resume_at = restored.resume_at,
            "session restored from event log"
        );
    }
    Ok(restored)
}

fn restore_update(
    session: &mut Session,
    seekers: &dyn SeekerOracle,
    position: usize,
    update: &SlotUpdated,
    at: u64,
) -> Result<(), RestoreError> {
    let slot = update.slot;
    let occupant = |action: &'static str| {
        session
            .slot(slot)
            .and_then(|current| current.seeker)
            .ok_or(RestoreError::VacantSlot {
                event: position,
                slot,
                action,
            })
    };

    let command = match update.config.action {
        SlotAction::Enter { seeker, .. } => SessionCommand::Join(JoinAction { seeker, slot }),
        SlotAction::Leave => SessionCommand::Leave(LeaveAction {
            seeker: occupant("leave")?,
            slot,
        }),
        SlotAction::Equip { bonus, .. } => SessionCommand::Equip(EquipAction {
            seeker: occupant("equip")?,
            slot,
            bonus,
        }),
        SlotAction::Drink { bonus, .. } => SessionCommand::Drink(DrinkAction {
            seeker: occupant("drink")?,
            slot,
            bonus,
        }),
    };

    let replayed = session
        .execute(at, seekers, command)
        .map_err(|source| RestoreError::Rejected {
            event: position,
            source,
        })?;
    if replayed.commitment != update.commitment || replayed.iteration != update.iteration {
        return Err(RestoreError::Diverged {
            event: position,
            slot,
            recorded: update.commitment,
            replayed: replayed.commitment,
            recorded_iteration: update.iteration,
            replayed_iteration: replayed.iteration,
        });
    }
    Ok(())
}

fn event_tick(event: &Event) -> u64 {
    match event {
        Event::Session(SessionEvent::SlotUpdated { at, .. })
        | Event::Session(SessionEvent::CommandRejected { at, .. })
        | Event::Claim(ClaimEvent::Paid { at, .. })
        | Event::Claim(ClaimEvent::Rejected { at, .. }) => *at,
        Event::Session(SessionEvent::Spawned { start, .. }) => *start,
    }
}
