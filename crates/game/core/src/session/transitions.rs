//! Join, leave, equip, and drink as three-phase transitions.
//!
//! `pre_validate` inspects the session before anything changes and must
//! catch every failure `apply` could hit, so a rejected command never leaves
//! a partial update behind.

use super::{Session, SessionError, SessionPhase};
use crate::action::{ActionError, InvalidActionReason, SlotUpdated};
use crate::env::SeekerOracle;
use crate::state::{BonusId, SeekerId, SeekerRates, SlotConfig, SlotId, Tick};

/// Inputs every transition sees besides the session itself.
#[derive(Clone, Copy)]
pub struct TransitionContext<'a> {
    /// Current absolute tick.
    pub now: u64,
    pub seekers: &'a dyn SeekerOracle,
}

impl<'a> TransitionContext<'a> {
    pub fn new(now: u64, seekers: &'a dyn SeekerOracle) -> Self {
        Self { now, seekers }
    }
}

impl std::fmt::Debug for TransitionContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionContext")
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

pub trait SessionTransition {
    type Error;

    /// Validates pre-conditions using the session **before** mutation.
    fn pre_validate(&self, _session: &Session, _ctx: &TransitionContext<'_>) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Applies the transition. Implementations may assume `pre_validate`
    /// has already succeeded.
    fn apply(
        &self,
        session: &mut Session,
        ctx: &TransitionContext<'_>,
    ) -> Result<SlotUpdated, Self::Error>;

    /// Validates post-conditions using the session **after** mutation.
    fn post_validate(&self, _session: &Session, _ctx: &TransitionContext<'_>) -> Result<(), Self::Error> {
        Ok(())
    }
}

fn invalid(slot: SlotId, reason: InvalidActionReason) -> SessionError {
    SessionError::Action(ActionError::invalid(slot, reason))
}

/// Checks the slot exists and is held by `seeker`.
fn require_occupant(session: &Session, slot: SlotId, seeker: SeekerId) -> Result<(), SessionError> {
    let current = session
        .slot(slot)
        .ok_or_else(|| invalid(slot, InvalidActionReason::SlotOutOfRange))?;
    match current.seeker {
        None => Err(invalid(slot, InvalidActionReason::SlotEmpty)),
        Some(occupant) if occupant != seeker => {
            Err(invalid(slot, InvalidActionReason::SeekerMismatch))
        }
        Some(_) => Ok(()),
    }
}

fn require_active(session: &Session, slot: SlotId, now: u64) -> Result<(), SessionError> {
    if session.phase(now) == SessionPhase::Active {
        Ok(())
    } else {
        Err(invalid(slot, InvalidActionReason::SessionNotActive))
    }
}

// ============================================================================
// Join
// ============================================================================

/// Seeker enters a vacant slot, spawning a new iteration if the session is
/// respawnable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JoinAction {
    pub seeker: SeekerId,
    pub slot: SlotId,
}

impl JoinAction {
    fn config(&self, tick: Tick, ctx: &TransitionContext<'_>) -> Result<SlotConfig, SessionError> {
        let profile = ctx
            .seekers
            .seeker(self.seeker)
            .ok_or(SessionError::UnknownSeeker(self.seeker))?;
        Ok(SlotConfig::enter(
            tick,
            self.seeker,
            profile.vitals,
            profile.rates,
        ))
    }
}

impl SessionTransition for JoinAction {
    type Error = SessionError;

    fn pre_validate(&self, session: &Session, ctx: &TransitionContext<'_>) -> Result<(), Self::Error> {
        match session.phase(ctx.now) {
            SessionPhase::Ended => {
                return Err(SessionError::SessionEnded {
                    iteration: session.iteration(),
                });
            }
            SessionPhase::Regen => {
                return Err(SessionError::RegenPending {
                    ready_at: session.respawn_at().unwrap_or(ctx.now),
                });
            }
            SessionPhase::Respawnable => {
                let max_spawn = session.tile_data().max_spawn;
                if max_spawn > 0 && session.iteration() >= max_spawn {
                    return Err(SessionError::SessionEnded {
                        iteration: session.iteration(),
                    });
                }
                if self.slot.index() >= session.log().slot_count() {
                    return Err(invalid(self.slot, InvalidActionReason::SlotOutOfRange));
                }
                // the roster is wiped on spawn, so only the seeker must resolve
                self.config(Tick::ZERO, ctx)?;
                return Ok(());
            }
            SessionPhase::Active => {}
        }

        let seated = session
            .slots()
            .iter()
            .any(|slot| slot.seeker == Some(self.seeker));
        if seated {
            return Err(invalid(self.slot, InvalidActionReason::SeekerAlreadySeated));
        }
        let config = self.config(session.current_tick(ctx.now), ctx)?;
        session.log().check(self.slot, &config)?;
        Ok(())
    }

    fn apply(
        &self,
        session: &mut Session,
        ctx: &TransitionContext<'_>,
    ) -> Result<SlotUpdated, Self::Error> {
        let respawn = session.phase(ctx.now) == SessionPhase::Respawnable;
        // a fresh iteration starts at tick zero
        let tick = if respawn {
            Tick::ZERO
        } else {
            session.current_tick(ctx.now)
        };
        let config = self.config(tick, ctx)?;
        if respawn {
            session.spawn(ctx.now);
        }
        Ok(session.log_mut().append(self.slot, config)?)
    }

    fn post_validate(&self, session: &Session, _ctx: &TransitionContext<'_>) -> Result<(), Self::Error> {
        require_occupant(session, self.slot, self.seeker)
    }
}

// ============================================================================
// Leave
// ============================================================================

/// Seeker leaves its slot; history stays for replay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LeaveAction {
    pub seeker: SeekerId,
    pub slot: SlotId,
}

impl SessionTransition for LeaveAction {
    type Error = SessionError;

    fn pre_validate(&self, session: &Session, ctx: &TransitionContext<'_>) -> Result<(), Self::Error> {
        require_occupant(session, self.slot, self.seeker)?;
        let config = SlotConfig::leave(session.current_tick(ctx.now));
        session.log().check(self.slot, &config)?;
        Ok(())
    }

    fn apply(
        &self,
        session: &mut Session,
        ctx: &TransitionContext<'_>,
    ) -> Result<SlotUpdated, Self::Error> {
        let config = SlotConfig::leave(session.current_tick(ctx.now));
        Ok(session.log_mut().append(self.slot, config)?)
    }
}

// ============================================================================
// Equip / Drink
// ============================================================================

/// Seeker equips a mod; the mod's rates add to the current base rates from
/// this tick on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EquipAction {
    pub seeker: SeekerId,
    pub slot: SlotId,
    pub bonus: BonusId,
}

impl EquipAction {
    fn config(&self, session: &Session, ctx: &TransitionContext<'_>) -> Result<SlotConfig, SessionError> {
        let bonus = ctx
            .seekers
            .bonus(self.bonus)
            .ok_or(SessionError::UnknownBonus(self.bonus))?;
        let base = session
            .slot(self.slot)
            .and_then(|slot| slot.base_rates())
            .unwrap_or(SeekerRates::ZERO);
        Ok(SlotConfig::equip(
            session.current_tick(ctx.now),
            self.bonus,
            base.combined(&bonus.as_rates()),
        ))
    }
}

impl SessionTransition for EquipAction {
    type Error = SessionError;

    fn pre_validate(&self, session: &Session, ctx: &TransitionContext<'_>) -> Result<(), Self::Error> {
        require_occupant(session, self.slot, self.seeker)?;
        require_active(session, self.slot, ctx.now)?;
        let config = self.config(session, ctx)?;
        session.log().check(self.slot, &config)?;
        Ok(())
    }

    fn apply(
        &self,
        session: &mut Session,
        ctx: &TransitionContext<'_>,
    ) -> Result<SlotUpdated, Self::Error> {
        let config = self.config(session, ctx)?;
        Ok(session.log_mut().append(self.slot, config)?)
    }
}

/// Seeker takes a consumable; its boost stacks until the seeker leaves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DrinkAction {
    pub seeker: SeekerId,
    pub slot: SlotId,
    pub bonus: BonusId,
}

impl DrinkAction {
    fn config(&self, session: &Session, ctx: &TransitionContext<'_>) -> Result<SlotConfig, SessionError> {
        let bonus = ctx
            .seekers
            .bonus(self.bonus)
            .ok_or(SessionError::UnknownBonus(self.bonus))?;
        Ok(SlotConfig::drink(
            session.current_tick(ctx.now),
            self.bonus,
            bonus.as_rates(),
        ))
    }
}

impl SessionTransition for DrinkAction {
    type Error = SessionError;

    fn pre_validate(&self, session: &Session, ctx: &TransitionContext<'_>) -> Result<(), Self::Error> {
        require_occupant(session, self.slot, self.seeker)?;
        require_active(session, self.slot, ctx.now)?;
        let config = self.config(session, ctx)?;
        session.log().check(self.slot, &config)?;
        Ok(())
    }

    fn apply(
        &self,
        session: &mut Session,
        ctx: &TransitionContext<'_>,
    ) -> Result<SlotUpdated, Self::Error> {
        let config = self.config(session, ctx)?;
        Ok(session.log_mut().append(self.slot, config)?)
    }
}
