//! Command execution pipeline.
//!
//! The [`SessionEngine`] is the only writer of a [`Session`]'s roster. Every
//! command runs the same three phases (pre_validate → apply → post_validate).
//! Pre-validation inspects the session without mutating it and catches every
//! failure `apply` could hit, so a rejected command leaves the session
//! untouched without snapshotting it.

mod command;
mod errors;

pub use command::SessionCommand;
pub use errors::{ExecuteError, TransitionPhase, TransitionPhaseError};

use crate::action::SlotUpdated;
use crate::session::{Session, SessionTransition, TransitionContext};

type TransitionResult<E> = Result<SlotUpdated, TransitionPhaseError<E>>;

macro_rules! dispatch_transition {
    ($command:expr, $session:expr, $ctx:expr, { $($variant:ident),+ $(,)? }) => {{
        match $command {
            $(
                SessionCommand::$variant(transition) => {
                    drive_transition(transition, $session, $ctx).map_err(ExecuteError::$variant)
                }
            )+
        }
    }};
}

/// Session engine that validates and applies commands atomically.
pub struct SessionEngine<'a> {
    session: &'a mut Session,
}

impl<'a> SessionEngine<'a> {
    pub fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    /// Executes a command, returning the record of the config it appended.
    pub fn execute(
        &mut self,
        ctx: &TransitionContext<'_>,
        command: &SessionCommand,
    ) -> Result<SlotUpdated, ExecuteError> {
        let result = dispatch_transition!(command, self.session, ctx, {
            Join,
            Leave,
            Equip,
            Drink,
        });

        match &result {
            Ok(record) => tracing::debug!(
                command = command.as_str(),
                slot = %record.slot,
                tick = %record.config.tick,
                "command applied"
            ),
            Err(error) => {
                debug_assert_eq!(
                    error.phase(),
                    TransitionPhase::PreValidate,
                    "apply failed after pre-validation passed"
                );
                tracing::warn!(
                    command = command.as_str(),
                    seeker = %command.seeker(),
                    slot = %command.slot(),
                    %error,
                    "command rejected"
                );
            }
        }
        result
    }
}

#[inline]
fn drive_transition<T>(
    transition: &T,
    session: &mut Session,
    ctx: &TransitionContext<'_>,
) -> TransitionResult<T::Error>
where
    T: SessionTransition,
{
    transition
        .pre_validate(session, ctx)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::PreValidate, error))?;

    let record = transition
        .apply(session, ctx)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::Apply, error))?;

    transition
        .post_validate(session, ctx)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::PostValidate, error))?;

    Ok(record)
}
