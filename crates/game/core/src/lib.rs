//! Deterministic seeker/dungeon session rules shared across clients.
//!
//! `game-core` defines the canonical rules (action log, yield replay, session
//! lifecycle, claim verification) and exposes pure APIs that can be reused by
//! the runtime, the prover, and offline tools alike. All roster mutation
//! flows through [`engine::SessionEngine`]; claims are checked by
//! [`Session::claim_reward`] against a [`claim::YieldWitness`].
pub mod action;
pub mod claim;
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod replay;
pub mod session;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use action::{
    ActionError, ActionLog, Commitment, ENCODED_CONFIG_LEN, InvalidActionReason, SlotUpdated,
    encode_config,
};
pub use claim::{
    Claim, ClaimError, ClaimStatement, DirectReplay, MismatchReason, Payout, ProofCarrying,
    YieldWitness,
};
pub use combat::{GatedPool, apply_ticks, ticks_until_depleted};
pub use config::{GameVariant, SessionConfig, TileData};
pub use engine::{ExecuteError, SessionCommand, SessionEngine, TransitionPhase, TransitionPhaseError};
pub use env::{ProofOracle, SeekerOracle};
pub use error::{ErrorSeverity, GameError};
pub use replay::{
    MalformedReason, Occupancy, ReplayError, SessionReplay, replay_session, replay_slot,
    session_yields,
    validate_configs,
};
pub use session::{
    DrinkAction, EquipAction, JoinAction, LeaveAction, Session, SessionError, SessionPhase,
    SessionTransition, TransitionContext,
};
pub use state::{
    Bonus, BonusId, BonusKind, DungeonSpec, DungeonState, SeekerId, SeekerProfile, SeekerRates,
    Slot, SlotAction, SlotConfig, SlotId, SlotRates, Tick, Vitals,
};
