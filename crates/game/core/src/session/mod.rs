//! Session lifecycle.
//!
//! A [`Session`] owns the slot roster (through its [`ActionLog`]), the
//! absolute tick its current iteration started at, the spawn counter, and the
//! reward pool. Joins, leaves, equips, and drinks are transitions driven by
//! [`crate::engine::SessionEngine`]; they only append to the log and never
//! compute yields.
//!
//! Every operation takes the current absolute tick explicitly; the session
//! keeps no notion of time of its own.

mod error;
mod transitions;

pub use error::SessionError;
pub use transitions::{
    DrinkAction, EquipAction, JoinAction, LeaveAction, SessionTransition, TransitionContext,
};

use sha2::{Digest, Sha256};

use crate::action::{ActionLog, SlotUpdated};
use crate::config::{GameVariant, SessionConfig, TileData};
use crate::engine::{ExecuteError, SessionCommand, SessionEngine};
use crate::env::SeekerOracle;
use crate::replay::{ReplayError, session_yields};
use crate::state::{BonusId, SeekerId, Slot, SlotConfig, SlotId, Tick};

/// Lifecycle phase of a session at a given absolute tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum SessionPhase {
    /// Spawned and within `[0, num_ticks]`; every action is accepted.
    Active,
    /// Past the end with every spawn used; nothing but leaves and claims.
    Ended,
    /// Past the end, inside the regen window; joins are rejected.
    Regen,
    /// Never spawned, or regen elapsed; the next join starts an iteration.
    Respawnable,
}

/// One combat session at a fixed location.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Session {
    config: SessionConfig,
    log: ActionLog,
    /// Absolute tick the current iteration started at; `None` before the
    /// first spawn.
    start: Option<u64>,
    reward_supply: u64,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let log = ActionLog::new(config.slot_count());
        let reward_supply = config.reward_supply;
        Self {
            config,
            log,
            start: None,
            reward_supply,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn log(&self) -> &ActionLog {
        &self.log
    }

    pub fn slots(&self) -> &[Slot] {
        self.log.slots()
    }

    pub fn slot(&self, slot: SlotId) -> Option<&Slot> {
        self.log.slot(slot)
    }

    pub fn tile_data(&self) -> &TileData {
        &self.config.tile
    }

    /// Number of spawns so far; 0 before the first join.
    pub fn iteration(&self) -> u32 {
        self.log.iteration()
    }

    pub fn reward_supply(&self) -> u64 {
        self.reward_supply
    }

    /// Absolute tick the current iteration started at.
    pub fn start(&self) -> Option<u64> {
        self.start
    }

    /// Session-relative tick for an absolute tick.
    pub fn current_tick(&self, now: u64) -> Tick {
        Tick(self.start.map_or(0, |start| now.saturating_sub(start)))
    }

    /// Absolute tick the current iteration stops being active after.
    pub fn ends_at(&self) -> Option<u64> {
        self.start
            .map(|start| start.saturating_add(self.config.num_ticks))
    }

    /// Lifecycle phase at absolute tick `now`.
    pub fn phase(&self, now: u64) -> SessionPhase {
        let Some(ends_at) = self.ends_at() else {
            return SessionPhase::Respawnable;
        };
        if now <= ends_at {
            return SessionPhase::Active;
        }
        if self.spawns_exhausted() {
            return SessionPhase::Ended;
        }
        if now - ends_at <= self.config.tile.regen_duration {
            SessionPhase::Regen
        } else {
            SessionPhase::Respawnable
        }
    }

    /// First absolute tick a join may start a new iteration at.
    pub fn respawn_at(&self) -> Option<u64> {
        self.ends_at()
            .map(|ends_at| ends_at.saturating_add(self.config.tile.regen_duration) + 1)
    }

    fn spawns_exhausted(&self) -> bool {
        let max_spawn = self.config.tile.max_spawn;
        max_spawn > 0 && self.iteration() >= max_spawn
    }

    /// Yields of every slot at `tick` (clamped to the session length),
    /// replayed from the supplied `configs[slot]` logs.
    pub fn slot_yields(
        &self,
        tick: Tick,
        configs: &[Vec<SlotConfig>],
    ) -> Result<Vec<u64>, ReplayError> {
        session_yields(&self.config, configs, self.clamp_tick(tick))
    }

    /// `tick` capped at the session length.
    pub fn clamp_tick(&self, tick: Tick) -> Tick {
        tick.min(Tick(self.config.num_ticks))
    }

    /// Domain tag opening the [`Self::params_digest`] preimage.
    pub const PARAMS_DOMAIN: &'static [u8] = b"seeker-session-params";

    /// Digest binding the parameters a replay depends on.
    ///
    /// ```text
    /// sha256(PARAMS_DOMAIN || num_ticks u64 || slots u64 || iteration u32 || variant)
    /// ```
    ///
    /// `variant` is a single zero byte for harvest sessions.
    ///
    /// Proofs are checked against this digest so a proof produced for a
    /// different dungeon, session length, or iteration is rejected.
    pub fn params_digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(Self::PARAMS_DOMAIN);
        hasher.update(self.config.num_ticks.to_le_bytes());
        hasher.update((self.log.slot_count() as u64).to_le_bytes());
        hasher.update(self.iteration().to_le_bytes());
        match &self.config.variant {
            GameVariant::Harvest => hasher.update([0u8]),
            GameVariant::Dungeon(spec) => {
                hasher.update([1u8]);
                hasher.update(spec.armour.to_le_bytes());
                hasher.update(spec.health.to_le_bytes());
                for table in [&spec.attack_armour, &spec.attack_health] {
                    hasher.update((table.len() as u64).to_le_bytes());
                    for rate in table.iter() {
                        hasher.update(rate.to_le_bytes());
                    }
                }
                hasher.update(spec.defeat_reward.to_le_bytes());
            }
        }
        hasher.finalize().into()
    }

    // ===== transitions =====

    pub fn join(
        &mut self,
        now: u64,
        seeker: SeekerId,
        slot: SlotId,
        seekers: &dyn SeekerOracle,
    ) -> Result<SlotUpdated, ExecuteError> {
        self.execute(now, seekers, SessionCommand::Join(JoinAction { seeker, slot }))
    }

    pub fn leave(
        &mut self,
        now: u64,
        seeker: SeekerId,
        slot: SlotId,
        seekers: &dyn SeekerOracle,
    ) -> Result<SlotUpdated, ExecuteError> {
        self.execute(now, seekers, SessionCommand::Leave(LeaveAction { seeker, slot }))
    }

    pub fn equip(
        &mut self,
        now: u64,
        seeker: SeekerId,
        slot: SlotId,
        bonus: BonusId,
        seekers: &dyn SeekerOracle,
    ) -> Result<SlotUpdated, ExecuteError> {
        self.execute(
            now,
            seekers,
            SessionCommand::Equip(EquipAction {
                seeker,
                slot,
                bonus,
            }),
        )
    }

    pub fn drink(
        &mut self,
        now: u64,
        seeker: SeekerId,
        slot: SlotId,
        bonus: BonusId,
        seekers: &dyn SeekerOracle,
    ) -> Result<SlotUpdated, ExecuteError> {
        self.execute(
            now,
            seekers,
            SessionCommand::Drink(DrinkAction {
                seeker,
                slot,
                bonus,
            }),
        )
    }

    /// Runs any command through the transition pipeline.
    pub fn execute(
        &mut self,
        now: u64,
        seekers: &dyn SeekerOracle,
        command: SessionCommand,
    ) -> Result<SlotUpdated, ExecuteError> {
        let ctx = TransitionContext::new(now, seekers);
        SessionEngine::new(self).execute(&ctx, &command)
    }

    // ===== state mutation, reachable only through transitions and claims =====

    pub(crate) fn log_mut(&mut self) -> &mut ActionLog {
        &mut self.log
    }

    /// Starts the next iteration at `now`: bumps the spawn counter, wipes
    /// every slot, and decays the reward pool on respawns.
    pub(crate) fn spawn(&mut self, now: u64) {
        let previous = self.iteration();
        if previous > 0 {
            self.reward_supply = self.config.tile.decay(self.reward_supply);
        }
        self.start = Some(now);
        self.log.begin_iteration(previous + 1);
        tracing::info!(
            iteration = previous + 1,
            start = now,
            reward_supply = self.reward_supply,
            "session spawned"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionError, InvalidActionReason};
    use crate::state::SlotAction;
    use crate::testing::Roster;

    fn session(max_spawn: u32) -> Session {
        let tile = TileData {
            max_spawn,
            regen_duration: 5,
            respawn_supply_decay_perc: 10,
            ..TileData::default()
        };
        Session::new(SessionConfig::harvest(10, 3).with_tile(tile))
    }

    fn invalid(slot: u16, reason: InvalidActionReason) -> SessionError {
        SessionError::Action(ActionError::invalid(SlotId(slot), reason))
    }

    #[test]
    fn fresh_session_is_respawnable() {
        let session = session(0);
        assert_eq!(session.iteration(), 0);
        assert_eq!(session.phase(0), SessionPhase::Respawnable);
        assert_eq!(session.phase(u64::MAX), SessionPhase::Respawnable);
    }

    #[test]
    fn phases_follow_elapsed_ticks() {
        let roster = Roster::standard();
        let mut session = session(0);
        session.join(100, SeekerId(1), SlotId(0), &roster).unwrap();

        assert_eq!(session.phase(100), SessionPhase::Active);
        assert_eq!(session.phase(110), SessionPhase::Active);
        assert_eq!(session.phase(111), SessionPhase::Regen);
        assert_eq!(session.phase(115), SessionPhase::Regen);
        assert_eq!(session.phase(116), SessionPhase::Respawnable);
        assert_eq!(session.respawn_at(), Some(116));
    }

    #[test]
    fn same_tick_joins_share_the_tick() {
        let roster = Roster::standard();
        let mut session = session(0);
        let first = session.join(1_000, SeekerId(1), SlotId(0), &roster).unwrap();
        let second = session.join(1_000, SeekerId(2), SlotId(1), &roster).unwrap();

        assert_eq!(first.config.tick, Tick(0));
        assert_eq!(second.config.tick, first.config.tick);
        assert_eq!(session.iteration(), 1);
        assert_eq!(session.start(), Some(1_000));
    }

    #[test]
    fn spawn_limit_ends_the_session() {
        let roster = Roster::standard();
        let mut session = session(3);

        for now in [0, 16, 32] {
            session.join(now, SeekerId(1), SlotId(0), &roster).unwrap();
        }
        assert_eq!(session.iteration(), 3);
        assert_eq!(session.phase(48), SessionPhase::Ended);

        let before = session.clone();
        let err = session
            .join(48, SeekerId(2), SlotId(1), &roster)
            .unwrap_err();
        assert_eq!(
            err.session_error(),
            &SessionError::SessionEnded { iteration: 3 }
        );
        assert!(err.session_error().is_session_ended());
        assert_eq!(session, before);
    }

    #[test]
    fn join_during_regen_is_rejected() {
        let roster = Roster::standard();
        let mut session = session(0);
        session.join(0, SeekerId(1), SlotId(0), &roster).unwrap();

        let err = session.join(12, SeekerId(2), SlotId(1), &roster).unwrap_err();
        assert_eq!(
            err.session_error(),
            &SessionError::RegenPending { ready_at: 16 }
        );
        assert!(err.session_error().is_session_ended());
    }

    #[test]
    fn respawn_wipes_slots_and_decays_supply() {
        let roster = Roster::standard();
        let mut session = session(0);
        session.join(0, SeekerId(1), SlotId(0), &roster).unwrap();
        session.join(2, SeekerId(2), SlotId(1), &roster).unwrap();
        session.leave(5, SeekerId(1), SlotId(0), &roster).unwrap();
        assert_eq!(session.reward_supply(), 1_000);

        // seeker 2 never left, but the new iteration starts from an empty roster
        let record = session.join(20, SeekerId(1), SlotId(0), &roster).unwrap();
        assert_eq!(record.iteration, 2);
        assert_eq!(session.reward_supply(), 900);
        assert_eq!(session.slot(SlotId(0)).unwrap().configs.len(), 1);
        assert!(session.slot(SlotId(0)).unwrap().configs[0].action.is_enter());
        assert!(!session.slot(SlotId(1)).unwrap().is_occupied());
        assert_eq!(session.current_tick(20), Tick(0));
    }

    #[test]
    fn leave_requires_the_occupant() {
        let roster = Roster::standard();
        let mut session = session(0);
        session.join(0, SeekerId(1), SlotId(0), &roster).unwrap();

        let err = session.leave(3, SeekerId(2), SlotId(0), &roster).unwrap_err();
        assert_eq!(
            err.into_session_error(),
            invalid(0, InvalidActionReason::SeekerMismatch)
        );
        let err = session.leave(3, SeekerId(2), SlotId(1), &roster).unwrap_err();
        assert_eq!(
            err.into_session_error(),
            invalid(1, InvalidActionReason::SlotEmpty)
        );

        let record = session.leave(3, SeekerId(1), SlotId(0), &roster).unwrap();
        assert_eq!(record.config, SlotConfig::leave(Tick(3)));
        assert!(!session.slot(SlotId(0)).unwrap().is_occupied());
    }

    #[test]
    fn seeker_cannot_hold_two_slots() {
        let roster = Roster::standard();
        let mut session = session(0);
        session.join(0, SeekerId(1), SlotId(0), &roster).unwrap();
        let err = session.join(1, SeekerId(1), SlotId(1), &roster).unwrap_err();
        assert_eq!(
            err.into_session_error(),
            invalid(1, InvalidActionReason::SeekerAlreadySeated)
        );
    }

    #[test]
    fn equip_adds_mod_to_base_rates_once() {
        let roster = Roster::standard();
        let mut session = session(0);
        session.join(0, SeekerId(1), SlotId(0), &roster).unwrap();

        let record = session
            .equip(4, SeekerId(1), SlotId(0), BonusId(1), &roster)
            .unwrap();
        match record.config.action {
            SlotAction::Equip { rates, .. } => assert_eq!(rates.harvest, 7),
            other => panic!("unexpected action {other:?}"),
        }

        let err = session
            .equip(5, SeekerId(1), SlotId(0), BonusId(1), &roster)
            .unwrap_err();
        assert_eq!(
            err.into_session_error(),
            invalid(0, InvalidActionReason::AlreadyEquipped)
        );

        // a different mod stacks on the equipped rates
        let record = session
            .equip(6, SeekerId(1), SlotId(0), BonusId(2), &roster)
            .unwrap();
        match record.config.action {
            SlotAction::Equip { rates, .. } => {
                assert_eq!(rates.harvest, 7);
                assert_eq!(rates.attack_armour, 12);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn equip_and_drink_need_an_active_session() {
        let roster = Roster::standard();
        let mut session = session(0);
        session.join(0, SeekerId(1), SlotId(0), &roster).unwrap();

        let err = session
            .equip(11, SeekerId(1), SlotId(0), BonusId(1), &roster)
            .unwrap_err();
        assert_eq!(
            err.into_session_error(),
            invalid(0, InvalidActionReason::SessionNotActive)
        );
        let err = session
            .drink(11, SeekerId(1), SlotId(0), BonusId(1), &roster)
            .unwrap_err();
        assert_eq!(
            err.into_session_error(),
            invalid(0, InvalidActionReason::SessionNotActive)
        );

        // leaving after the end is still allowed
        session.leave(12, SeekerId(1), SlotId(0), &roster).unwrap();
    }

    #[test]
    fn unknown_ids_are_rejected_without_changes() {
        let roster = Roster::standard();
        let mut session = session(0);
        let err = session.join(0, SeekerId(99), SlotId(0), &roster).unwrap_err();
        assert_eq!(err.session_error(), &SessionError::UnknownSeeker(SeekerId(99)));
        assert_eq!(session.iteration(), 0);

        session.join(0, SeekerId(1), SlotId(0), &roster).unwrap();
        let before = session.clone();
        let err = session
            .drink(1, SeekerId(1), SlotId(0), BonusId(42), &roster)
            .unwrap_err();
        assert_eq!(err.session_error(), &SessionError::UnknownBonus(BonusId(42)));
        assert_eq!(err.phase(), crate::engine::TransitionPhase::PreValidate);
        assert_eq!(session, before);
    }

    #[test]
    fn rejected_respawn_join_keeps_the_finished_iteration() {
        let roster = Roster::standard();
        let mut session = session(0);
        session.join(0, SeekerId(1), SlotId(0), &roster).unwrap();
        let supply = session.reward_supply();
        let before = session.clone();

        // past regen, so the next join would spawn iteration 2
        let err = session.join(20, SeekerId(99), SlotId(1), &roster).unwrap_err();
        assert_eq!(err.phase(), crate::engine::TransitionPhase::PreValidate);
        assert_eq!(session, before);

        // apply resolves the seeker before spawning
        let ctx = TransitionContext::new(20, &roster);
        let join = JoinAction {
            seeker: SeekerId(99),
            slot: SlotId(1),
        };
        assert_eq!(
            join.apply(&mut session, &ctx).unwrap_err(),
            SessionError::UnknownSeeker(SeekerId(99))
        );
        assert_eq!(session.iteration(), 1);
        assert_eq!(session.reward_supply(), supply);
        assert_eq!(session, before);
    }

    #[test]
    fn params_digest_tracks_iteration() {
        let roster = Roster::standard();
        let mut session = session(0);
        session.join(0, SeekerId(1), SlotId(0), &roster).unwrap();
        let first = session.params_digest();
        session.join(20, SeekerId(1), SlotId(0), &roster).unwrap();
        assert_ne!(session.params_digest(), first);
    }
}
