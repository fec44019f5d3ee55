//! Scripted sessions loaded from RON files.
//!
//! A scenario fixes the session parameters, the seeker roster, and a list of
//! steps stamped with absolute ticks. [`Scenario::run`] mines a
//! [`ManualClock`] up to each step, submits it through a [`SessionHandle`],
//! and claims from an index rebuilt off the public event stream, the way an
//! external client would.

use std::path::Path;

use game_core::{BonusId, Claim, SeekerId, SessionConfig, SlotId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::TryRecvError};
use zk::Prover;

use crate::api::{Result, RuntimeError, SessionHandle};
use crate::clock::ManualClock;
use crate::events::{Event, Topic};
use crate::indexer::SessionIndex;
use crate::oracle::SeekerRegistry;

/// Scenario configuration for a scripted session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub session: SessionConfig,
    pub registry: SeekerRegistry,
    pub steps: Vec<Step>,
}

/// One action at an absolute tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub at: u64,
    pub action: StepAction,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepAction {
    Join { seeker: SeekerId, slot: SlotId },
    Leave { seeker: SeekerId, slot: SlotId },
    Equip { seeker: SeekerId, slot: SlotId, bonus: BonusId },
    Drink { seeker: SeekerId, slot: SlotId, bonus: BonusId },
    /// Claim with the indexed config logs as witness.
    Claim { slot: SlotId },
    /// Prove the indexed logs off-chain, then claim with the proof.
    ProveAndClaim { slot: SlotId },
}

impl StepAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Leave { .. } => "leave",
            Self::Equip { .. } => "equip",
            Self::Drink { .. } => "drink",
            Self::Claim { .. } => "claim",
            Self::ProveAndClaim { .. } => "prove_and_claim",
        }
    }
}

/// Outcome of one step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub at: u64,
    pub action: &'static str,
    pub slot: SlotId,
    /// Amount paid out for claim steps.
    pub payout: Option<u64>,
    /// Rejection message; `None` when the step went through.
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SlotReport {
    pub slot: SlotId,
    pub seeker: Option<SeekerId>,
    pub claimed: u64,
    pub configs: usize,
    pub commitment: String,
}

/// Final state of a scenario run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub iteration: u32,
    pub phase: String,
    pub now: u64,
    /// Replayed yields of every slot at the final tick.
    pub yields: Vec<u64>,
    pub steps: Vec<StepOutcome>,
    pub slots: Vec<SlotReport>,
}

impl ScenarioReport {
    pub fn rejected(&self) -> usize {
        self.steps.iter().filter(|step| step.error.is_some()).count()
    }
}

impl Scenario {
    pub fn from_ron(source: &str) -> Result<Self> {
        Ok(ron::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            RuntimeError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_ron(&source)
    }

    /// Runs every step in tick order against `handle`.
    ///
    /// Rejected steps are recorded in the report; only runtime failures
    /// abort the run.
    pub async fn run(
        &self,
        handle: &SessionHandle,
        clock: &ManualClock,
        prover: &dyn Prover,
    ) -> Result<ScenarioReport> {
        let mut session_rx = handle.subscribe(Topic::Session);
        let mut claim_rx = handle.subscribe(Topic::Claim);
        let mut index = SessionIndex::new(self.session.slot_count());

        let mut steps = self.steps.clone();
        steps.sort_by_key(|step| step.at);

        let mut outcomes = Vec::with_capacity(steps.len());
        for step in steps {
            clock.advance_to(step.at);
            drain(&mut session_rx, &mut index);
            drain(&mut claim_rx, &mut index);

            let (slot, result) = self.apply(step.action, handle, &index, prover).await;
            let outcome = match result {
                Ok(payout) => StepOutcome {
                    at: step.at,
                    action: step.action.label(),
                    slot,
                    payout,
                    error: None,
                },
                Err(error) if error.is_rejection() => StepOutcome {
                    at: step.at,
                    action: step.action.label(),
                    slot,
                    payout: None,
                    error: Some(error.to_string()),
                },
                Err(error) => return Err(error),
            };
            tracing::info!(
                at = outcome.at,
                action = outcome.action,
                slot = %outcome.slot,
                error = outcome.error.as_deref().unwrap_or("-"),
                "scenario step"
            );
            outcomes.push(outcome);
        }

        drain(&mut session_rx, &mut index);
        drain(&mut claim_rx, &mut index);
        let snapshot = handle.snapshot().await?;
        let yields = snapshot.slot_yields(snapshot.current_tick(), &index.configs())?;

        Ok(ScenarioReport {
            name: self.name.clone(),
            iteration: snapshot.iteration(),
            phase: snapshot.phase().to_string(),
            now: snapshot.now,
            yields,
            steps: outcomes,
            slots: snapshot
                .slots()
                .iter()
                .enumerate()
                .map(|(index, slot)| SlotReport {
                    slot: SlotId(index as u16),
                    seeker: slot.seeker,
                    claimed: slot.claimed,
                    configs: slot.configs.len(),
                    commitment: slot.commitment.to_string(),
                })
                .collect(),
        })
    }

    async fn apply(
        &self,
        action: StepAction,
        handle: &SessionHandle,
        index: &SessionIndex,
        prover: &dyn Prover,
    ) -> (SlotId, Result<Option<u64>>) {
        match action {
            StepAction::Join { seeker, slot } => (slot, handle.join(seeker, slot).await.map(|_| None)),
            StepAction::Leave { seeker, slot } => {
                (slot, handle.leave(seeker, slot).await.map(|_| None))
            }
            StepAction::Equip {
                seeker,
                slot,
                bonus,
            } => (slot, handle.equip(seeker, slot, bonus).await.map(|_| None)),
            StepAction::Drink {
                seeker,
                slot,
                bonus,
            } => (slot, handle.drink(seeker, slot, bonus).await.map(|_| None)),
            StepAction::Claim { slot } => (slot, claim_direct(handle, index, slot).await),
            StepAction::ProveAndClaim { slot } => {
                (slot, claim_proven(handle, index, slot, prover).await)
            }
        }
    }
}

async fn claim_direct(handle: &SessionHandle, index: &SessionIndex, slot: SlotId) -> Result<Option<u64>> {
    let snapshot = handle.snapshot().await?;
    let tick = snapshot.current_tick();
    let configs = index.configs();
    let yields = snapshot.slot_yields(tick, &configs)?;
    let payout = handle
        .claim_reward(Claim::new(slot, tick, yields), configs)
        .await?;
    Ok(Some(payout.amount))
}

async fn claim_proven(
    handle: &SessionHandle,
    index: &SessionIndex,
    slot: SlotId,
    prover: &dyn Prover,
) -> Result<Option<u64>> {
    let snapshot = handle.snapshot().await?;
    let proven = prover.prove(&snapshot.session, snapshot.current_tick(), &index.configs())?;
    let payout = handle
        .claim_with_proof(proven.claim(slot), proven.proof)
        .await?;
    Ok(Some(payout.amount))
}

fn drain(rx: &mut broadcast::Receiver<Event>, index: &mut SessionIndex) {
    loop {
        match rx.try_recv() {
            Ok(event) => index.apply(&event),
            Err(TryRecvError::Lagged(missed)) => {
                tracing::warn!(missed, "event stream lagged; index may be incomplete");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}
