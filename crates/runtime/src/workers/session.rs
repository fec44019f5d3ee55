//! Session worker that owns the authoritative [`game_core::Session`].
//!
//! Receives commands from [`crate::SessionHandle`], executes them via
//! [`game_core::SessionEngine`], and publishes every outcome to the event
//! bus and, when configured, the persistence worker. Arrival order on the
//! command channel is the total order of the session.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use game_core::{
    Claim, DirectReplay, ExecuteError, Payout, ProofCarrying, ProofOracle, SeekerOracle, Session,
    SessionCommand, SlotConfig, SlotUpdated, TransitionPhase,
};
use zk::ProofData;

use crate::api::{Result, RuntimeError, SessionSnapshot};
use crate::clock::TickSource;
use crate::events::{ClaimEvent, Event, EventBus, SessionEvent};

/// Proof verifier shared with the worker.
pub type SharedVerifier = Arc<dyn ProofOracle<Proof = ProofData> + Send + Sync>;

/// Evidence backing a claim.
#[derive(Debug, Clone)]
pub enum ClaimWitness {
    /// Every slot's full config log; the worker replays it.
    Direct(Vec<Vec<SlotConfig>>),
    /// Proof over the claimed yields, checked by the configured verifier.
    Proof(ProofData),
}

/// Commands that can be sent to the session worker
pub enum Command {
    /// Run a join, leave, equip, or drink at the current tick.
    Execute {
        command: SessionCommand,
        reply: oneshot::Sender<Result<SlotUpdated>>,
    },
    /// Verify and record a reward claim.
    Claim {
        claim: Claim,
        witness: ClaimWitness,
        reply: oneshot::Sender<Result<Payout>>,
    },
    /// Copy of the session and the current tick (read-only).
    Query {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    /// Stop after the commands queued ahead of this one.
    Shutdown,
}

/// Background task that processes session commands.
pub struct SessionWorker {
    session: Session,
    seekers: Arc<dyn SeekerOracle>,
    verifier: Option<SharedVerifier>,
    clock: Arc<dyn TickSource>,
    command_rx: mpsc::Receiver<Command>,
    events: EventBus,
    persist_tx: Option<mpsc::Sender<Event>>,
    /// Earliest tick commands may run at, so a restored session never
    /// sees time run backwards.
    floor: u64,
}

impl SessionWorker {
    pub fn new(
        session: Session,
        seekers: Arc<dyn SeekerOracle>,
        clock: Arc<dyn TickSource>,
        command_rx: mpsc::Receiver<Command>,
        events: EventBus,
    ) -> Self {
        Self {
            session,
            seekers,
            verifier: None,
            clock,
            command_rx,
            events,
            persist_tx: None,
            floor: 0,
        }
    }

    pub fn with_verifier(mut self, verifier: Option<SharedVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Hands every published event to the persistence worker.
    pub fn with_persistence(mut self, persist_tx: Option<mpsc::Sender<Event>>) -> Self {
        self.persist_tx = persist_tx;
        self
    }

    pub fn resume_at(mut self, floor: Option<u64>) -> Self {
        self.floor = floor.unwrap_or(0);
        self
    }

    /// Main worker loop; ends on [`Command::Shutdown`] or once every handle
    /// is dropped.
    pub async fn run(mut self) {
        info!(target: "runtime::worker", "session worker started");
        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    if matches!(cmd, Command::Shutdown) {
                        info!(target: "runtime::worker", "shutdown command received");
                        break;
                    }
                    self.handle_command(cmd).await;
                }
                else => break,
            }
        }
        info!(target: "runtime::worker", "session worker stopped");
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Execute { command, reply } => {
                let result = match self.ensure_persisting() {
                    Ok(()) => self.execute(command).await,
                    Err(error) => Err(error),
                };
                let _ = reply.send(result);
            }
            Command::Claim {
                claim,
                witness,
                reply,
            } => {
                let result = match self.ensure_persisting() {
                    Ok(()) => self.claim(claim, witness).await,
                    Err(error) => Err(error),
                };
                let _ = reply.send(result);
            }
            Command::Query { reply } => {
                let _ = reply.send(SessionSnapshot {
                    session: self.session.clone(),
                    now: self.now(),
                });
            }
            Command::Shutdown => {}
        }
    }

    fn now(&self) -> u64 {
        self.clock.now().max(self.floor)
    }

    /// Refuses state changes once the event log can no longer record them.
    fn ensure_persisting(&self) -> Result<()> {
        match &self.persist_tx {
            Some(tx) if tx.is_closed() => Err(RuntimeError::PersistenceStopped),
            _ => Ok(()),
        }
    }

    async fn execute(&mut self, command: SessionCommand) -> Result<SlotUpdated> {
        let now = self.now();
        let iteration = self.session.iteration();

        match self.session.execute(now, self.seekers.as_ref(), command) {
            Ok(update) => {
                if self.session.iteration() != iteration {
                    self.publish(SessionEvent::Spawned {
                        iteration: self.session.iteration(),
                        start: now,
                        reward_supply: self.session.reward_supply(),
                    })
                    .await;
                }
                debug!(
                    target: "runtime::worker",
                    command = command.as_str(),
                    slot = %update.slot,
                    now,
                    "command applied"
                );
                self.publish(SessionEvent::SlotUpdated { update, at: now })
                    .await;
                Ok(update)
            }
            Err(error) => {
                self.report_rejection(command, &error, now).await;
                Err(error.into())
            }
        }
    }

    async fn report_rejection(
        &mut self,
        command: SessionCommand,
        error: &ExecuteError,
        now: u64,
    ) {
        let phase = error.phase();
        let message = error.session_error().to_string();

        if phase == TransitionPhase::PreValidate {
            debug!(
                target: "runtime::worker",
                command = ?command,
                phase = phase.as_str(),
                error = %message,
                "command rejected during pre-validate"
            );
        } else {
            error!(
                target: "runtime::worker",
                command = ?command,
                phase = phase.as_str(),
                error = %message,
                "command execution failed"
            );
        }

        self.publish(SessionEvent::CommandRejected {
            command,
            phase,
            error: message,
            at: now,
        })
        .await;
    }

    async fn claim(&mut self, claim: Claim, witness: ClaimWitness) -> Result<Payout> {
        let now = self.now();
        let proven = matches!(witness, ClaimWitness::Proof(_));

        let result = match &witness {
            ClaimWitness::Direct(configs) => {
                self.session
                    .claim_reward(now, &claim, &DirectReplay::new(configs))
            }
            ClaimWitness::Proof(proof) => {
                let verifier = self.verifier.clone().ok_or(RuntimeError::VerifierNotSet)?;
                self.session
                    .claim_reward(now, &claim, &ProofCarrying::new(proof, verifier.as_ref()))
            }
        };

        match result {
            Ok(payout) => {
                self.publish(ClaimEvent::Paid {
                    payout,
                    tick: claim.tick,
                    proven,
                    at: now,
                })
                .await;
                Ok(payout)
            }
            Err(error) => {
                warn!(target: "runtime::worker", slot = %claim.slot, %error, "claim rejected");
                self.publish(ClaimEvent::Rejected {
                    slot: claim.slot,
                    error: error.to_string(),
                    at: now,
                })
                .await;
                Err(error.into())
            }
        }
    }

    /// Queues `event` for the event log, then broadcasts it.
    ///
    /// The session change behind an event is already committed. If the
    /// persistence worker has stopped, the event is broadcast anyway and
    /// [`Self::ensure_persisting`] refuses the next command.
    async fn publish(&mut self, event: impl Into<Event>) {
        let event = event.into();
        if let Some(tx) = &self.persist_tx
            && tx.send(event.clone()).await.is_err()
        {
            error!(target: "runtime::worker", "event log closed, event not persisted");
        }
        self.events.publish(event);
    }
}
