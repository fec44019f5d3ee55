//! Cloneable façade for issuing commands to the runtime.
//!
//! [`SessionHandle`] hides channel plumbing and offers async helpers for the
//! session's external interface: roster commands, state queries, and claims.
use tokio::sync::{broadcast, mpsc, oneshot};

use game_core::{
    BonusId, Claim, DrinkAction, EquipAction, JoinAction, LeaveAction, Payout, SeekerId,
    SessionCommand, SessionPhase, Slot, SlotConfig, SlotId, SlotUpdated, Tick, TileData,
};
use zk::ProofData;

use super::errors::{Result, RuntimeError};
use super::snapshot::SessionSnapshot;
use crate::events::{Event, EventBus, Topic};
use crate::workers::{ClaimWitness, Command};

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl SessionHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Asks the worker to stop once the commands queued so far are done.
    pub(crate) async fn request_shutdown(&self) -> Result<()> {
        self.command_tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    /// Runs any roster command at the worker's current tick.
    pub async fn execute(&self, command: SessionCommand) -> Result<SlotUpdated> {
        self.request(|reply| Command::Execute { command, reply })
            .await?
    }

    pub async fn join(&self, seeker: SeekerId, slot: SlotId) -> Result<SlotUpdated> {
        self.execute(SessionCommand::Join(JoinAction { seeker, slot }))
            .await
    }

    pub async fn leave(&self, seeker: SeekerId, slot: SlotId) -> Result<SlotUpdated> {
        self.execute(SessionCommand::Leave(LeaveAction { seeker, slot }))
            .await
    }

    pub async fn equip(&self, seeker: SeekerId, slot: SlotId, bonus: BonusId) -> Result<SlotUpdated> {
        self.execute(SessionCommand::Equip(EquipAction {
            seeker,
            slot,
            bonus,
        }))
        .await
    }

    pub async fn drink(&self, seeker: SeekerId, slot: SlotId, bonus: BonusId) -> Result<SlotUpdated> {
        self.execute(SessionCommand::Drink(DrinkAction {
            seeker,
            slot,
            bonus,
        }))
        .await
    }

    /// Query the current session (read-only snapshot)
    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        self.request(|reply| Command::Query { reply }).await
    }

    pub async fn slots(&self) -> Result<Vec<Slot>> {
        Ok(self.snapshot().await?.slots().to_vec())
    }

    pub async fn tile_data(&self) -> Result<TileData> {
        Ok(*self.snapshot().await?.tile_data())
    }

    pub async fn iteration(&self) -> Result<u32> {
        Ok(self.snapshot().await?.iteration())
    }

    pub async fn phase(&self) -> Result<SessionPhase> {
        Ok(self.snapshot().await?.phase())
    }

    /// Replays `configs` at `tick` against the current session parameters.
    pub async fn slot_yields(&self, tick: Tick, configs: &[Vec<SlotConfig>]) -> Result<Vec<u64>> {
        Ok(self.snapshot().await?.slot_yields(tick, configs)?)
    }

    /// Claims with every slot's full config log as witness.
    pub async fn claim_reward(&self, claim: Claim, configs: Vec<Vec<SlotConfig>>) -> Result<Payout> {
        let witness = ClaimWitness::Direct(configs);
        self.request(|reply| Command::Claim {
            claim,
            witness,
            reply,
        })
        .await?
    }

    /// Claims with a proof over the claimed yields.
    pub async fn claim_with_proof(&self, claim: Claim, proof: ProofData) -> Result<Payout> {
        let witness = ClaimWitness::Proof(proof);
        self.request(|reply| Command::Claim {
            claim,
            witness,
            reply,
        })
        .await?
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Session` - Slot updates, spawns, and rejected commands
    /// - `Topic::Claim` - Claim payouts and rejections
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
