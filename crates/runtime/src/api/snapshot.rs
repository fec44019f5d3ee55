//! Read-only copies of the session handed out by the worker.
use game_core::{ReplayError, Session, SessionPhase, Slot, SlotConfig, Tick, TileData};

/// Session state at the absolute tick the snapshot was taken.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub session: Session,
    /// Absolute tick of the worker's clock when the snapshot was taken.
    pub now: u64,
}

impl SessionSnapshot {
    pub fn slots(&self) -> &[Slot] {
        self.session.slots()
    }

    pub fn tile_data(&self) -> &TileData {
        self.session.tile_data()
    }

    pub fn iteration(&self) -> u32 {
        self.session.iteration()
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase(self.now)
    }

    pub fn current_tick(&self) -> Tick {
        self.session.current_tick(self.now)
    }

    pub fn slot_yields(
        &self,
        tick: Tick,
        configs: &[Vec<SlotConfig>],
    ) -> Result<Vec<u64>, ReplayError> {
        self.session.slot_yields(tick, configs)
    }
}
