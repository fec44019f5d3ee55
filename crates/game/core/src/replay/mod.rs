//! Deterministic yield replay.
//!
//! Rebuilds cumulative per-slot yields at an arbitrary tick from the ordered
//! config logs alone. Every function here is pure: the same logs and target
//! always produce the same result, so the replay can run on record (claim
//! verification) and off record (provers, indexers) interchangeably.
//!
//! - [`replay_slot`]: resource sessions, one slot at a time
//! - [`replay_session`]: dungeon combat across all slots
//! - [`session_yields`]: dispatches on the session's [`GameVariant`]

mod combat;
mod error;
mod harvest;
mod validate;

pub use combat::{SessionReplay, replay_session};
pub use error::{MalformedReason, ReplayError};
pub use harvest::{Occupancy, replay_slot};
pub use validate::validate_configs;

use crate::config::{GameVariant, SessionConfig};
use crate::state::{SlotConfig, SlotId, Tick};

/// Cumulative yield of every slot at `target` under the session's variant.
pub fn session_yields(
    config: &SessionConfig,
    configs: &[Vec<SlotConfig>],
    target: Tick,
) -> Result<Vec<u64>, ReplayError> {
    match &config.variant {
        GameVariant::Dungeon(spec) => Ok(replay_session(spec, configs, target)?.yields),
        GameVariant::Harvest => configs
            .iter()
            .enumerate()
            .map(|(index, log)| {
                let slot = SlotId(u16::try_from(index).unwrap_or(u16::MAX));
                replay_slot(slot, log, target)
            })
            .collect(),
    }
}
