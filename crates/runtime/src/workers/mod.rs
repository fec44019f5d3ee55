//! Worker tasks that back the runtime orchestration.
//!
//! The session worker owns the authoritative [`game_core::Session`] and is
//! the only place commands and claims are applied, one at a time. The
//! persistence worker owns the event log and writes behind it.

mod persistence;
mod session;

pub use persistence::{PersistenceError, PersistenceWorker};
pub use session::{ClaimWitness, Command, SessionWorker, SharedVerifier};
