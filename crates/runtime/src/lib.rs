//! Runtime orchestration for seeker sessions.
//!
//! This crate wires a [`game_core::Session`] into an async service: one worker
//! task owns the session and applies commands in arrival order, clients talk
//! to it through a cloneable [`SessionHandle`], and every outcome is
//! published on an [`EventBus`] and optionally appended to an event log,
//! from which a restarted runtime restores the session.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`indexer`] rebuilds config logs from the event stream
//! - [`restore`] rebuilds the session itself from a persisted log
//! - [`oracle`], [`clock`], and [`repository`] provide adapters reused by other crates
//! - [`scenario`] runs scripted sessions from RON files
pub mod api;
pub mod clock;
pub mod config;
pub mod events;
pub mod indexer;
pub mod oracle;
pub mod repository;
pub mod restore;
pub mod runtime;
pub mod scenario;

mod workers;

pub use api::{Result, RuntimeError, SessionHandle, SessionSnapshot};
pub use clock::{ManualClock, TickSource, WallClock};
pub use config::RuntimeConfig;
pub use events::{ClaimEvent, Event, EventBus, SessionEvent, Topic};
pub use indexer::SessionIndex;
pub use oracle::SeekerRegistry;
pub use repository::{
    EventRepository, FileEventLog, FileRepository, InMemoryEventRepository, RepositoryError,
};
pub use restore::{RestoreError, RestoredSession, restore_session};
pub use runtime::{Runtime, RuntimeBuilder};
pub use scenario::{Scenario, ScenarioReport, Step, StepAction, StepOutcome};
pub use workers::{ClaimWitness, PersistenceError, SharedVerifier};
