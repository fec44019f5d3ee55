//! High-level runtime orchestrator.
//!
//! The runtime owns the session and persistence workers, wires up
//! command/event channels, and exposes a builder-based API for clients to
//! drive a session. With an event log configured, the session is restored
//! from it before the worker accepts commands.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use game_core::{SeekerOracle, SessionConfig};

use crate::api::{Result, RuntimeError, SessionHandle};
use crate::clock::{ManualClock, TickSource};
use crate::config::RuntimeConfig;
use crate::events::{Event, EventBus, Topic};
use crate::oracle::SeekerRegistry;
use crate::repository::{EventRepository, FileEventLog};
use crate::restore::restore_session;
use crate::workers::{PersistenceError, PersistenceWorker, SessionWorker, SharedVerifier};

/// Main runtime that hosts one session.
///
/// [`SessionHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: SessionHandle,
    worker_handle: JoinHandle<()>,
    persistence_handle: Option<JoinHandle<std::result::Result<(), PersistenceError>>>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Shutdown the runtime gracefully
    ///
    /// The session worker finishes the commands queued ahead of the request,
    /// even if other handles are still alive; their later requests fail with
    /// [`RuntimeError::CommandChannelClosed`]. The event log is then drained
    /// and flushed.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::Persistence`] if events could not be written.
    pub async fn shutdown(self) -> Result<()> {
        // already stopped if every handle is gone
        let _ = self.handle.request_shutdown().await;
        drop(self.handle);
        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)?;

        if let Some(persistence) = self.persistence_handle {
            persistence.await.map_err(RuntimeError::WorkerJoin)??;
        }
        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    session: SessionConfig,
    seekers: Arc<dyn SeekerOracle>,
    clock: Arc<dyn TickSource>,
    verifier: Option<SharedVerifier>,
    repository: Option<Box<dyn EventRepository>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            session: SessionConfig::default(),
            seekers: Arc::new(SeekerRegistry::new()),
            clock: Arc::new(ManualClock::default()),
            verifier: None,
            repository: None,
        }
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    pub fn seekers(mut self, seekers: impl SeekerOracle + 'static) -> Self {
        self.seekers = Arc::new(seekers);
        self
    }

    pub fn clock(mut self, clock: impl TickSource + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Verifier for claims that carry a proof.
    pub fn verifier(mut self, verifier: SharedVerifier) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Event log to use instead of the one `enable_persistence` opens.
    pub fn repository(mut self, repository: impl EventRepository + 'static) -> Self {
        self.repository = Some(Box::new(repository));
        self
    }

    /// Restores the session from the event log, if any, and spawns the
    /// workers.
    ///
    /// # Errors
    ///
    /// * [`RuntimeError::InvalidConfig`] for a session without slots or ticks
    /// * [`RuntimeError::Repository`] when the event log cannot be opened or read
    /// * [`RuntimeError::Restore`] when the log does not replay under this
    ///   session config and seeker registry
    pub async fn build(self) -> Result<Runtime> {
        if self.session.slot_count() == 0 || self.session.num_ticks == 0 {
            return Err(RuntimeError::InvalidConfig(
                "session needs at least one slot and one tick".into(),
            ));
        }

        let repository = match self.repository {
            Some(repository) => Some(repository),
            None if self.config.enable_persistence => {
                let dir = self.config.session_dir();
                let log = FileEventLog::open_or_create(&dir, RuntimeConfig::EVENT_LOG)?;
                tracing::info!(path = %log.path().display(), "persisting session events");
                Some(Box::new(log) as Box<dyn EventRepository>)
            }
            None => None,
        };

        let history = match &repository {
            Some(repository) => repository.read_all()?,
            None => Vec::new(),
        };
        let restored = restore_session(self.session, self.seekers.as_ref(), &history)?;

        let (command_tx, command_rx) = mpsc::channel(self.config.command_buffer_size.max(1));
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let (persist_tx, persistence_handle) = match repository {
            Some(repository) => {
                let (tx, rx) = mpsc::channel(self.config.event_buffer_size.max(1));
                let worker =
                    PersistenceWorker::new(repository, rx, self.config.persistence_attempts);
                (Some(tx), Some(tokio::spawn(worker.run())))
            }
            None => (None, None),
        };

        let worker = SessionWorker::new(
            restored.session,
            self.seekers,
            self.clock,
            command_rx,
            event_bus.clone(),
        )
        .with_verifier(self.verifier)
        .with_persistence(persist_tx)
        .resume_at(restored.resume_at);
        let worker_handle = tokio::spawn(worker.run());

        Ok(Runtime {
            handle: SessionHandle::new(command_tx, event_bus),
            worker_handle,
            persistence_handle,
        })
    }
}
