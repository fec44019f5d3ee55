//! Persistence worker that appends published events to the event log.
//!
//! The session worker hands every event over a bounded channel and moves
//! on; disk I/O happens here, off the command path. Transient failures are
//! retried with exponential backoff. Once retries are exhausted the worker
//! stops and closes its channel, which the session worker treats as a
//! signal to refuse further commands: the log never silently falls behind.
//!
//! The worker ends when the session worker drops its sender. Queued events
//! are drained and the log is flushed before it returns.

use tokio::sync::mpsc;
use tokio::time::{Duration, sleep};
use tracing::{debug, error, info, warn};

use crate::events::Event;
use crate::repository::{self, EventRepository, RepositoryError};

/// Result type for persistence operations
pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Errors that end the persistence worker.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to append event after {attempts} attempts")]
    Append {
        attempts: u32,
        #[source]
        source: RepositoryError,
    },

    #[error("failed to flush event log after {attempts} attempts")]
    Flush {
        attempts: u32,
        #[source]
        source: RepositoryError,
    },
}

/// Background worker that owns the event repository.
pub struct PersistenceWorker {
    repository: Box<dyn EventRepository>,
    event_rx: mpsc::Receiver<Event>,
    max_attempts: u32,
}

impl PersistenceWorker {
    const BASE_DELAY_MS: u64 = 100;

    pub fn new(
        repository: Box<dyn EventRepository>,
        event_rx: mpsc::Receiver<Event>,
        max_attempts: u32,
    ) -> Self {
        Self {
            repository,
            event_rx,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Main worker loop; ends once the session worker stops.
    pub async fn run(mut self) -> Result<()> {
        info!(
            target: "runtime::persistence",
            log = self.repository.session_id(),
            "persistence worker started"
        );

        while let Some(event) = self.event_rx.recv().await {
            if let Err(error) = self.persist(&event).await {
                error!(target: "runtime::persistence", %error, "persistence stopped");
                return Err(error);
            }
        }

        self.finalize().await?;
        info!(target: "runtime::persistence", "persistence worker stopped");
        Ok(())
    }

    async fn persist(&mut self, event: &Event) -> Result<()> {
        self.with_retry("append", |repository| repository.append(event))
            .await
            .map_err(|(attempts, source)| PersistenceError::Append { attempts, source })?;
        // flush once the queue is drained
        if self.event_rx.is_empty() {
            self.flush().await?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        self.with_retry("flush", |repository| repository.flush())
            .await
            .map_err(|(attempts, source)| PersistenceError::Flush { attempts, source })
    }

    async fn finalize(&mut self) -> Result<()> {
        debug!(target: "runtime::persistence", "flushing event log");
        self.flush().await
    }

    /// Runs `op` until it succeeds or `max_attempts` is reached, doubling
    /// the delay after each failure.
    async fn with_retry<T>(
        &mut self,
        action: &'static str,
        mut op: impl FnMut(&mut Box<dyn EventRepository>) -> repository::Result<T>,
    ) -> std::result::Result<T, (u32, RepositoryError)> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op(&mut self.repository) {
                Ok(value) => {
                    if attempt > 1 {
                        info!(target: "runtime::persistence", action, attempt, "event log recovered");
                    }
                    return Ok(value);
                }
                Err(error) if attempt < self.max_attempts => {
                    let delay = Duration::from_millis(Self::BASE_DELAY_MS << (attempt - 1).min(10));
                    warn!(
                        target: "runtime::persistence",
                        action,
                        attempt,
                        max_attempts = self.max_attempts,
                        %error,
                        ?delay,
                        "event log write failed, retrying"
                    );
                    sleep(delay).await;
                }
                Err(error) => return Err((attempt, error)),
            }
        }
    }
}
