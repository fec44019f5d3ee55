//! In-memory event log implementation.

use std::sync::{Arc, RwLock};

use super::{EventRepository, RepositoryError, Result};
use crate::events::Event;

/// In-memory event log for tests and ephemeral runs.
///
/// Offsets are indices into the backing `Vec`. Clones share the same log,
/// so a caller can keep reading after handing one to the runtime.
#[derive(Clone)]
pub struct InMemoryEventRepository {
    session_id: String,
    events: Arc<RwLock<Vec<Event>>>,
}

impl InMemoryEventRepository {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            events: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl EventRepository for InMemoryEventRepository {
    fn append(&mut self, event: &Event) -> Result<u64> {
        let mut events = self
            .events
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        events.push(event.clone());
        Ok(events.len() as u64 - 1)
    }

    fn read_at_offset(&self, offset: u64) -> Result<Option<(Event, u64)>> {
        let events = self
            .events
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(events
            .get(offset as usize)
            .cloned()
            .map(|event| (event, offset + 1)))
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn size(&self) -> Result<u64> {
        let events = self
            .events
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(events.len() as u64)
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }
}
