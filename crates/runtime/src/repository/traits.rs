//! Repository contracts for the session event timeline.

use super::Result;
use crate::events::Event;

/// Append-only event log.
///
/// The session worker appends every event it publishes, so the log is the
/// durable counterpart of the event bus. Offsets are opaque: pass back the
/// `next_offset` returned by [`EventRepository::read_at_offset`] to walk the
/// log, starting from 0.
pub trait EventRepository: Send + Sync {
    /// Append an event to the log
    ///
    /// Returns the offset where the event was written.
    fn append(&mut self, event: &Event) -> Result<u64>;

    /// Read an event at a specific offset
    ///
    /// Returns `None` if the offset is beyond the end of the log.
    /// Returns `Some((event, next_offset))` otherwise.
    fn read_at_offset(&self, offset: u64) -> Result<Option<(Event, u64)>>;

    /// Flush buffered writes
    fn flush(&mut self) -> Result<()>;

    /// Current end offset of the log
    fn size(&self) -> Result<u64>;

    /// Session identifier associated with this log
    fn session_id(&self) -> &str;

    /// Every event from the start of the log, in append order.
    fn read_all(&self) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        let mut offset = 0;
        while let Some((event, next)) = self.read_at_offset(offset)? {
            events.push(event);
            offset = next;
        }
        Ok(events)
    }
}
