//! Topic-based event bus for runtime events.
//!
//! Events are published to specific topics and consumers subscribe only to
//! the topics they need. The session topic carries every `SlotUpdated`, so a
//! subscriber can rebuild the config logs with [`crate::SessionIndex`].

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{ClaimEvent, SessionEvent};
