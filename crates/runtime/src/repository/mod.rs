//! Persistence adapters for the session event timeline.
//!
//! [`FileRepository`] stores `[u32 length][bincode item]` records in an
//! append-only file; [`InMemoryEventRepository`] keeps them in a `Vec` for
//! tests and ephemeral runs.

mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::{FileEventLog, FileRepository};
pub use memory::InMemoryEventRepository;
pub use traits::EventRepository;
