//! Action log domain.
//!
//! Every join, leave, equip, and drink becomes one tick-stamped
//! [`SlotConfig`](crate::state::SlotConfig) appended to its slot.
//!
//! # Module Structure
//!
//! - `log`: [`ActionLog`] (slot roster + per-slot config history) and the
//!   [`SlotUpdated`] record emitted per accepted append
//! - `commitment`: rolling SHA-256 [`Commitment`] over a slot's configs
//! - `error`: [`ActionError`] (out-of-order ticks, invalid actions)

pub mod commitment;
pub mod error;
pub mod log;

pub use commitment::{Commitment, ENCODED_CONFIG_LEN, encode_config};
pub use error::{ActionError, InvalidActionReason};
pub use log::{ActionLog, SlotUpdated};
