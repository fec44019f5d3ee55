//! Combat arithmetic.
//!
//! Pure functions for removing armour and health over spans of ticks. All
//! combat logic is deterministic and side-effect free; the replay drives it.
//!
//! # Core Functions
//!
//! - `apply_ticks`: constant-rate damage over a span (clamped to 0)
//! - `ticks_until_depleted`: when a pool empties at a given rate
//! - `GatedPool`: armour absorbs damage strictly before health

pub mod ticks;

pub use ticks::{GatedPool, apply_ticks, ticks_until_depleted};
