//! Traits describing data the session reads but does not own.
//!
//! Seeker stats and mod definitions come from token data held elsewhere;
//! proof verification is delegated to whatever backend produced the proof.
//! The session only sees these seams, never concrete implementations.
mod proof;
mod seekers;

pub use proof::ProofOracle;
pub use seekers::SeekerOracle;
