//! Runtime implementations of the `game-core` oracle traits.
//!
//! Seeker and mod data is static while a session runs; the registry is
//! shared behind an `Arc` between the worker and any offline tooling.
mod seekers;

pub use seekers::SeekerRegistry;
