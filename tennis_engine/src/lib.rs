#![forbid(unsafe_code)]

//! Tennis scoring kernel.
//!
//! Pure transitions from `(MatchState, point)` to a new `MatchState`, with an
//! append-only history that makes every point undoable.

/// Scoring rules version. Part of the canonical hash.
pub const ENGINE_VERSION: u32 = 1;

pub mod config;
pub mod error;
pub mod domain;
pub mod events;
pub mod clock;
pub mod state;
pub mod transitions;
pub mod invariants;
pub mod hashing;
pub mod engine;
