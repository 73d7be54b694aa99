#![forbid(unsafe_code)]

//! Host runtime for the tennis scoring kernel.
//!
//! Commands, replay, snapshots, spectator projections and single-writer
//! sessions. No scoring rules live here; every transition is delegated to
//! `tennis_engine`.

pub mod command;
pub mod replay;
pub mod snapshot_codec;
pub mod projection;
pub mod session;
