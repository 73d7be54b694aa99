//! Replay: rebuild a match from its opening config and command stream.
//!
//! All scoring goes through the kernel. Nothing is cached between calls.

use chrono::Utc;
use thiserror::Error;

use tennis_engine::config::MatchConfig;
use tennis_engine::domain::MatchState;
use tennis_engine::error::ConfigError;
use tennis_engine::hashing::canonical_hash;
use tennis_engine::state::initialize_match_at;

use crate::command::{apply_command, ScoreCommand};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error("command {position} ({command}) rejected: {source}")]
    Rejected {
        position: usize,
        command: &'static str,
        source: ConfigError,
    },

    #[error("opening config rejected: {0}")]
    Config(#[from] ConfigError),

    #[error("replay diverged: first run {first}, second run {second}")]
    Diverged { first: String, second: String },
}

/// Rebuild the state reached by `commands` from a fresh match under `config`.
///
/// Returns the final state and its canonical hash.
pub fn rebuild_state(
    config: MatchConfig,
    commands: &[ScoreCommand],
) -> Result<(MatchState, String), ReplayError> {
    let at = Utc::now();
    let mut state = initialize_match_at(config, at)?;

    for (position, command) in commands.iter().enumerate() {
        state = apply_command(&state, command, at).map_err(|source| ReplayError::Rejected {
            position,
            command: command.name(),
            source,
        })?;
    }

    let hash = canonical_hash(&state);
    tracing::debug!(commands = commands.len(), %hash, "replay finished");
    Ok((state, hash))
}

/// Rebuild and return only the canonical hash.
pub fn rebuild_hash(config: MatchConfig, commands: &[ScoreCommand]) -> Result<String, ReplayError> {
    let (_, hash) = rebuild_state(config, commands)?;
    Ok(hash)
}

/// Replay twice and require identical hashes.
pub fn verify_determinism(
    config: &MatchConfig,
    commands: &[ScoreCommand],
) -> Result<String, ReplayError> {
    let first = rebuild_hash(config.clone(), commands)?;
    let second = rebuild_hash(config.clone(), commands)?;
    if first != second {
        return Err(ReplayError::Diverged { first, second });
    }
    Ok(first)
}
