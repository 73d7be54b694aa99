//! Error types for the scoring kernel.

use thiserror::Error;

/// A match configuration the engine refuses to score.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("sets_to_win must be between 1 and {max}, got {value}")]
    SetsToWinOutOfRange { value: u32, max: u32 },

    #[error("tie_break_at must be at least 1, got {0}")]
    TieBreakAtTooSmall(u32),

    #[error("tie_break_points must be at least 1, got {0}")]
    TieBreakPointsTooSmall(u32),

    #[error("malformed configuration: {0}")]
    Malformed(String),
}

/// A `MatchState` that breaks one of the structural invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[INVARIANT:{invariant}] {detail}")]
pub struct InvariantViolation {
    pub invariant: &'static str,
    pub detail: String,
}

impl InvariantViolation {
    pub(crate) fn new(invariant: &'static str, detail: impl Into<String>) -> Self {
        Self {
            invariant,
            detail: detail.into(),
        }
    }
}
