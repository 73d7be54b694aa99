//! Stateful holder around the pure transitions.
//!
//! `ScoreKeeper` owns one `MatchState` and replaces it on every call. It adds
//! no rules of its own.

use chrono::Utc;

use crate::clock::MatchClock;
use crate::config::MatchConfig;
use crate::domain::{MatchState, PlayerId};
use crate::error::{ConfigError, InvariantViolation};
use crate::invariants::try_validate_invariants;
use crate::state::{initialize_match, opening_state};
use crate::transitions;

#[derive(Debug, Clone)]
pub struct ScoreKeeper {
    state: MatchState,
}

impl ScoreKeeper {
    /// Start a new match under `config`.
    pub fn new(config: MatchConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            state: initialize_match(config)?,
        })
    }

    /// Adopt a state produced elsewhere, e.g. a restored snapshot.
    pub fn from_state(state: MatchState) -> Result<Self, InvariantViolation> {
        try_validate_invariants(&state)?;
        Ok(Self { state })
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn into_state(self) -> MatchState {
        self.state
    }

    pub fn add_point(&mut self, winner: PlayerId) -> &MatchState {
        self.state = transitions::add_point(&self.state, winner);
        &self.state
    }

    pub fn undo(&mut self) -> &MatchState {
        self.state = transitions::undo_point(&self.state);
        &self.state
    }

    pub fn replace_config(&mut self, config: MatchConfig) -> Result<&MatchState, ConfigError> {
        self.state = transitions::replace_config(&self.state, config)?;
        Ok(&self.state)
    }

    pub fn toggle_serving_partner(&mut self, team: PlayerId) -> &MatchState {
        self.state = transitions::toggle_serving_partner(&self.state, team);
        &self.state
    }

    /// Throw the current match away and start again under the same rules.
    pub fn reset(&mut self) -> &MatchState {
        // The held config was validated on the way in.
        self.state = opening_state(self.state.config.clone(), MatchClock::started_at(Utc::now()));
        &self.state
    }

    /// Event-sourced reconstruction from a list of point winners.
    pub fn replay(config: MatchConfig, winners: &[PlayerId]) -> Result<Self, ConfigError> {
        let mut keeper = Self::new(config)?;
        for winner in winners {
            keeper.add_point(*winner);
        }
        Ok(keeper)
    }
}
