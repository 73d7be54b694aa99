//! Match state construction.

use chrono::{DateTime, Utc};

use crate::clock::MatchClock;
use crate::config::MatchConfig;
use crate::domain::{GameScore, MatchState, PointScore, ServeState, SetScore};
use crate::error::ConfigError;

/// Validate `config` and build the opening state of a match starting now.
pub fn initialize_match(config: MatchConfig) -> Result<MatchState, ConfigError> {
    initialize_match_at(config, Utc::now())
}

/// Same as `initialize_match` with an explicit start instant.
pub fn initialize_match_at(
    config: MatchConfig,
    now: DateTime<Utc>,
) -> Result<MatchState, ConfigError> {
    config.validate()?;
    Ok(opening_state(config, MatchClock::started_at(now)))
}

/// Opening state for an already validated config, keeping the given clock.
pub(crate) fn opening_state(config: MatchConfig, clock: MatchClock) -> MatchState {
    let serve = ServeState::starting_with(config.first_server);
    MatchState {
        config,
        clock,
        is_match_over: false,
        winner: None,
        current_set_index: 0,
        sets: vec![SetScore::default()],
        games: GameScore::default(),
        points: PointScore::love(),
        is_tie_break: false,
        serve,
        should_switch_sides: false,
        history: Vec::new(),
    }
}
