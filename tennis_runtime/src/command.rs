//! Host commands.
//!
//! Everything a scorer's device can ask of a match, as plain data. A command
//! stream plus the opening config is enough to rebuild a match.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tennis_engine::config::MatchConfig;
use tennis_engine::domain::{MatchState, PlayerId};
use tennis_engine::error::ConfigError;
use tennis_engine::transitions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ScoreCommand {
    Point { winner: PlayerId },
    Undo,
    ToggleServingPartner { team: PlayerId },
    ReplaceConfig { config: MatchConfig },
}

impl ScoreCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ScoreCommand::Point { .. } => "point",
            ScoreCommand::Undo => "undo",
            ScoreCommand::ToggleServingPartner { .. } => "toggle_serving_partner",
            ScoreCommand::ReplaceConfig { .. } => "replace_config",
        }
    }
}

/// Run one command against `state`. Only `ReplaceConfig` can fail.
pub fn apply_command(
    state: &MatchState,
    command: &ScoreCommand,
    at: DateTime<Utc>,
) -> Result<MatchState, ConfigError> {
    let next = match command {
        ScoreCommand::Point { winner } => transitions::add_point_at(state, *winner, at),
        ScoreCommand::Undo => transitions::undo_point(state),
        ScoreCommand::ToggleServingPartner { team } => {
            transitions::toggle_serving_partner(state, *team)
        }
        ScoreCommand::ReplaceConfig { config } => {
            transitions::replace_config(state, config.clone())?
        }
    };
    Ok(next)
}
