//! Match rules, fixed when a match is created.
//!
//! Only the scoring fields feed transitions; names are carried for hosts.

use serde::{Deserialize, Serialize};

use crate::domain::PlayerId;
use crate::error::ConfigError;

/// Best of five is the longest supported format.
pub const MAX_SETS_TO_WIN: u32 = 3;

/// Points needed to take a super tie-break played in place of a final set.
pub const SUPER_TIE_BREAK_POINTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalSetType {
    /// Deciding set is played out in games like any other.
    Standard,
    /// Deciding set is a single tie-break to `SUPER_TIE_BREAK_POINTS`.
    SuperTieBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    #[default]
    Singles,
    Doubles,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchConfig {
    pub p1_name: String,
    pub p2_name: String,
    pub sets_to_win: u32,
    /// `false` plays a golden point at 40-40.
    pub use_advantage: bool,
    pub final_set_type: FinalSetType,
    pub tie_break_at: u32,
    pub tie_break_points: u32,
    pub mode: MatchMode,
    pub p1_partner_name: Option<String>,
    pub p2_partner_name: Option<String>,
    pub first_server: PlayerId,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            p1_name: "Player 1".to_string(),
            p2_name: "Player 2".to_string(),
            sets_to_win: 2,
            use_advantage: false,
            final_set_type: FinalSetType::SuperTieBreak,
            tie_break_at: 6,
            tie_break_points: 7,
            mode: MatchMode::Singles,
            p1_partner_name: None,
            p2_partner_name: None,
            first_server: PlayerId::P1,
        }
    }
}

impl MatchConfig {
    /// Reject rule sets the engine cannot score. Values are never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sets_to_win < 1 || self.sets_to_win > MAX_SETS_TO_WIN {
            return Err(ConfigError::SetsToWinOutOfRange {
                value: self.sets_to_win,
                max: MAX_SETS_TO_WIN,
            });
        }
        if self.tie_break_at < 1 {
            return Err(ConfigError::TieBreakAtTooSmall(self.tie_break_at));
        }
        if self.tie_break_points < 1 {
            return Err(ConfigError::TieBreakPointsTooSmall(self.tie_break_points));
        }
        Ok(())
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: MatchConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn is_doubles(&self) -> bool {
        self.mode == MatchMode::Doubles
    }

    /// Index of the last possible set.
    pub fn decider_set_index(&self) -> usize {
        (self.sets_to_win as usize * 2).saturating_sub(2)
    }

    /// Whether the set at `set_index` is played as a single super tie-break.
    pub fn is_super_tie_break_set(&self, set_index: usize) -> bool {
        self.final_set_type == FinalSetType::SuperTieBreak
            && set_index == self.decider_set_index()
    }

    /// Points needed to win a tie-break played in the set at `set_index`.
    pub fn tie_break_target(&self, set_index: usize) -> u32 {
        if self.is_super_tie_break_set(set_index) {
            SUPER_TIE_BREAK_POINTS
        } else {
            self.tie_break_points
        }
    }

    /// Name shown for a side; both partners in doubles.
    pub fn display_name(&self, side: PlayerId) -> String {
        let (name, partner) = match side {
            PlayerId::P1 => (&self.p1_name, &self.p1_partner_name),
            PlayerId::P2 => (&self.p2_name, &self.p2_partner_name),
        };
        match (self.is_doubles(), partner) {
            (true, Some(partner)) => format!("{} & {}", name, partner),
            _ => name.clone(),
        }
    }
}
