//! Read models published to spectators.
//!
//! A live match is mirrored as two documents: a summary that changes at most
//! once per game, and a realtime view that changes on every point.
//! `summary_due` decides when the summary has to be rewritten.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tennis_engine::config::MatchConfig;
use tennis_engine::domain::{GameScore, MatchState, PlayerId, PointScore, SetScore};
use tennis_engine::events::HistoryEvent;

/// Events carried in the realtime view's timeline.
pub const RECENT_HISTORY_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Live,
    Finished,
}

/// Low-frequency match document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveMatchSummary {
    pub id: String,
    pub p1_name: String,
    pub p2_name: String,
    /// e.g. `"6-4, 2-3"`
    pub score_summary: String,
    pub current_games: GameScore,
    pub current_sets: Vec<SetScore>,
    pub server: PlayerId,
    pub is_doubles: bool,
    pub status: MatchStatus,
    pub match_duration: u64,
    pub start_time: Option<DateTime<Utc>>,
    pub is_paused: bool,
    pub config: MatchConfig,
    pub last_updated: DateTime<Utc>,
}

impl LiveMatchSummary {
    pub fn from_state(id: &str, state: &MatchState, now: DateTime<Utc>) -> Self {
        let status = if state.is_match_over {
            MatchStatus::Finished
        } else {
            MatchStatus::Live
        };
        Self {
            id: id.to_string(),
            p1_name: state.config.display_name(PlayerId::P1),
            p2_name: state.config.display_name(PlayerId::P2),
            score_summary: state.score_summary(),
            current_games: state.games,
            current_sets: state.sets.clone(),
            server: state.serve.server,
            is_doubles: state.config.is_doubles(),
            status,
            match_duration: state.clock.elapsed_seconds(now),
            start_time: state.clock.start_time,
            is_paused: state.clock.is_paused,
            config: state.config.clone(),
            last_updated: now,
        }
    }
}

/// High-frequency point-by-point document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeProjection {
    pub current_points: PointScore,
    pub is_tie_break: bool,
    pub should_switch_sides: bool,
    /// Most recent events, oldest first.
    pub history: Vec<HistoryEvent>,
    pub last_updated: DateTime<Utc>,
}

impl RealtimeProjection {
    pub fn from_state(state: &MatchState, now: DateTime<Utc>) -> Self {
        let skip = state.history.len().saturating_sub(RECENT_HISTORY_LIMIT);
        Self {
            current_points: state.points,
            is_tie_break: state.is_tie_break,
            should_switch_sides: state.should_switch_sides,
            history: state.history[skip..].to_vec(),
            last_updated: now,
        }
    }
}

/// Whether the summary document is stale after reaching `state`: a match
/// with no points yet, a finished match, or a point that closed a game.
pub fn summary_due(state: &MatchState) -> bool {
    match state.last_event() {
        None => true,
        Some(_) if state.is_match_over => true,
        Some(event) => event.kind.closes_game(),
    }
}
