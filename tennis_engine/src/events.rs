//! History ledger entries.
//!
//! Events are pure data. Each one owns a full copy of the score as it stood
//! immediately after the point it records, so undo never recomputes anything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{GameScore, PlayerId, PointScore, ServeState, SetScore};

/// What a point achieved. Ordered from least to most specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Point,
    GameWin,
    SetWin,
    MatchWin,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Point => "POINT",
            EventKind::GameWin => "GAME_WIN",
            EventKind::SetWin => "SET_WIN",
            EventKind::MatchWin => "MATCH_WIN",
        }
    }

    /// True for anything that closed at least a game.
    pub fn closes_game(self) -> bool {
        self != EventKind::Point
    }
}

/// Everything `undo_point` restores from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoreSnapshot {
    pub sets: Vec<SetScore>,
    pub games: GameScore,
    pub points: PointScore,
    pub is_tie_break: bool,
    pub serve: ServeState,
}

/// One entry in the append-only match history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryEvent {
    /// 1-based position in the history.
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub winner: PlayerId,
    pub snapshot: ScoreSnapshot,
    pub side_switch_after: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_wire_names() {
        for kind in [EventKind::Point, EventKind::GameWin, EventKind::SetWin, EventKind::MatchWin] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_event_kind_specificity_order() {
        assert!(EventKind::Point < EventKind::GameWin);
        assert!(EventKind::GameWin < EventKind::SetWin);
        assert!(EventKind::SetWin < EventKind::MatchWin);
        assert!(!EventKind::Point.closes_game());
        assert!(EventKind::MatchWin.closes_game());
    }
}
