//! Core domain types for a tennis match.
//!
//! Pure data plus read-only helpers. No transition logic lives here.

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::clock::MatchClock;
use crate::config::MatchConfig;
use crate::events::{HistoryEvent, ScoreSnapshot};

// ── Players ────────────────────────────────────────────────────────

/// One side of the net. In doubles this identifies the team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayerId {
    P1,
    P2,
}

impl PlayerId {
    pub const ALL: [PlayerId; 2] = [PlayerId::P1, PlayerId::P2];

    pub fn other(self) -> Self {
        match self {
            PlayerId::P1 => PlayerId::P2,
            PlayerId::P2 => PlayerId::P1,
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerId::P1 => f.write_str("P1"),
            PlayerId::P2 => f.write_str("P2"),
        }
    }
}

/// A value held for each side, indexable by `PlayerId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PerPlayer<T> {
    pub p1: T,
    pub p2: T,
}

impl<T> PerPlayer<T> {
    pub fn new(p1: T, p2: T) -> Self {
        Self { p1, p2 }
    }
}

impl<T: Copy> PerPlayer<T> {
    pub fn splat(value: T) -> Self {
        Self { p1: value, p2: value }
    }
}

impl PerPlayer<u32> {
    pub fn total(&self) -> u32 {
        self.p1 + self.p2
    }

    /// The side with strictly more, if any.
    pub fn leader(&self) -> Option<PlayerId> {
        match self.p1.cmp(&self.p2) {
            std::cmp::Ordering::Greater => Some(PlayerId::P1),
            std::cmp::Ordering::Less => Some(PlayerId::P2),
            std::cmp::Ordering::Equal => None,
        }
    }
}

impl<T> Index<PlayerId> for PerPlayer<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &T {
        match player {
            PlayerId::P1 => &self.p1,
            PlayerId::P2 => &self.p2,
        }
    }
}

impl<T> IndexMut<PlayerId> for PerPlayer<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut T {
        match player {
            PlayerId::P1 => &mut self.p1,
            PlayerId::P2 => &mut self.p2,
        }
    }
}

/// Games won by each side in the current set.
pub type GameScore = PerPlayer<u32>;

// ── Points ─────────────────────────────────────────────────────────

/// Position on the standard game ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LadderPoint {
    #[serde(rename = "0")]
    Love,
    #[serde(rename = "15")]
    Fifteen,
    #[serde(rename = "30")]
    Thirty,
    #[serde(rename = "40")]
    Forty,
    #[serde(rename = "Ad")]
    Advantage,
}

impl LadderPoint {
    pub fn label(self) -> &'static str {
        match self {
            LadderPoint::Love => "0",
            LadderPoint::Fifteen => "15",
            LadderPoint::Thirty => "30",
            LadderPoint::Forty => "40",
            LadderPoint::Advantage => "Ad",
        }
    }
}

impl fmt::Display for LadderPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Points in the current game. The variant is the scoring mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PointScore {
    Standard(PerPlayer<LadderPoint>),
    TieBreak(PerPlayer<u32>),
}

impl PointScore {
    /// `0-0` on the standard ladder.
    pub fn love() -> Self {
        PointScore::Standard(PerPlayer::splat(LadderPoint::Love))
    }

    /// `0-0` in a tie-break.
    pub fn tie_break_start() -> Self {
        PointScore::TieBreak(PerPlayer::splat(0))
    }

    pub fn is_tie_break(&self) -> bool {
        matches!(self, PointScore::TieBreak(_))
    }

    /// Display label for one side: a ladder label or a tie-break count.
    pub fn label(&self, player: PlayerId) -> String {
        match self {
            PointScore::Standard(ladder) => ladder[player].label().to_string(),
            PointScore::TieBreak(counts) => counts[player].to_string(),
        }
    }
}

impl Default for PointScore {
    fn default() -> Self {
        PointScore::love()
    }
}

impl fmt::Display for PointScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.label(PlayerId::P1), self.label(PlayerId::P2))
    }
}

// ── Sets ───────────────────────────────────────────────────────────

/// Games in one set. `tie_break` holds the deciding tie-break points once a
/// set has been settled by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetScore {
    pub p1: u32,
    pub p2: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tie_break: Option<PerPlayer<u32>>,
}

impl SetScore {
    pub fn from_games(games: GameScore) -> Self {
        Self {
            p1: games.p1,
            p2: games.p2,
            tie_break: None,
        }
    }

    pub fn games(&self) -> GameScore {
        PerPlayer::new(self.p1, self.p2)
    }

    pub fn total_games(&self) -> u32 {
        self.p1 + self.p2
    }

    pub fn leader(&self) -> Option<PlayerId> {
        self.games().leader()
    }
}

impl fmt::Display for SetScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.p1, self.p2)
    }
}

/// Count the sets each side leads in `sets`.
pub fn count_set_wins(sets: &[SetScore]) -> PerPlayer<u32> {
    let mut wins = PerPlayer::splat(0);
    for set in sets {
        if let Some(leader) = set.leader() {
            wins[leader] += 1;
        }
    }
    wins
}

// ── Serve ──────────────────────────────────────────────────────────

/// Who serves, and in doubles which partner of each team is due next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServeState {
    pub server: PlayerId,
    /// 0 or 1 per team.
    pub partner_index: PerPlayer<u8>,
    /// Side that served the first point of the tie-break in progress.
    pub tie_break_opener: Option<PlayerId>,
}

impl ServeState {
    pub fn starting_with(server: PlayerId) -> Self {
        Self {
            server,
            partner_index: PerPlayer::splat(0),
            tie_break_opener: None,
        }
    }
}

// ── Match ──────────────────────────────────────────────────────────

/// Complete match state. Transitions consume a reference and return a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchState {
    pub config: MatchConfig,
    pub clock: MatchClock,
    pub is_match_over: bool,
    pub winner: Option<PlayerId>,
    pub current_set_index: usize,
    pub sets: Vec<SetScore>,
    pub games: GameScore,
    pub points: PointScore,
    pub is_tie_break: bool,
    pub serve: ServeState,
    pub should_switch_sides: bool,
    pub history: Vec<HistoryEvent>,
}

impl MatchState {
    pub fn current_set(&self) -> Option<&SetScore> {
        self.sets.get(self.current_set_index)
    }

    /// Sets that have a final result. The last entry only counts once the
    /// match is over; before that it is the set in progress.
    pub fn completed_sets(&self) -> &[SetScore] {
        if self.is_match_over {
            &self.sets
        } else {
            &self.sets[..self.current_set_index.min(self.sets.len())]
        }
    }

    pub fn sets_won(&self) -> PerPlayer<u32> {
        count_set_wins(self.completed_sets())
    }

    pub fn last_event(&self) -> Option<&HistoryEvent> {
        self.history.last()
    }

    /// Owned copy of everything `undo_point` needs to restore.
    pub fn snapshot(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            sets: self.sets.clone(),
            games: self.games,
            points: self.points,
            is_tie_break: self.is_tie_break,
            serve: self.serve,
        }
    }

    /// Compact scoreline: finished sets, then the current set's games.
    /// `"6-4, 2-1"`
    pub fn score_summary(&self) -> String {
        let mut parts: Vec<String> = self
            .sets
            .iter()
            .take(self.current_set_index)
            .map(|s| s.to_string())
            .collect();
        parts.push(format!("{}-{}", self.games.p1, self.games.p2));
        parts.join(", ")
    }
}
