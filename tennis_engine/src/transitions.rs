//! Scoring transitions.
//!
//! Every function here takes the current state by reference and returns a new
//! one. Inputs are never mutated. A point runs through five stages in order:
//! ladder or tie-break count, game completion, set completion, side switch,
//! history append.

use chrono::{DateTime, Utc};

use crate::clock::MatchClock;
use crate::config::MatchConfig;
use crate::domain::{
    count_set_wins, LadderPoint, MatchState, PerPlayer, PlayerId, PointScore, ServeState,
    SetScore,
};
use crate::error::ConfigError;
use crate::events::{EventKind, HistoryEvent};
use crate::invariants::try_validate_invariants;
use crate::state::opening_state;

/// Tie-break players change ends after every this many points.
const TIE_BREAK_SWITCH_INTERVAL: u32 = 6;

// ---------------------------------------------------------------------------
// Public transitions
// ---------------------------------------------------------------------------

/// Record a point for `winner`, timestamped now.
pub fn add_point(state: &MatchState, winner: PlayerId) -> MatchState {
    add_point_at(state, winner, Utc::now())
}

/// Record a point for `winner` with an explicit event timestamp.
///
/// Returns an unchanged copy once the match is over.
pub fn add_point_at(state: &MatchState, winner: PlayerId, at: DateTime<Utc>) -> MatchState {
    if state.is_match_over {
        tracing::debug!(%winner, "point ignored: match already over");
        return state.clone();
    }
    if rejects_corrupt_input(state, "add_point") {
        return state.clone();
    }

    let mut next = state.clone();

    let (game_won, tie_break_tally) = match next.points {
        PointScore::Standard(mut ladder) => {
            let won = advance_ladder(&mut ladder, winner, next.config.use_advantage);
            next.points = PointScore::Standard(ladder);
            (won, None)
        }
        PointScore::TieBreak(mut counts) => {
            counts[winner] += 1;
            let target = next.config.tie_break_target(next.current_set_index);
            let won = tie_break_won(&counts, winner, target);
            if !won && counts.total() % 2 == 1 {
                next.serve.server = next.serve.server.other();
            }
            next.points = PointScore::TieBreak(counts);
            (won, won.then_some(counts))
        }
    };

    let mut kind = EventKind::Point;
    if game_won {
        kind = EventKind::GameWin;
        if complete_game(&mut next, winner, tie_break_tally.is_some()) {
            kind = complete_set(&mut next, winner, tie_break_tally);
        }
    }

    next.should_switch_sides = side_switch_due(&next, kind);
    append_event(&mut next, kind, winner, at);
    next
}

/// Step back one point.
///
/// Returns an unchanged copy when there is nothing to undo. Undoing the only
/// point yields a fresh match that keeps the original start instant.
pub fn undo_point(state: &MatchState) -> MatchState {
    if state.history.is_empty() {
        tracing::debug!("undo ignored: history is empty");
        return state.clone();
    }
    if rejects_corrupt_input(state, "undo_point") {
        return state.clone();
    }

    let mut next = state.clone();
    next.history.pop();

    let Some(previous) = next.history.last().cloned() else {
        let clock = MatchClock::resumed_from(state.clock.start_time);
        return opening_state(next.config, clock);
    };

    let snapshot = previous.snapshot;
    next.sets = snapshot.sets;
    next.games = snapshot.games;
    next.points = snapshot.points;
    next.is_tie_break = snapshot.is_tie_break;
    next.serve = snapshot.serve;
    next.is_match_over = false;
    next.winner = None;
    next.current_set_index = next.sets.len() - 1;
    next.should_switch_sides = previous.side_switch_after;

    tracing::debug!(
        history_len = next.history.len(),
        points = %next.points,
        "point undone"
    );
    next
}

/// Swap the rule set. Only future points are affected; history and the score
/// in progress keep their shape.
pub fn replace_config(state: &MatchState, config: MatchConfig) -> Result<MatchState, ConfigError> {
    config.validate()?;
    let mut next = state.clone();
    next.config = config;
    Ok(next)
}

/// Flip which partner of `team` is due to serve next. Doubles only.
pub fn toggle_serving_partner(state: &MatchState, team: PlayerId) -> MatchState {
    let mut next = state.clone();
    if !next.config.is_doubles() || next.is_match_over {
        return next;
    }
    let index = &mut next.serve.partner_index[team];
    *index = 1 - *index;
    next
}

// ---------------------------------------------------------------------------
// Point stage
// ---------------------------------------------------------------------------

/// Move `winner` one rung up the ladder. Returns true when the game is won.
fn advance_ladder(
    ladder: &mut PerPlayer<LadderPoint>,
    winner: PlayerId,
    use_advantage: bool,
) -> bool {
    let loser = winner.other();
    match (ladder[winner], ladder[loser]) {
        (LadderPoint::Love, _) => {
            ladder[winner] = LadderPoint::Fifteen;
            false
        }
        (LadderPoint::Fifteen, _) => {
            ladder[winner] = LadderPoint::Thirty;
            false
        }
        (LadderPoint::Thirty, _) => {
            ladder[winner] = LadderPoint::Forty;
            false
        }
        (LadderPoint::Forty, LadderPoint::Forty) => {
            if use_advantage {
                ladder[winner] = LadderPoint::Advantage;
                false
            } else {
                true
            }
        }
        (LadderPoint::Forty, LadderPoint::Advantage) => {
            ladder[loser] = LadderPoint::Forty;
            false
        }
        (LadderPoint::Forty, _) | (LadderPoint::Advantage, _) => true,
    }
}

fn tie_break_won(counts: &PerPlayer<u32>, winner: PlayerId, target: u32) -> bool {
    let own = counts[winner];
    let theirs = counts[winner.other()];
    own >= target && own >= theirs + 2
}

// ---------------------------------------------------------------------------
// Game stage
// ---------------------------------------------------------------------------

/// Credit the game to `winner`. Returns true when the set is won too.
fn complete_game(state: &mut MatchState, winner: PlayerId, was_tie_break: bool) -> bool {
    let loser = winner.other();
    state.games[winner] += 1;
    state.points = PointScore::love();
    state.is_tie_break = false;
    state.sets[state.current_set_index] = SetScore::from_games(state.games);

    if was_tie_break {
        return true;
    }

    hand_over_serve(&mut state.serve, state.config.is_doubles());

    let won = state.games[winner];
    let lost = state.games[loser];
    let at = state.config.tie_break_at;

    if won == at && lost == at {
        start_tie_break(state);
        tracing::debug!(games = %state.sets[state.current_set_index], "tie-break started");
        false
    } else if won == at && lost.saturating_add(2) <= at {
        true
    } else {
        won.checked_sub(1) == Some(at) && lost.checked_add(1) == Some(at)
    }
}

/// End-of-game serve rotation. In doubles the team that just served will
/// use its other partner next time.
fn hand_over_serve(serve: &mut ServeState, doubles: bool) {
    if doubles {
        let index = &mut serve.partner_index[serve.server];
        *index = 1 - *index;
    }
    serve.server = serve.server.other();
}

fn start_tie_break(state: &mut MatchState) {
    state.is_tie_break = true;
    state.points = PointScore::tie_break_start();
    state.serve.tie_break_opener = Some(state.serve.server);
}

// ---------------------------------------------------------------------------
// Set stage
// ---------------------------------------------------------------------------

/// Freeze the current set and either finish the match or open the next set.
fn complete_set(
    state: &mut MatchState,
    winner: PlayerId,
    tie_break_tally: Option<PerPlayer<u32>>,
) -> EventKind {
    let index = state.current_set_index;
    state.sets[index].tie_break = tie_break_tally;

    if tie_break_tally.is_some() {
        // Whoever received the first tie-break point serves the next set.
        let opener = state.serve.tie_break_opener.take().unwrap_or(state.serve.server);
        state.serve.server = opener.other();
    }

    // Only the side that took this set can win the match on it.
    let wins = count_set_wins(&state.sets);
    if wins[winner] >= state.config.sets_to_win {
        state.is_match_over = true;
        state.winner = Some(winner);
        tracing::info!(
            %winner,
            score = %state.score_summary(),
            "match won"
        );
        return EventKind::MatchWin;
    }

    tracing::debug!(set = index, score = %state.sets[index], "set won");

    state.sets.push(SetScore::default());
    state.current_set_index = state.sets.len() - 1;
    state.games = PerPlayer::splat(0);

    if state.config.is_super_tie_break_set(state.current_set_index) {
        start_tie_break(state);
        tracing::debug!(set = state.current_set_index, "super tie-break decider started");
    }
    EventKind::SetWin
}

// ---------------------------------------------------------------------------
// Side switch and history
// ---------------------------------------------------------------------------

fn side_switch_due(state: &MatchState, kind: EventKind) -> bool {
    if let PointScore::TieBreak(counts) = state.points {
        let played = counts.total();
        return played > 0 && played % TIE_BREAK_SWITCH_INTERVAL == 0;
    }
    match kind {
        EventKind::GameWin => state.games.total() % 2 == 1,
        EventKind::SetWin => state
            .current_set_index
            .checked_sub(1)
            .and_then(|finished| state.sets.get(finished))
            .is_some_and(|set| set.total_games() % 2 == 1),
        EventKind::Point | EventKind::MatchWin => false,
    }
}

fn append_event(state: &mut MatchState, kind: EventKind, winner: PlayerId, at: DateTime<Utc>) {
    let event = HistoryEvent {
        sequence: state.history.len() as u64 + 1,
        timestamp: at,
        kind,
        winner,
        snapshot: state.snapshot(),
        side_switch_after: state.should_switch_sides,
    };
    state.history.push(event);
}

// ---------------------------------------------------------------------------
// Corrupt input policy
// ---------------------------------------------------------------------------

/// Debug builds panic on a structurally broken input state. Release builds
/// log it and leave the state untouched.
fn rejects_corrupt_input(state: &MatchState, operation: &'static str) -> bool {
    match try_validate_invariants(state) {
        Ok(()) => false,
        Err(violation) => {
            if cfg!(debug_assertions) {
                panic!("{} received a corrupt match state: {}", operation, violation);
            }
            tracing::error!(operation, %violation, "corrupt match state left unchanged");
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FinalSetType, MatchMode};
    use crate::state::initialize_match;

    fn config_with(use_advantage: bool) -> MatchConfig {
        MatchConfig {
            use_advantage,
            final_set_type: FinalSetType::Standard,
            ..Default::default()
        }
    }

    fn play(state: &MatchState, winners: &[PlayerId]) -> MatchState {
        winners.iter().fold(state.clone(), |s, w| add_point(&s, *w))
    }

    fn points(state: &MatchState, winner: PlayerId, n: usize) -> MatchState {
        play(state, &vec![winner; n])
    }

    fn ladder(p1: LadderPoint, p2: LadderPoint) -> PointScore {
        PointScore::Standard(PerPlayer::new(p1, p2))
    }

    fn deuce(use_advantage: bool) -> MatchState {
        let s = initialize_match(config_with(use_advantage)).unwrap();
        play(
            &s,
            &[PlayerId::P1, PlayerId::P1, PlayerId::P1, PlayerId::P2, PlayerId::P2, PlayerId::P2],
        )
    }

    #[test]
    fn test_ladder_progression() {
        let s = initialize_match(config_with(false)).unwrap();
        let s = add_point(&s, PlayerId::P1);
        assert_eq!(s.points, ladder(LadderPoint::Fifteen, LadderPoint::Love));
        let s = add_point(&s, PlayerId::P1);
        assert_eq!(s.points, ladder(LadderPoint::Thirty, LadderPoint::Love));
        let s = add_point(&s, PlayerId::P2);
        assert_eq!(s.points, ladder(LadderPoint::Thirty, LadderPoint::Fifteen));
        assert_eq!(s.history.len(), 3);
        assert!(s.history.iter().all(|e| e.kind == EventKind::Point));
    }

    #[test]
    fn test_golden_point_at_deuce() {
        let s = deuce(false);
        assert_eq!(s.points, ladder(LadderPoint::Forty, LadderPoint::Forty));
        for side in PlayerId::ALL {
            let after = add_point(&s, side);
            assert_eq!(after.games[side], 1);
            assert_eq!(after.points, PointScore::love());
            assert_eq!(after.last_event().unwrap().kind, EventKind::GameWin);
        }
    }

    #[test]
    fn test_advantage_cycle() {
        let s = deuce(true);
        let ad_in = add_point(&s, PlayerId::P1);
        assert_eq!(ad_in.points, ladder(LadderPoint::Advantage, LadderPoint::Forty));
        assert_eq!(ad_in.games.p1, 0);

        let back = add_point(&ad_in, PlayerId::P2);
        assert_eq!(back.points, ladder(LadderPoint::Forty, LadderPoint::Forty));

        let game = add_point(&ad_in, PlayerId::P1);
        assert_eq!(game.games.p1, 1);
        assert_eq!(game.points, PointScore::love());
    }

    #[test]
    fn test_server_rotates_each_game() {
        let s = initialize_match(config_with(false)).unwrap();
        assert_eq!(s.serve.server, PlayerId::P1);
        let s = points(&s, PlayerId::P2, 4);
        assert_eq!(s.serve.server, PlayerId::P2);
        let s = points(&s, PlayerId::P2, 4);
        assert_eq!(s.serve.server, PlayerId::P1);
    }

    #[test]
    fn test_doubles_partner_rotation() {
        let config = MatchConfig {
            mode: MatchMode::Doubles,
            ..config_with(false)
        };
        let s = initialize_match(config).unwrap();
        // Game 1: P1 team serves, partner 0 -> their next turn uses partner 1.
        let s = points(&s, PlayerId::P1, 4);
        assert_eq!(s.serve.server, PlayerId::P2);
        assert_eq!(s.serve.partner_index, PerPlayer::new(1, 0));
        // Game 2: P2 team serves.
        let s = points(&s, PlayerId::P1, 4);
        assert_eq!(s.serve.server, PlayerId::P1);
        assert_eq!(s.serve.partner_index, PerPlayer::new(1, 1));
        // Game 3: P1 team serves with partner 1 -> back to 0.
        let s = points(&s, PlayerId::P1, 4);
        assert_eq!(s.serve.partner_index, PerPlayer::new(0, 1));
    }

    #[test]
    fn test_singles_partner_indexes_stay_put() {
        let s = initialize_match(config_with(false)).unwrap();
        let s = points(&s, PlayerId::P1, 12);
        assert_eq!(s.serve.partner_index, PerPlayer::splat(0));
    }

    #[test]
    fn test_set_won_six_four_and_seven_five() {
        let s = initialize_match(config_with(false)).unwrap();
        // 5-4 to P1
        let mut s = s;
        for _ in 0..4 {
            s = points(&s, PlayerId::P1, 4);
            s = points(&s, PlayerId::P2, 4);
        }
        s = points(&s, PlayerId::P1, 4);
        assert_eq!(s.games, PerPlayer::new(5, 4));
        let six_four = points(&s, PlayerId::P1, 4);
        assert_eq!(six_four.sets[0], SetScore::from_games(PerPlayer::new(6, 4)));
        assert_eq!(six_four.current_set_index, 1);
        assert_eq!(six_four.last_event().unwrap().kind, EventKind::SetWin);

        // 5-5, 6-5 is not enough, 7-5 is.
        let s = points(&s, PlayerId::P2, 4);
        let s = points(&s, PlayerId::P1, 4);
        assert_eq!(s.games, PerPlayer::new(6, 5));
        assert_eq!(s.current_set_index, 0);
        let s = points(&s, PlayerId::P1, 4);
        assert_eq!(s.sets[0], SetScore::from_games(PerPlayer::new(7, 5)));
        assert_eq!(s.games, PerPlayer::splat(0));
    }

    #[test]
    fn test_current_set_entry_tracks_games() {
        let s = initialize_match(config_with(false)).unwrap();
        let s = points(&s, PlayerId::P2, 8);
        assert_eq!(s.sets[0].games(), PerPlayer::new(0, 2));
    }

    #[test]
    fn test_tie_break_server_rotation_on_odd_totals() {
        let mut s = initialize_match(config_with(false)).unwrap();
        for _ in 0..6 {
            s = points(&s, PlayerId::P1, 4);
            s = points(&s, PlayerId::P2, 4);
        }
        assert!(s.is_tie_break);
        let opener = s.serve.server;
        assert_eq!(s.serve.tie_break_opener, Some(opener));

        let s1 = add_point(&s, PlayerId::P1);
        assert_eq!(s1.serve.server, opener.other());
        let s2 = add_point(&s1, PlayerId::P1);
        assert_eq!(s2.serve.server, opener.other());
        let s3 = add_point(&s2, PlayerId::P2);
        assert_eq!(s3.serve.server, opener);
    }

    #[test]
    fn test_tie_break_side_switch_every_six_points() {
        let mut s = initialize_match(config_with(false)).unwrap();
        for _ in 0..6 {
            s = points(&s, PlayerId::P1, 4);
            s = points(&s, PlayerId::P2, 4);
        }
        let s = play(&s, &[PlayerId::P1, PlayerId::P2, PlayerId::P1, PlayerId::P2, PlayerId::P1]);
        assert!(!s.should_switch_sides);
        let s = add_point(&s, PlayerId::P2);
        assert_eq!(s.points, PointScore::TieBreak(PerPlayer::new(3, 3)));
        assert!(s.should_switch_sides);
        let s = add_point(&s, PlayerId::P2);
        assert!(!s.should_switch_sides);
    }

    #[test]
    fn test_side_switch_on_odd_game_totals() {
        let s = initialize_match(config_with(false)).unwrap();
        let s = points(&s, PlayerId::P1, 3);
        assert!(!s.should_switch_sides);
        let s = add_point(&s, PlayerId::P1);
        assert!(s.should_switch_sides, "1 game played");
        let s = add_point(&s, PlayerId::P1);
        assert!(!s.should_switch_sides, "mid-game points never switch");
        let s = points(&s, PlayerId::P1, 3);
        assert!(!s.should_switch_sides, "2 games played");
    }

    #[test]
    fn test_side_switch_after_odd_set() {
        // 6-3: nine games, so the new set starts with a change of ends.
        let mut s = initialize_match(config_with(false)).unwrap();
        for _ in 0..3 {
            s = points(&s, PlayerId::P1, 4);
            s = points(&s, PlayerId::P2, 4);
        }
        s = points(&s, PlayerId::P1, 12);
        assert_eq!(s.sets[0].games(), PerPlayer::new(6, 3));
        assert!(s.should_switch_sides);
        assert!(s.last_event().unwrap().side_switch_after);
    }

    #[test]
    fn test_tie_break_handoff_uses_opener() {
        let mut s = initialize_match(config_with(false)).unwrap();
        for _ in 0..6 {
            s = points(&s, PlayerId::P1, 4);
            s = points(&s, PlayerId::P2, 4);
        }
        // Twelve games alternate from P1, so P1 opens the tie-break.
        assert_eq!(s.serve.tie_break_opener, Some(PlayerId::P1));
        let s = play(
            &s,
            &[PlayerId::P2, PlayerId::P1, PlayerId::P2, PlayerId::P2, PlayerId::P2, PlayerId::P2, PlayerId::P2, PlayerId::P2],
        );
        assert_eq!(s.sets[0].games(), PerPlayer::new(6, 7));
        assert_eq!(s.sets[0].tie_break, Some(PerPlayer::new(1, 7)));
        assert_eq!(s.serve.server, PlayerId::P2);
        assert_eq!(s.serve.tie_break_opener, None);
        assert!(s.should_switch_sides, "13 games in the finished set");
    }

    #[test]
    fn test_point_after_match_over_is_noop() {
        let config = MatchConfig {
            sets_to_win: 1,
            ..config_with(false)
        };
        let s = initialize_match(config).unwrap();
        let s = points(&s, PlayerId::P2, 24);
        assert!(s.is_match_over);
        assert_eq!(s.winner, Some(PlayerId::P2));
        assert_eq!(s.last_event().unwrap().kind, EventKind::MatchWin);
        assert!(!s.should_switch_sides);

        let again = add_point(&s, PlayerId::P1);
        assert_eq!(again, s);
    }

    #[test]
    fn test_undo_on_empty_history_is_noop() {
        let s = initialize_match(config_with(false)).unwrap();
        assert_eq!(undo_point(&s), s);
    }

    #[test]
    fn test_undo_first_point_keeps_start_time() {
        let s = initialize_match(config_with(true)).unwrap();
        let one = add_point(&s, PlayerId::P2);
        let back = undo_point(&one);
        assert_eq!(back, s);
        assert_eq!(back.clock.start_time, s.clock.start_time);
    }

    #[test]
    fn test_undo_reopens_finished_match() {
        let config = MatchConfig {
            sets_to_win: 1,
            ..config_with(false)
        };
        let s = initialize_match(config).unwrap();
        let before_last = points(&s, PlayerId::P1, 23);
        let over = add_point(&before_last, PlayerId::P1);
        assert!(over.is_match_over);
        let reopened = undo_point(&over);
        assert!(!reopened.is_match_over);
        assert_eq!(reopened.winner, None);
        assert_eq!(reopened, before_last);
    }

    #[test]
    fn test_undo_restores_serve_state() {
        let s = initialize_match(config_with(false)).unwrap();
        let three = points(&s, PlayerId::P1, 3);
        let game = add_point(&three, PlayerId::P1);
        assert_ne!(game.serve, three.serve);
        assert_eq!(undo_point(&game).serve, three.serve);
    }

    #[test]
    fn test_replace_config_is_not_retroactive() {
        let s = initialize_match(config_with(false)).unwrap();
        let s = points(&s, PlayerId::P1, 5);
        let swapped = replace_config(&s, config_with(true)).unwrap();
        assert!(swapped.config.use_advantage);
        assert_eq!(swapped.history, s.history);
        assert_eq!(swapped.games, s.games);

        let bad = MatchConfig {
            tie_break_at: 0,
            ..Default::default()
        };
        assert!(replace_config(&s, bad).is_err());
    }

    #[test]
    fn test_lowered_sets_to_win_credits_the_set_winner() {
        let best_of_five = MatchConfig {
            sets_to_win: 3,
            ..config_with(false)
        };
        let s = initialize_match(best_of_five).unwrap();
        let s = points(&s, PlayerId::P1, 48);
        assert_eq!(s.sets_won(), PerPlayer::new(2, 0));

        // The lower target is not retroactive: P1's earlier sets end nothing.
        let s = replace_config(&s, MatchConfig { sets_to_win: 2, ..config_with(false) }).unwrap();
        let s = points(&s, PlayerId::P2, 24);
        assert!(!s.is_match_over);
        assert_eq!(s.winner, None);
        assert_eq!(s.last_event().unwrap().kind, EventKind::SetWin);

        let s = points(&s, PlayerId::P2, 24);
        assert!(s.is_match_over);
        assert_eq!(s.winner, Some(PlayerId::P2));
        let last = s.last_event().unwrap();
        assert_eq!(last.kind, EventKind::MatchWin);
        assert_eq!(last.winner, PlayerId::P2);
    }

    #[test]
    fn test_huge_tie_break_threshold_does_not_overflow() {
        let config = MatchConfig {
            tie_break_at: u32::MAX,
            ..config_with(false)
        };
        let s = initialize_match(config).unwrap();
        let s = points(&s, PlayerId::P1, 4 * 7);
        assert_eq!(s.games, PerPlayer::new(7, 0));
        assert_eq!(s.current_set_index, 0);
        assert!(!s.is_tie_break);
    }

    #[test]
    fn test_toggle_serving_partner() {
        let singles = initialize_match(config_with(false)).unwrap();
        assert_eq!(toggle_serving_partner(&singles, PlayerId::P1), singles);

        let doubles = initialize_match(MatchConfig {
            mode: MatchMode::Doubles,
            ..Default::default()
        })
        .unwrap();
        let toggled = toggle_serving_partner(&doubles, PlayerId::P2);
        assert_eq!(toggled.serve.partner_index, PerPlayer::new(0, 1));
        assert!(toggled.history.is_empty());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "corrupt match state")]
    fn test_corrupt_input_panics_in_debug() {
        let mut s = initialize_match(config_with(false)).unwrap();
        s.is_tie_break = true;
        let _ = add_point(&s, PlayerId::P1);
    }
}
