//! Structural checks on a `MatchState`.
//!
//! Transitions only ever produce states that pass these. A failure means the
//! state was built or edited outside the engine.

use crate::domain::{LadderPoint, MatchState, PlayerId, PointScore};
use crate::error::InvariantViolation;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run every check. Panics on the first failure.
pub fn validate_invariants(state: &MatchState) {
    if let Err(violation) = try_validate_invariants(state) {
        panic!("Invariant violation: {}", violation);
    }
}

/// Non-panicking variant of `validate_invariants`.
pub fn try_validate_invariants(state: &MatchState) -> Result<(), InvariantViolation> {
    check_config(state)?;
    check_set_index(state)?;
    check_point_mode(state)?;
    check_ladder(state)?;
    check_current_set_mirrors_games(state)?;
    check_winner(state)?;
    check_partner_indexes(state)?;
    check_history_sequence(state)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Individual checks (private)
// ---------------------------------------------------------------------------

fn check_config(state: &MatchState) -> Result<(), InvariantViolation> {
    state
        .config
        .validate()
        .map_err(|e| InvariantViolation::new("config", e.to_string()))
}

fn check_set_index(state: &MatchState) -> Result<(), InvariantViolation> {
    if state.sets.is_empty() {
        return Err(InvariantViolation::new("set_index", "match has no set entries"));
    }
    if state.current_set_index != state.sets.len() - 1 {
        return Err(InvariantViolation::new(
            "set_index",
            format!(
                "current_set_index={} but {} set entries",
                state.current_set_index,
                state.sets.len()
            ),
        ));
    }
    Ok(())
}

fn check_point_mode(state: &MatchState) -> Result<(), InvariantViolation> {
    if state.is_tie_break != state.points.is_tie_break() {
        return Err(InvariantViolation::new(
            "point_mode",
            format!(
                "is_tie_break={} but points are {:?}",
                state.is_tie_break, state.points
            ),
        ));
    }
    Ok(())
}

/// `Ad` is only reachable from deuce.
fn check_ladder(state: &MatchState) -> Result<(), InvariantViolation> {
    if let PointScore::Standard(ladder) = state.points {
        for side in PlayerId::ALL {
            if ladder[side] == LadderPoint::Advantage && ladder[side.other()] != LadderPoint::Forty {
                return Err(InvariantViolation::new(
                    "ladder",
                    format!("{} has Ad while opponent is at {}", side, ladder[side.other()]),
                ));
            }
        }
    }
    Ok(())
}

fn check_current_set_mirrors_games(state: &MatchState) -> Result<(), InvariantViolation> {
    if let Some(current) = state.current_set() {
        if current.games() != state.games {
            return Err(InvariantViolation::new(
                "set_mirror",
                format!(
                    "set entry {} is {} but games are {}-{}",
                    state.current_set_index, current, state.games.p1, state.games.p2
                ),
            ));
        }
    }
    Ok(())
}

fn check_winner(state: &MatchState) -> Result<(), InvariantViolation> {
    if state.is_match_over != state.winner.is_some() {
        return Err(InvariantViolation::new(
            "winner",
            format!(
                "is_match_over={} but winner={:?}",
                state.is_match_over, state.winner
            ),
        ));
    }
    Ok(())
}

fn check_partner_indexes(state: &MatchState) -> Result<(), InvariantViolation> {
    for side in PlayerId::ALL {
        if state.serve.partner_index[side] > 1 {
            return Err(InvariantViolation::new(
                "partner_index",
                format!("{} partner index is {}", side, state.serve.partner_index[side]),
            ));
        }
    }
    Ok(())
}

fn check_history_sequence(state: &MatchState) -> Result<(), InvariantViolation> {
    for (position, event) in state.history.iter().enumerate() {
        let expected = position as u64 + 1;
        if event.sequence != expected {
            return Err(InvariantViolation::new(
                "history_sequence",
                format!("event at position {} has sequence {}", position, event.sequence),
            ));
        }
    }
    Ok(())
}
