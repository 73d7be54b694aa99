//! Canonical hashing.
//!
//! Deterministic serialization of the scoring-relevant part of a
//! `MatchState`, plus its SHA-256.
//!
//! Rules:
//!   - engine_version first, then fixed top-level field order
//!   - clock and event timestamps excluded (host bookkeeping)
//!   - history reduced to sequence, type, winner, side switch
//!   - UTF-8 JSON, no whitespace

use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::domain::MatchState;
use crate::ENGINE_VERSION;

/// Canonical serialization of a MatchState to UTF-8 JSON bytes.
pub fn canonical_serialize(state: &MatchState) -> Vec<u8> {
    let obj = build_canonical_value(state);
    serde_json::to_string(&obj)
        .expect("canonical_serialize: JSON serialization failed")
        .into_bytes()
}

/// SHA-256 of canonical serialization. Lowercase hex string.
pub fn canonical_hash(state: &MatchState) -> String {
    let bytes = canonical_serialize(state);
    let digest = Sha256::digest(&bytes);
    digest.iter().map(|b| format!("{:02x}", b)).collect::<String>()
}

fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).expect("canonical_serialize: value is not representable as JSON")
}

/// Field order: engine_version, config, sets, games, points, is_tie_break,
/// serve, should_switch_sides, is_match_over, winner, history
fn build_canonical_value(state: &MatchState) -> Value {
    let history: Vec<Value> = state
        .history
        .iter()
        .map(|event| {
            let mut entry = Map::new();
            entry.insert("sequence".to_string(), Value::from(event.sequence));
            entry.insert("type".to_string(), Value::from(event.kind.as_str()));
            entry.insert("winner".to_string(), to_value(&event.winner));
            entry.insert("side_switch_after".to_string(), Value::Bool(event.side_switch_after));
            Value::Object(entry)
        })
        .collect();

    let mut root = Map::new();
    root.insert("engine_version".to_string(), Value::from(ENGINE_VERSION));
    root.insert("config".to_string(), to_value(&state.config));
    root.insert("sets".to_string(), to_value(&state.sets));
    root.insert("games".to_string(), to_value(&state.games));
    root.insert("points".to_string(), to_value(&state.points));
    root.insert("is_tie_break".to_string(), Value::Bool(state.is_tie_break));
    root.insert("serve".to_string(), to_value(&state.serve));
    root.insert("should_switch_sides".to_string(), Value::Bool(state.should_switch_sides));
    root.insert("is_match_over".to_string(), Value::Bool(state.is_match_over));
    root.insert("winner".to_string(), to_value(&state.winner));
    root.insert("history".to_string(), Value::Array(history));

    Value::Object(root)
}
