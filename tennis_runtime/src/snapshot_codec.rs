//! Snapshot codec for `MatchState`.
//!
//! Pure codec layer plus file helpers.
//!
//! - `encode_snapshot`:  MatchState → JSON string
//! - `decode_snapshot`:  JSON string → MatchState (strict, unknown fields rejected)
//! - `restore_snapshot`: decode + invariant validation
//! - `export_snapshot_to_file` / `import_snapshot_from_file`: file I/O
//! - `snapshot_hash`:    SHA-256 of the encoded JSON (lowercase hex)

use std::fs;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};
use thiserror::Error;

use tennis_engine::domain::MatchState;
use tennis_engine::error::InvariantViolation;
use tennis_engine::invariants::try_validate_invariants;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("snapshot serialization failed: {0}")]
    Serialization(String),

    /// Malformed JSON, missing fields or unknown fields.
    #[error("snapshot deserialization failed: {0}")]
    Deserialization(String),

    #[error("snapshot violates match invariants: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error("snapshot I/O failed: {0}")]
    Io(#[from] io::Error),
}

// ---------------------------------------------------------------------------
// Encode / decode
// ---------------------------------------------------------------------------

/// Encode a MatchState as compact JSON. Identical states give identical bytes.
///
/// Unlike `canonical_hash`, the snapshot keeps the clock and event
/// timestamps: it is the full state, not just the scoring part.
pub fn encode_snapshot(state: &MatchState) -> Result<String, SnapshotError> {
    serde_json::to_string(state).map_err(|e| SnapshotError::Serialization(e.to_string()))
}

/// Decode without validating. Use `restore_snapshot` for untrusted input.
pub fn decode_snapshot(json: &str) -> Result<MatchState, SnapshotError> {
    serde_json::from_str::<MatchState>(json)
        .map_err(|e| SnapshotError::Deserialization(e.to_string()))
}

/// Decode and check every structural invariant.
pub fn restore_snapshot(json: &str) -> Result<MatchState, SnapshotError> {
    let state = decode_snapshot(json)?;
    try_validate_invariants(&state)?;
    Ok(state)
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

/// Write the encoded state to `path`, creating parent directories.
pub fn export_snapshot_to_file(state: &MatchState, path: &Path) -> Result<(), SnapshotError> {
    let json = encode_snapshot(state)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json.as_bytes())?;
    tracing::debug!(path = %path.display(), bytes = json.len(), "snapshot exported");
    Ok(())
}

pub fn import_snapshot_from_file(path: &Path) -> Result<MatchState, SnapshotError> {
    let content = fs::read_to_string(path)?;
    restore_snapshot(&content)
}

// ---------------------------------------------------------------------------
// Hash
// ---------------------------------------------------------------------------

/// SHA-256 of the encoded snapshot, for checking a stored file is intact.
/// Not the same value as `canonical_hash`.
pub fn snapshot_hash(state: &MatchState) -> Result<String, SnapshotError> {
    let json = encode_snapshot(state)?;
    let digest = Sha256::digest(json.as_bytes());
    Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}
