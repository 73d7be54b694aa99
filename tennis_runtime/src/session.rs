//! Match sessions: single-writer ownership of one live match.
//!
//! Every applied command bumps `version`, undo included, so a version number
//! is never reused. Writers that computed a command against an older version
//! are rejected by `apply_expected`.
//!
//! Concurrency: `SharedSession` serializes writers with a Mutex. No global
//! mutable state.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use thiserror::Error;

use tennis_engine::config::MatchConfig;
use tennis_engine::domain::MatchState;
use tennis_engine::error::ConfigError;
use tennis_engine::hashing::canonical_hash;
use tennis_engine::state::initialize_match_at;

use crate::command::{apply_command, ScoreCommand};
use crate::projection::{summary_due, LiveMatchSummary, RealtimeProjection};
use crate::snapshot_codec::{encode_snapshot, restore_snapshot, SnapshotError};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("stale write: expected version {expected}, session is at {actual}")]
    StaleVersion { expected: u64, actual: u64 },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("session lock poisoned")]
    LockPoisoned,
}

/// What a successful write produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub version: u64,
    pub realtime: RealtimeProjection,
    /// Present only when the summary document needs rewriting.
    pub summary: Option<LiveMatchSummary>,
}

pub struct MatchSession {
    match_id: String,
    state: MatchState,
    version: u64,
}

impl MatchSession {
    pub fn new(match_id: &str, config: MatchConfig) -> Result<Self, SessionError> {
        Self::new_at(match_id, config, Utc::now())
    }

    pub fn new_at(
        match_id: &str,
        config: MatchConfig,
        now: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        let state = initialize_match_at(config, now)?;
        tracing::info!(match_id, "session opened");
        Ok(Self {
            match_id: match_id.to_string(),
            state,
            version: 0,
        })
    }

    /// Resume from an encoded snapshot. The version restarts at 0.
    pub fn from_snapshot(match_id: &str, json: &str) -> Result<Self, SessionError> {
        let state = restore_snapshot(json)?;
        tracing::info!(match_id, events = state.history.len(), "session restored from snapshot");
        Ok(Self {
            match_id: match_id.to_string(),
            state,
            version: 0,
        })
    }

    pub fn apply(&mut self, command: &ScoreCommand) -> Result<Applied, SessionError> {
        self.apply_at(command, Utc::now())
    }

    pub fn apply_at(
        &mut self,
        command: &ScoreCommand,
        now: DateTime<Utc>,
    ) -> Result<Applied, SessionError> {
        // Scoring first; the version only moves once the kernel accepted it.
        self.state = apply_command(&self.state, command, now)?;
        self.state.clock.tick(now);
        self.version += 1;

        tracing::debug!(
            match_id = %self.match_id,
            command = command.name(),
            version = self.version,
            points = %self.state.points,
            "command applied"
        );
        Ok(self.publish(now))
    }

    /// Compare-and-swap write: apply only if nobody wrote since `expected`.
    pub fn apply_expected(
        &mut self,
        expected: u64,
        command: &ScoreCommand,
        now: DateTime<Utc>,
    ) -> Result<Applied, SessionError> {
        if expected != self.version {
            tracing::warn!(
                match_id = %self.match_id,
                expected,
                actual = self.version,
                command = command.name(),
                "stale write rejected"
            );
            return Err(SessionError::StaleVersion {
                expected,
                actual: self.version,
            });
        }
        self.apply_at(command, now)
    }

    /// New match, same rules. Keeps nothing of the old clock.
    pub fn reset(&mut self, now: DateTime<Utc>) -> Result<Applied, SessionError> {
        self.state = initialize_match_at(self.state.config.clone(), now)?;
        self.version += 1;
        tracing::info!(match_id = %self.match_id, version = self.version, "match reset");
        Ok(self.publish(now))
    }

    pub fn pause(&mut self, now: DateTime<Utc>) {
        self.state.clock.pause(now);
    }

    pub fn resume(&mut self, now: DateTime<Utc>) {
        self.state.clock.resume(now);
    }

    pub fn tick(&mut self, now: DateTime<Utc>) {
        self.state.clock.tick(now);
    }

    pub fn summary(&self, now: DateTime<Utc>) -> LiveMatchSummary {
        LiveMatchSummary::from_state(&self.match_id, &self.state, now)
    }

    pub fn realtime(&self, now: DateTime<Utc>) -> RealtimeProjection {
        RealtimeProjection::from_state(&self.state, now)
    }

    pub fn export_snapshot(&self) -> Result<String, SessionError> {
        Ok(encode_snapshot(&self.state)?)
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn match_id(&self) -> &str {
        &self.match_id
    }

    pub fn current_hash(&self) -> String {
        canonical_hash(&self.state)
    }

    fn publish(&self, now: DateTime<Utc>) -> Applied {
        let summary = summary_due(&self.state).then(|| self.summary(now));
        Applied {
            version: self.version,
            realtime: self.realtime(now),
            summary,
        }
    }
}

/// Thread-safe session handle.
pub struct SharedSession {
    inner: Mutex<MatchSession>,
}

impl SharedSession {
    pub fn new(session: MatchSession) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }

    pub fn apply(&self, command: &ScoreCommand) -> Result<Applied, SessionError> {
        let mut session = self.inner.lock().map_err(|_| SessionError::LockPoisoned)?;
        session.apply(command)
    }

    pub fn apply_expected(
        &self,
        expected: u64,
        command: &ScoreCommand,
    ) -> Result<Applied, SessionError> {
        let mut session = self.inner.lock().map_err(|_| SessionError::LockPoisoned)?;
        session.apply_expected(expected, command, Utc::now())
    }

    pub fn version(&self) -> Result<u64, SessionError> {
        let session = self.inner.lock().map_err(|_| SessionError::LockPoisoned)?;
        Ok(session.version())
    }

    pub fn current_hash(&self) -> Result<String, SessionError> {
        let session = self.inner.lock().map_err(|_| SessionError::LockPoisoned)?;
        Ok(session.current_hash())
    }

    pub fn summary(&self) -> Result<LiveMatchSummary, SessionError> {
        let session = self.inner.lock().map_err(|_| SessionError::LockPoisoned)?;
        Ok(session.summary(Utc::now()))
    }
}
