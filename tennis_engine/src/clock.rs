//! Elapsed-time bookkeeping carried inside `MatchState`.
//!
//! Hosts feed wall-clock instants in. Scoring never reads any of this.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchClock {
    pub start_time: Option<DateTime<Utc>>,
    /// Seconds accumulated up to `running_since`.
    pub duration_seconds: u64,
    pub is_paused: bool,
    /// Start of the current running segment; `None` while paused.
    pub running_since: Option<DateTime<Utc>>,
}

impl MatchClock {
    /// A clock that starts running at `now`.
    pub fn started_at(now: DateTime<Utc>) -> Self {
        Self::resumed_from(Some(now))
    }

    /// Fresh clock that keeps an existing start instant and counts from it.
    pub fn resumed_from(start_time: Option<DateTime<Utc>>) -> Self {
        Self {
            start_time,
            duration_seconds: 0,
            is_paused: false,
            running_since: start_time,
        }
    }

    /// Total elapsed seconds as of `now`, excluding paused stretches.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> u64 {
        match (self.is_paused, self.running_since) {
            (false, Some(since)) => {
                let running = (now - since).num_seconds().max(0) as u64;
                self.duration_seconds + running
            }
            _ => self.duration_seconds,
        }
    }

    /// Fold the running segment into `duration_seconds`.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if self.is_paused {
            return;
        }
        self.duration_seconds = self.elapsed_seconds(now);
        self.running_since = Some(now);
    }

    pub fn pause(&mut self, now: DateTime<Utc>) {
        if self.is_paused {
            return;
        }
        self.duration_seconds = self.elapsed_seconds(now);
        self.is_paused = true;
        self.running_since = None;
    }

    pub fn resume(&mut self, now: DateTime<Utc>) {
        if !self.is_paused {
            return;
        }
        self.is_paused = false;
        self.running_since = Some(now);
        if self.start_time.is_none() {
            self.start_time = Some(now);
        }
    }
}
