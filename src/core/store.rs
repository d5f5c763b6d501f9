//! Store abstraction for karma state.
//!
//! This module provides the data model shared by every karma back-end: the
//! per-name record, the direction of a karma operation, and the `KarmaStore`
//! trait the interpreter is written against. Concrete stores live under
//! `plugins` (SQLite through the broker, and an in-memory fake).

use crate::core::error::KarmaError;
use serde::{Deserialize, Serialize};

/// Per-name karma counters. `net` is derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KarmaRecord {
    /// Normalized key (lowercase).
    pub name: String,
    pub positive_count: u64,
    pub negative_count: u64,
}

impl KarmaRecord {
    pub fn new(name: &str) -> Self {
        Self {
            name: normalize_key(name),
            positive_count: 0,
            negative_count: 0,
        }
    }

    pub fn net(&self) -> i64 {
        self.positive_count as i64 - self.negative_count as i64
    }

    /// Total number of karma events the name has received.
    pub fn interactions(&self) -> u64 {
        self.positive_count + self.negative_count
    }

    pub fn apply(&mut self, delta: Delta) {
        match delta {
            Delta::Plus => self.positive_count += 1,
            Delta::Minus => self.negative_count += 1,
        }
    }
}

/// Direction of a single karma operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Delta {
    Plus,
    Minus,
}

impl Delta {
    pub fn as_i64(self) -> i64 {
        match self {
            Delta::Plus => 1,
            Delta::Minus => -1,
        }
    }
}

/// Ordering key for leaderboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Ranking {
    Net,
    Positive,
    Negative,
}

impl Ranking {
    pub fn score(self, record: &KarmaRecord) -> i64 {
        match self {
            Ranking::Net => record.net(),
            Ranking::Positive => record.positive_count as i64,
            Ranking::Negative => record.negative_count as i64,
        }
    }
}

/// Store keys are lowercase so every lookup is case-insensitive.
pub fn normalize_key(name: &str) -> String {
    name.to_lowercase()
}

/// Durable mapping from normalized name to karma counters.
///
/// Rankings return the full ordered set, highest score first. Ties keep the
/// order in which names were first recorded.
pub trait KarmaStore {
    /// Create a zero record for `name` if absent. Idempotent.
    fn ensure(&self, name: &str) -> Result<(), KarmaError>;

    /// Apply `delta` to an existing record; `NotFound` when `ensure` never ran.
    fn increment(&self, name: &str, delta: Delta) -> Result<KarmaRecord, KarmaError>;

    /// Create-if-absent and increment as one atomic step.
    fn bump(&self, name: &str, delta: Delta) -> Result<KarmaRecord, KarmaError>;

    fn get(&self, name: &str) -> Result<Option<KarmaRecord>, KarmaError>;

    fn rank(&self, by: Ranking) -> Result<Vec<(String, i64)>, KarmaError>;

    fn rank_by_net(&self) -> Result<Vec<(String, i64)>, KarmaError> {
        self.rank(Ranking::Net)
    }

    fn rank_by_positive(&self) -> Result<Vec<(String, i64)>, KarmaError> {
        self.rank(Ranking::Positive)
    }

    fn rank_by_negative(&self) -> Result<Vec<(String, i64)>, KarmaError> {
        self.rank(Ranking::Negative)
    }
}

impl<S: KarmaStore + ?Sized> KarmaStore for &S {
    fn ensure(&self, name: &str) -> Result<(), KarmaError> {
        (**self).ensure(name)
    }
    fn increment(&self, name: &str, delta: Delta) -> Result<KarmaRecord, KarmaError> {
        (**self).increment(name, delta)
    }
    fn bump(&self, name: &str, delta: Delta) -> Result<KarmaRecord, KarmaError> {
        (**self).bump(name, delta)
    }
    fn get(&self, name: &str) -> Result<Option<KarmaRecord>, KarmaError> {
        (**self).get(name)
    }
    fn rank(&self, by: Ranking) -> Result<Vec<(String, i64)>, KarmaError> {
        (**self).rank(by)
    }
}

impl<S: KarmaStore + ?Sized> KarmaStore for Box<S> {
    fn ensure(&self, name: &str) -> Result<(), KarmaError> {
        (**self).ensure(name)
    }
    fn increment(&self, name: &str, delta: Delta) -> Result<KarmaRecord, KarmaError> {
        (**self).increment(name, delta)
    }
    fn bump(&self, name: &str, delta: Delta) -> Result<KarmaRecord, KarmaError> {
        (**self).bump(name, delta)
    }
    fn get(&self, name: &str) -> Result<Option<KarmaRecord>, KarmaError> {
        (**self).get(name)
    }
    fn rank(&self, by: Ranking) -> Result<Vec<(String, i64)>, KarmaError> {
        (**self).rank(by)
    }
}
