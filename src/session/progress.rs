//! Persisted session progress.
//!
//! The session reads `Progress` once when it starts and writes it back when
//! a level completes with something new to keep. How and where it is stored
//! belongs to the `ProgressStore` implementation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::wildcards::WildcardId;

/// Best run so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub score: u32,
    pub level: u32,
}

impl Record {
    /// Whether `self` beats `other`: a higher score, or the same score at a
    /// higher level.
    #[must_use]
    pub fn beats(&self, other: &Record) -> bool {
        (self.score, self.level) > (other.score, other.level)
    }
}

/// Everything a session persists.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub best: Record,
    pub unlocked: BTreeSet<WildcardId>,
}

/// Failure reading or writing progress.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "progress store: {}", self.message)
    }
}

impl std::error::Error for StoreError {}

/// Where progress lives between sessions.
pub trait ProgressStore {
    fn load(&mut self) -> Result<Progress, StoreError>;
    fn save(&mut self, progress: &Progress) -> Result<(), StoreError>;
}

/// In-memory store. Counts saves so callers can check write discipline.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    progress: Progress,
    saves: u32,
}

impl MemoryStore {
    #[must_use]
    pub fn new(progress: Progress) -> Self {
        Self { progress, saves: 0 }
    }

    #[must_use]
    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    #[must_use]
    pub fn saves(&self) -> u32 {
        self.saves
    }
}

impl ProgressStore for MemoryStore {
    fn load(&mut self) -> Result<Progress, StoreError> {
        Ok(self.progress.clone())
    }

    fn save(&mut self, progress: &Progress) -> Result<(), StoreError> {
        self.progress = progress.clone();
        self.saves += 1;
        Ok(())
    }
}
