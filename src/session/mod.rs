//! Play sessions: level progression, wildcard unlocks, records, custom matches.

pub mod controller;
pub mod progress;

pub use controller::{LevelResult, LocalMatches, MatchFactory, SessionController, SessionError};
pub use progress::{MemoryStore, Progress, ProgressStore, Record, StoreError};
