//! Board engine: topology, placement, pattern detection, opponent search.
//!
//! The match orchestrator talks to the board only through `BoardEngine`.
//! `LocalBoard` is the in-process implementation used by the binary and
//! the tests.

pub mod engine;
pub mod graph;
pub mod local;
pub mod pattern;
pub mod search;

pub use engine::{BoardEngine, Decision, DecisionFuture};
pub use graph::{Layout, Neighbours, SlotGraph};
pub use local::{base_stars, BoardState, LocalBoard};
pub use pattern::{
    Chain, Pattern, PatternBatch, PatternKind, RawPattern, MIN_LUNAR_CYCLE_LEN, TAG_FULL_MOON_PAIR,
    TAG_LUNAR_CYCLE, TAG_PHASE_PAIR,
};
