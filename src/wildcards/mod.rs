//! Wildcards: the catalog, the per-match deck, and execution.

pub mod catalog;
pub mod engine;

pub use catalog::{WildcardDeck, WildcardId, WildcardKind};
pub use engine::{play, WildcardOutcome};
