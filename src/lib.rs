//! # lunar-match
//!
//! Match orchestration for a two-player lunar-phase board card game: the
//! user against a computed opponent, placing phase cards on a graph-shaped
//! board where adjacent cards form scoring patterns.
//!
//! ## Design Principles
//!
//! 1. **Engine as a Collaborator**: Board topology, pattern detection and
//!    opponent search sit behind the `BoardEngine` trait. The orchestrator
//!    consumes results and keeps its own mirror in step.
//!
//! 2. **One Token per Match**: Every suspending operation (human input,
//!    presentation, opponent decisions, wildcard picks) races the match's
//!    `CancelToken`. Firing it unwinds the match and releases the board once.
//!
//! 3. **Overlap, Not Parallel State**: The opponent's next decision is
//!    requested as soon as the user's placement commits and computed in the
//!    background while that placement is presented. At most one request is
//!    outstanding.
//!
//! 4. **Strategies Over Subclasses**: Tutorials are ordinary matches with a
//!    different input / slot filter / decision triple.
//!
//! ## Modules
//!
//! - `core`: Phases, sides, RNG, configuration, errors, cancellation, match state
//! - `board`: Board engine trait, layouts, pattern records, in-process engine
//! - `scoring`: Perks and the pattern event player
//! - `present`: Presentation cues and the cancellable stage
//! - `turns`: Human input, slot filters, opponent decisions, turn coordinator
//! - `wildcards`: Wildcard catalog and execution
//! - `game`: Match controller and tutorials
//! - `session`: Level progression and persisted progress

pub mod board;
pub mod core;
pub mod game;
pub mod present;
pub mod scoring;
pub mod session;
pub mod turns;
pub mod wildcards;

// Re-export commonly used types
pub use crate::core::{
    CancelToken, Difficulty, EngineError, GameRng, MatchConfig, MatchError, MatchState, Owner, Phase,
    PresentationConfig, SessionConfig, Side, SideMap, SlotId, TurnEvent,
};

pub use crate::board::{
    BoardEngine, Decision, DecisionFuture, Layout, LocalBoard, Pattern, PatternBatch, PatternKind, RawPattern,
    SlotGraph,
};

pub use crate::scoring::{Perk, PerkSet};

pub use crate::present::{Cue, LogPresenter, Presenter, Stage};

pub use crate::turns::{
    AnySlot, ChannelInput, DecisionSource, HumanAction, InputSource, InputState, ScriptedDecisions, ScriptedInput,
    ScriptedSlots, SharedInput, SlotFilter, UiEvent,
};

pub use crate::wildcards::{WildcardDeck, WildcardId};

pub use crate::game::{Match, MatchBuilder, MatchEnd, MatchReport, MatchStrategy, Outcome, Tutorial};

pub use crate::session::{
    LevelResult, LocalMatches, MatchFactory, MemoryStore, Progress, ProgressStore, Record, SessionController,
    SessionError,
};
