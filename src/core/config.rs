//! Configuration types.
//!
//! - `MatchConfig`: board, opponent strength, hands, first mover
//! - `PresentationConfig`: how long presentation waits last
//! - `SessionConfig`: level thresholds and unlock pacing for progression
//!
//! All configs are plain serde structs with `Default` and `with_*` builders.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::side::Side;
use crate::board::Layout;

/// Opponent strength tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    /// Searches only on a winning coin flip, otherwise plays randomly.
    Weak,
    Normal,
    Strong,
    Expert,
}

impl Difficulty {
    /// Search depth handed to the board engine.
    #[must_use]
    pub const fn search_depth(self) -> i32 {
        match self {
            Difficulty::Weak | Difficulty::Normal => 1,
            Difficulty::Strong => 2,
            Difficulty::Expert => 3,
        }
    }

    /// Whether this tier uses the coin-flip degraded mode.
    #[must_use]
    pub const fn is_weak(self) -> bool {
        matches!(self, Difficulty::Weak)
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Difficulty::Weak => "weak",
            Difficulty::Normal => "normal",
            Difficulty::Strong => "strong",
            Difficulty::Expert => "expert",
        };
        f.write_str(name)
    }
}

/// Configuration for a single match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Board layout to initialise.
    pub layout: Layout,

    /// Opponent strength tier.
    pub difficulty: Difficulty,

    /// Overrides the tier's search depth when set. Depth <= 0 asks the
    /// engine for its non-searching random policy.
    pub search_depth: Option<i32>,

    /// Cards per hand.
    pub hand_size: usize,

    /// Replace each placed card with a freshly dealt one.
    pub refill_hands: bool,

    /// Side that places the first card.
    pub first_mover: Side,

    /// Seed for dealing and every other random decision in the match.
    pub seed: u64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            layout: Layout::Grid3,
            difficulty: Difficulty::Normal,
            search_depth: None,
            hand_size: 4,
            refill_hands: true,
            first_mover: Side::User,
            seed: 42,
        }
    }
}

impl MatchConfig {
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_search_depth(mut self, depth: i32) -> Self {
        self.search_depth = Some(depth);
        self
    }

    pub fn with_hand_size(mut self, size: usize) -> Self {
        self.hand_size = size;
        self
    }

    pub fn with_refill(mut self, refill: bool) -> Self {
        self.refill_hands = refill;
        self
    }

    pub fn with_first_mover(mut self, side: Side) -> Self {
        self.first_mover = side;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Effective search depth for opponent requests.
    #[must_use]
    pub fn depth(&self) -> i32 {
        self.search_depth.unwrap_or_else(|| self.difficulty.search_depth())
    }
}

/// Presentation timings, in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationConfig {
    /// Pause after each animated step.
    pub step_ms: u64,
    /// Pause between stars of a sequential reveal.
    pub star_ms: u64,
    /// How long an informational message stays up.
    pub message_ms: u64,
    /// Pause after a bonus award.
    pub bonus_ms: u64,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            step_ms: 250,
            star_ms: 150,
            message_ms: 1200,
            bonus_ms: 400,
        }
    }
}

impl PresentationConfig {
    /// No pauses at all. Used by tests and headless runs.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            step_ms: 0,
            star_ms: 0,
            message_ms: 0,
            bonus_ms: 0,
        }
    }

    #[must_use]
    pub fn step(&self) -> Duration {
        Duration::from_millis(self.step_ms)
    }

    #[must_use]
    pub fn star(&self) -> Duration {
        Duration::from_millis(self.star_ms)
    }

    #[must_use]
    pub fn message(&self) -> Duration {
        Duration::from_millis(self.message_ms)
    }

    #[must_use]
    pub fn bonus(&self) -> Duration {
        Duration::from_millis(self.bonus_ms)
    }
}

/// Progression pacing for a play session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// `(first level, tier)` pairs in ascending level order. A level uses
    /// the tier of the last threshold it has reached.
    pub tier_thresholds: Vec<(u32, Difficulty)>,

    /// Board layouts, cycled through by level.
    pub layouts: Vec<Layout>,

    /// Consecutive wins needed per unlock while few wildcards are owned.
    pub early_unlock_wins: u32,

    /// Consecutive wins needed per unlock afterwards.
    pub later_unlock_wins: u32,

    /// Number of owned wildcards below which the early pace applies.
    pub early_unlock_count: usize,

    /// Cards per hand in progression matches.
    pub hand_size: usize,

    /// Base seed; each level derives its own.
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tier_thresholds: vec![
                (1, Difficulty::Weak),
                (3, Difficulty::Normal),
                (6, Difficulty::Strong),
                (10, Difficulty::Expert),
            ],
            layouts: vec![Layout::Grid3, Layout::Cross, Layout::Ring8, Layout::Hex7, Layout::Grid4],
            early_unlock_wins: 2,
            later_unlock_wins: 3,
            early_unlock_count: 4,
            hand_size: 4,
            seed: 42,
        }
    }
}

impl SessionConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_layouts(mut self, layouts: Vec<Layout>) -> Self {
        self.layouts = layouts;
        self
    }

    /// Opponent tier for a (1-based) level.
    #[must_use]
    pub fn tier_for(&self, level: u32) -> Difficulty {
        self.tier_thresholds
            .iter()
            .take_while(|(start, _)| *start <= level)
            .last()
            .map(|(_, tier)| *tier)
            .unwrap_or(Difficulty::Weak)
    }

    /// Board layout for a (1-based) level.
    #[must_use]
    pub fn layout_for(&self, level: u32) -> Layout {
        if self.layouts.is_empty() {
            return Layout::Grid3;
        }
        let index = (level.saturating_sub(1) as usize) % self.layouts.len();
        self.layouts[index]
    }

    /// Wins needed for the next unlock given how many wildcards are owned.
    #[must_use]
    pub fn wins_per_unlock(&self, owned: usize) -> u32 {
        if owned < self.early_unlock_count {
            self.early_unlock_wins
        } else {
            self.later_unlock_wins
        }
    }
}
