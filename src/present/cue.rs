//! Presentation cues.
//!
//! A `Cue` is one visual change the match asks the presenter to show.
//! Cues that belong together (the two stars of a pair, a card sliding in
//! while it scales up) are played as one step and finish together.

use serde::{Deserialize, Serialize};

use crate::board::PatternKind;
use crate::core::{Phase, Side, SideMap, SlotId};

/// One presentable change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cue {
    /// A card moves from a hand to a slot.
    Place { side: Side, slot: SlotId, phase: Phase },
    /// A card is removed from the board.
    Destroy { slot: SlotId },
    /// A slot changes colour.
    Claim { side: Side, slot: SlotId },
    /// A pattern edge is drawn.
    Decorate { from: SlotId, to: SlotId, kind: PatternKind },
    /// A pattern edge is erased.
    Erase { from: SlotId, to: SlotId },
    /// A starred slot awards one point.
    Star { side: Side, slot: SlotId },
    /// Extra points, shown separately from stars.
    Bonus { side: Side, points: u32 },
    /// Score display update.
    Score { scores: SideMap<u32> },
    /// Informational text.
    Message(String),
}

/// Timing class of a cue, mapped to a `PresentationConfig` duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Pace {
    Instant,
    Star,
    Step,
    Bonus,
    Message,
}

impl Cue {
    #[must_use]
    pub fn pace(&self) -> Pace {
        match self {
            Cue::Place { .. } | Cue::Destroy { .. } | Cue::Claim { .. } => Pace::Step,
            Cue::Decorate { .. } | Cue::Erase { .. } | Cue::Score { .. } => Pace::Instant,
            Cue::Star { .. } => Pace::Star,
            Cue::Bonus { .. } => Pace::Bonus,
            Cue::Message(_) => Pace::Message,
        }
    }

    pub fn message(text: impl Into<String>) -> Self {
        Cue::Message(text.into())
    }
}

impl std::fmt::Display for Cue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cue::Place { side, slot, phase } => write!(f, "{} places {} on {}", side, phase, slot),
            Cue::Destroy { slot } => write!(f, "card on {} destroyed", slot),
            Cue::Claim { side, slot } => write!(f, "{} claims {}", side, slot),
            Cue::Decorate { from, to, kind } => write!(f, "{:?} edge {} - {}", kind, from, to),
            Cue::Erase { from, to } => write!(f, "edge {} - {} erased", from, to),
            Cue::Star { side, slot } => write!(f, "{} scores a star on {}", side, slot),
            Cue::Bonus { side, points } => write!(f, "{} bonus +{}", side, points),
            Cue::Score { scores } => {
                write!(f, "score {} : {}", scores[Side::User], scores[Side::Opponent])
            }
            Cue::Message(text) => f.write_str(text),
        }
    }
}
