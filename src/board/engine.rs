//! Board engine collaborator trait.
//!
//! The board engine owns board topology, card placement, pattern detection
//! and opponent move search. The orchestrator never interprets the board
//! itself: it calls into `BoardEngine` and consumes the results.
//!
//! ## Implementation Notes
//!
//! - `place_card`: returns every pattern the placement forms. It must not
//!   claim slots; ownership changes arrive through `change_slot_owner`.
//! - `request_opponent_move`: returns a `'static` future. The engine copies
//!   whatever board state it needs before returning, so the orchestrator can
//!   keep mutating the board while the search runs.
//! - `release_board`: consumes the handle. Called once per match.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::core::{EngineError, Phase, Side, SlotId};

use super::graph::{Layout, SlotGraph};
use super::pattern::PatternBatch;

/// An opponent move: which hand card (index into the phases passed to the
/// request) goes on which slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Decision {
    pub card: usize,
    pub slot: SlotId,
}

/// Pending opponent decision.
pub type DecisionFuture = BoxFuture<'static, Result<Decision, EngineError>>;

/// Board engine trait.
pub trait BoardEngine {
    /// Exclusively owned board handle.
    type Board;

    /// Create a board for a layout. Called once at match start.
    fn init_board(&mut self, layout: Layout) -> Result<(Self::Board, SlotGraph), EngineError>;

    /// Place a card and report the patterns it forms.
    fn place_card(
        &mut self,
        board: &mut Self::Board,
        slot: SlotId,
        phase: Phase,
        side: Side,
    ) -> Result<PatternBatch, EngineError>;

    /// Remove the card on a slot.
    fn destroy_card(&mut self, board: &mut Self::Board, slot: SlotId) -> Result<(), EngineError>;

    /// Reassign ownership of an occupied slot without placing a card.
    fn change_slot_owner(
        &mut self,
        board: &mut Self::Board,
        slot: SlotId,
        side: Side,
    ) -> Result<(), EngineError>;

    /// Start computing an opponent move for the given hand.
    ///
    /// `depth <= 0` requests the non-searching random policy.
    fn request_opponent_move(&self, board: &Self::Board, hand: &[Phase], depth: i32) -> DecisionFuture;

    /// Free the board.
    fn release_board(&mut self, board: Self::Board);
}
