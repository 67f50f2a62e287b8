//! The table a match is played on.
//!
//! `Table` bundles everything a match mutates: the board engine and its
//! exclusively owned board handle, the orchestrator's `MatchState` mirror,
//! the presentation stage, the match RNG and the cancellation token. Turn,
//! scoring and wildcard code all act through it, so every engine mutation
//! is mirrored in the same place.
//!
//! ## Board release
//!
//! The handle sits in an `Option` and `release` takes it, so the engine's
//! `release_board` runs at most once. `Drop` releases a handle that is still
//! held, which covers a match future dropped mid-await.

use crate::board::{BoardEngine, PatternBatch, SlotGraph};
use crate::core::{CancelToken, GameRng, MatchError, MatchState, Phase, Side, SlotId};
use crate::present::{Cue, Stage};

pub struct Table<E: BoardEngine> {
    pub(crate) engine: E,
    board: Option<E::Board>,
    graph: SlotGraph,
    pub state: MatchState,
    pub stage: Stage,
    pub rng: GameRng,
    releases: u32,
}

impl<E: BoardEngine> Table<E> {
    pub fn new(engine: E, board: E::Board, graph: SlotGraph, state: MatchState, stage: Stage, rng: GameRng) -> Self {
        Self {
            engine,
            board: Some(board),
            graph,
            state,
            stage,
            rng,
            releases: 0,
        }
    }

    #[must_use]
    pub fn graph(&self) -> &SlotGraph {
        &self.graph
    }

    #[must_use]
    pub fn token(&self) -> &CancelToken {
        self.stage.token()
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The live board handle.
    pub fn board(&self) -> Result<&E::Board, MatchError> {
        self.board
            .as_ref()
            .ok_or_else(|| MatchError::contract("board used after release"))
    }

    fn parts(&mut self) -> Result<(&mut E, &mut E::Board), MatchError> {
        match self.board.as_mut() {
            Some(board) => Ok((&mut self.engine, board)),
            None => Err(MatchError::contract("board used after release")),
        }
    }

    /// Place a card on the board and mirror it.
    ///
    /// The returned batch must be handed to the pattern player (or dropped)
    /// before the next turn starts.
    pub fn place(&mut self, slot: SlotId, phase: Phase, side: Side) -> Result<PatternBatch, MatchError> {
        if !self.state.is_open(slot) {
            return Err(MatchError::contract(format!("{} placed on unavailable {}", side, slot)));
        }
        let (engine, board) = self.parts()?;
        let batch = engine.place_card(board, slot, phase, side)?;
        self.state.record_placement(slot, phase)?;
        log::debug!("{} placed {} on {} ({} patterns)", side, phase, slot, batch.len());
        Ok(batch)
    }

    /// Give a slot to a side.
    pub fn claim(&mut self, slot: SlotId, side: Side) -> Result<(), MatchError> {
        let (engine, board) = self.parts()?;
        engine.change_slot_owner(board, slot, side)?;
        self.state.record_claim(slot, side)
    }

    /// Destroy the card on a slot.
    ///
    /// Decoration edges touching the slot are erased first, then the engine
    /// removes the card and the mirror frees the slot.
    pub async fn destroy(&mut self, slot: SlotId) -> Result<(), MatchError> {
        let edges = self.state.take_decorations(slot);
        if !edges.is_empty() {
            let cues = edges
                .iter()
                .map(|edge| Cue::Erase {
                    from: edge.from,
                    to: edge.to,
                })
                .collect();
            self.stage.play(cues).await?;
        }

        let (engine, board) = self.parts()?;
        engine.destroy_card(board, slot)?;
        self.state.record_destruction(slot)?;
        log::debug!("destroyed card on {}", slot);
        self.stage.show(Cue::Destroy { slot }).await
    }

    /// Release the board. Returns `false` if it was already released.
    pub fn release(&mut self) -> bool {
        match self.board.take() {
            Some(board) => {
                self.engine.release_board(board);
                self.releases += 1;
                log::debug!("board released");
                true
            }
            None => false,
        }
    }

    /// Number of effective releases. Never exceeds one.
    #[must_use]
    pub fn releases(&self) -> u32 {
        self.releases
    }

    /// Push the current scores to the presenter.
    pub async fn show_scores(&self) -> Result<(), MatchError> {
        self.stage
            .show(Cue::Score {
                scores: self.state.scores.clone(),
            })
            .await
    }
}

impl<E: BoardEngine> Drop for Table<E> {
    fn drop(&mut self) {
        if self.release() {
            log::debug!("board released on drop");
        }
    }
}
