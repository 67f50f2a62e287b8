//! Opponent decisions.
//!
//! ## DecisionSource
//!
//! Produces the opponent's next move as a `DecisionFuture`.
//! `EngineDecisions` asks the board engine, with the Weak tier's coin flip
//! in front of it. `ScriptedDecisions` replays fixed moves for tutorials.
//!
//! ## OpponentPipeline
//!
//! Holds at most one in-flight decision, spawned onto the runtime so it
//! keeps computing while the match awaits presentation. A new request is
//! refused while the previous one is unconsumed. The task is aborted when
//! the pipeline is dropped or `abort`ed.

use std::collections::VecDeque;

use futures::future::{ready, FutureExt};
use tokio::task::JoinHandle;

use crate::board::{BoardEngine, Decision, DecisionFuture};
use crate::core::{CancelToken, Difficulty, EngineError, GameRng, MatchError, Phase, SlotId};

/// Source of opponent moves.
pub trait DecisionSource<E: BoardEngine>: Send {
    /// Start computing a move. `hand` holds the opponent's available
    /// phases; `Decision::card` indexes into it. `open` lists free slots.
    fn request(&mut self, engine: &E, board: &E::Board, hand: &[Phase], open: &[SlotId]) -> DecisionFuture;
}

/// Decisions from the board engine's search.
#[derive(Clone, Debug)]
pub struct EngineDecisions {
    difficulty: Difficulty,
    depth: i32,
    rng: GameRng,
}

impl EngineDecisions {
    pub fn new(difficulty: Difficulty, depth: i32, rng: GameRng) -> Self {
        Self { difficulty, depth, rng }
    }
}

impl<E: BoardEngine> DecisionSource<E> for EngineDecisions {
    fn request(&mut self, engine: &E, board: &E::Board, hand: &[Phase], open: &[SlotId]) -> DecisionFuture {
        if self.difficulty.is_weak() && !self.rng.coin() {
            let decision = match (hand.is_empty(), self.rng.choose(open)) {
                (false, Some(&slot)) => Ok(Decision {
                    card: self.rng.gen_range_usize(0..hand.len()),
                    slot,
                }),
                _ => Err(EngineError::new("request_opponent_move", "no legal move for random play")),
            };
            log::debug!("weak opponent lost the coin flip: {:?}", decision);
            return ready(decision).boxed();
        }
        engine.request_opponent_move(board, hand, self.depth)
    }
}

/// Fixed opponent moves. Fails once the script runs out.
#[derive(Clone, Debug, Default)]
pub struct ScriptedDecisions {
    moves: VecDeque<Decision>,
}

impl ScriptedDecisions {
    #[must_use]
    pub fn new(moves: impl IntoIterator<Item = Decision>) -> Self {
        Self {
            moves: moves.into_iter().collect(),
        }
    }
}

impl<E: BoardEngine> DecisionSource<E> for ScriptedDecisions {
    fn request(&mut self, _engine: &E, _board: &E::Board, _hand: &[Phase], _open: &[SlotId]) -> DecisionFuture {
        let next = self
            .moves
            .pop_front()
            .ok_or_else(|| EngineError::new("request_opponent_move", "scripted moves exhausted"));
        ready(next).boxed()
    }
}

/// At most one outstanding opponent decision.
#[derive(Debug, Default)]
pub struct OpponentPipeline {
    pending: Option<JoinHandle<Result<Decision, EngineError>>>,
    issued: u32,
    consumed: u32,
    peak: u32,
}

impl OpponentPipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a decision in the background.
    pub fn issue(&mut self, decision: DecisionFuture) -> Result<(), MatchError> {
        if self.pending.is_some() {
            log::error!("opponent decision requested while one is outstanding");
            return Err(MatchError::contract("opponent decision already outstanding"));
        }
        self.pending = Some(tokio::spawn(decision));
        self.issued += 1;
        self.peak = self.peak.max(self.outstanding());
        log::debug!("opponent decision #{} issued", self.issued);
        Ok(())
    }

    /// Whether a decision is in flight or resolved but unconsumed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Await the pending decision under the match token.
    ///
    /// Uses the already-resolved value when the task finished early.
    pub async fn take(&mut self, token: &CancelToken) -> Result<Decision, MatchError> {
        let Some(mut handle) = self.pending.take() else {
            return Err(MatchError::contract("no opponent decision to await"));
        };
        let joined = match token.guard(&mut handle).await {
            Ok(joined) => joined,
            Err(cancelled) => {
                handle.abort();
                return Err(cancelled);
            }
        };
        self.consumed += 1;
        match joined {
            Ok(result) => Ok(result?),
            Err(e) => Err(MatchError::contract(format!("opponent decision task failed: {}", e))),
        }
    }

    /// Abort the in-flight decision, if any.
    pub fn abort(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
            log::debug!("in-flight opponent decision aborted");
        }
    }

    #[must_use]
    pub fn issued(&self) -> u32 {
        self.issued
    }

    #[must_use]
    pub fn consumed(&self) -> u32 {
        self.consumed
    }

    /// Requests issued but not consumed (aborted ones included).
    #[must_use]
    pub fn outstanding(&self) -> u32 {
        self.issued - self.consumed
    }

    /// Highest number of simultaneously outstanding requests seen.
    #[must_use]
    pub fn peak(&self) -> u32 {
        self.peak
    }
}

impl Drop for OpponentPipeline {
    fn drop(&mut self) {
        self.abort();
    }
}
