//! In-process board engine.
//!
//! `LocalBoard` implements `BoardEngine` entirely in Rust so matches can run
//! headless and in tests. Board state is held in `im` persistent vectors:
//! opponent searches take O(1) snapshots and run on the blocking pool while
//! the orchestrator keeps presenting the previous move.
//!
//! ## Pattern detection
//!
//! For a card placed on slot `s`:
//!
//! 1. Each occupied neighbour, in adjacency order, with the same phase forms
//!    a Phase Pair; with the opposite phase, a Full Moon Pair.
//! 2. Lunar Cycles: every maximal path of strictly decreasing phases ending
//!    at `s` is joined with every maximal path of increasing phases starting
//!    at `s`. The joined chain is cut at its first repeated slot and kept if
//!    it has at least three slots and no earlier chain covered the same set.

use std::sync::Arc;

use futures::FutureExt;
use rustc_hash::FxHashSet;

use crate::core::{EngineError, GameRng, Owner, Phase, Side, SlotData, SlotId};

use super::engine::{BoardEngine, Decision, DecisionFuture};
use super::graph::{Layout, SlotGraph};
use super::pattern::{PatternBatch, RawPattern, MIN_LUNAR_CYCLE_LEN, TAG_FULL_MOON_PAIR, TAG_LUNAR_CYCLE, TAG_PHASE_PAIR};
use super::search;

/// Board state with cheap snapshots.
#[derive(Clone, Debug)]
pub struct BoardState {
    graph: Arc<SlotGraph>,
    slots: im::Vector<SlotData>,
    occupied: usize,
    placements: u64,
}

impl BoardState {
    /// Create an empty board over a graph.
    #[must_use]
    pub fn new(graph: Arc<SlotGraph>) -> Self {
        let slots = (0..graph.len()).map(|_| SlotData::default()).collect();
        Self {
            graph,
            slots,
            occupied: 0,
            placements: 0,
        }
    }

    #[must_use]
    pub fn graph(&self) -> &SlotGraph {
        &self.graph
    }

    #[must_use]
    pub fn slot(&self, slot: SlotId) -> SlotData {
        self.slots[slot.index()]
    }

    #[must_use]
    pub fn occupied(&self) -> usize {
        self.occupied
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.occupied == self.slots.len()
    }

    /// Total placements ever made on this board (destruction does not rewind it).
    #[must_use]
    pub fn placements(&self) -> u64 {
        self.placements
    }

    /// Unoccupied slots in id order.
    #[must_use]
    pub fn open_slots(&self) -> Vec<SlotId> {
        self.graph
            .slots()
            .filter(|slot| self.slots[slot.index()].phase.is_none())
            .collect()
    }

    /// Count slots owned by a side.
    #[must_use]
    pub fn owned_by(&self, side: Side) -> usize {
        self.slots.iter().filter(|data| data.owner.is(side)).count()
    }

    fn check(&self, operation: &'static str, slot: SlotId) -> Result<(), EngineError> {
        if self.graph.contains(slot) {
            Ok(())
        } else {
            Err(EngineError::new(operation, format!("{} is not on the board", slot)))
        }
    }

    /// Put a card down and detect the patterns it forms.
    pub fn place(&mut self, slot: SlotId, phase: Phase) -> Result<Vec<RawPattern>, EngineError> {
        self.check("place_card", slot)?;
        if self.slots[slot.index()].phase.is_some() {
            return Err(EngineError::new("place_card", format!("{} is occupied", slot)));
        }
        self.slots.set(
            slot.index(),
            SlotData {
                phase: Some(phase),
                owner: Owner::Transient,
            },
        );
        self.occupied += 1;
        self.placements += 1;
        Ok(self.detect(slot))
    }

    /// Remove a card.
    pub fn remove(&mut self, slot: SlotId) -> Result<(), EngineError> {
        self.check("destroy_card", slot)?;
        if self.slots[slot.index()].phase.is_none() {
            return Err(EngineError::new("destroy_card", format!("{} is empty", slot)));
        }
        self.slots.set(slot.index(), SlotData::default());
        self.occupied -= 1;
        Ok(())
    }

    /// Reassign ownership of an occupied slot.
    pub fn set_owner(&mut self, slot: SlotId, side: Side) -> Result<(), EngineError> {
        self.check("change_slot_owner", slot)?;
        let mut data = self.slots[slot.index()];
        if data.phase.is_none() {
            return Err(EngineError::new("change_slot_owner", format!("{} is empty", slot)));
        }
        data.owner = side.into();
        self.slots.set(slot.index(), data);
        Ok(())
    }

    /// Patterns formed around an occupied slot.
    #[must_use]
    pub fn detect(&self, slot: SlotId) -> Vec<RawPattern> {
        let Some(phase) = self.slots[slot.index()].phase else {
            return Vec::new();
        };
        let mut patterns = Vec::new();
        for &other in self.graph.neighbours(slot) {
            match self.slots[other.index()].phase {
                Some(p) if p == phase => patterns.push(RawPattern::phase_pair(other)),
                Some(p) if p == phase.opposite() => patterns.push(RawPattern::full_moon_pair(other)),
                _ => {}
            }
        }
        patterns.extend(self.lunar_cycles(slot).into_iter().map(RawPattern::lunar_cycle));
        patterns
    }

    fn lunar_cycles(&self, origin: SlotId) -> Vec<Vec<SlotId>> {
        let backward = self.maximal_paths(origin, false);
        let forward = self.maximal_paths(origin, true);

        let mut seen: FxHashSet<Vec<SlotId>> = FxHashSet::default();
        let mut cycles = Vec::new();
        for back in &backward {
            for fwd in &forward {
                let mut chain: Vec<SlotId> = Vec::with_capacity(back.len() + fwd.len());
                let joined = back.iter().rev().chain(fwd.iter().skip(1));
                for &slot in joined {
                    if chain.contains(&slot) {
                        break;
                    }
                    chain.push(slot);
                }
                if chain.len() < MIN_LUNAR_CYCLE_LEN {
                    continue;
                }
                let mut key = chain.clone();
                key.sort_unstable();
                if seen.insert(key) {
                    cycles.push(chain);
                }
            }
        }
        cycles
    }

    /// Every maximal simple path starting at `origin` that steps to the next
    /// (or previous) phase at each hop. Always contains at least `[origin]`.
    fn maximal_paths(&self, origin: SlotId, forward: bool) -> Vec<Vec<SlotId>> {
        let mut paths = Vec::new();
        let mut stack = vec![origin];
        self.extend_path(&mut stack, forward, &mut paths);
        paths
    }

    fn extend_path(&self, stack: &mut Vec<SlotId>, forward: bool, out: &mut Vec<Vec<SlotId>>) {
        let Some(&current) = stack.last() else {
            return;
        };
        let Some(phase) = self.slots[current.index()].phase else {
            return;
        };
        let wanted = if forward { phase.next() } else { phase.prev() };
        let mut extended = false;
        for &next in self.graph.neighbours(current) {
            if self.slots[next.index()].phase != Some(wanted) || stack.contains(&next) {
                continue;
            }
            extended = true;
            stack.push(next);
            self.extend_path(stack, forward, out);
            stack.pop();
        }
        if !extended {
            out.push(stack.clone());
        }
    }
}

/// Stars a list of patterns is worth before perks: pair 1, full moon 2,
/// cycle one per slot.
#[must_use]
pub fn base_stars(patterns: &[RawPattern]) -> u32 {
    patterns
        .iter()
        .map(|p| match p.tag {
            TAG_PHASE_PAIR => 1,
            TAG_FULL_MOON_PAIR => 2,
            TAG_LUNAR_CYCLE => p.chain.len() as u32,
            _ => 0,
        })
        .sum()
}

/// In-process `BoardEngine`.
#[derive(Clone, Debug)]
pub struct LocalBoard {
    seed: u64,
}

impl LocalBoard {
    /// Create an engine. The seed drives the random policy and search tie-breaks.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Default for LocalBoard {
    fn default() -> Self {
        Self::new(42)
    }
}

impl BoardEngine for LocalBoard {
    type Board = BoardState;

    fn init_board(&mut self, layout: Layout) -> Result<(BoardState, SlotGraph), EngineError> {
        let graph = layout.graph();
        if graph.is_empty() {
            return Err(EngineError::new("init_board", format!("{} has no slots", layout)));
        }
        log::debug!("board initialised: {} ({} slots)", layout, graph.len());
        Ok((BoardState::new(Arc::new(graph.clone())), graph))
    }

    fn place_card(
        &mut self,
        board: &mut BoardState,
        slot: SlotId,
        phase: Phase,
        side: Side,
    ) -> Result<PatternBatch, EngineError> {
        let records = board.place(slot, phase)?;
        Ok(PatternBatch::new(slot, side, records))
    }

    fn destroy_card(&mut self, board: &mut BoardState, slot: SlotId) -> Result<(), EngineError> {
        board.remove(slot)
    }

    fn change_slot_owner(&mut self, board: &mut BoardState, slot: SlotId, side: Side) -> Result<(), EngineError> {
        board.set_owner(slot, side)
    }

    fn request_opponent_move(&self, board: &BoardState, hand: &[Phase], depth: i32) -> DecisionFuture {
        let snapshot = board.clone();
        let hand = hand.to_vec();
        let mut rng = GameRng::new(self.seed).for_context(&format!("search-{}", board.placements()));
        async move {
            tokio::task::spawn_blocking(move || search::choose(&snapshot, &hand, depth, &mut rng))
                .await
                .map_err(|e| EngineError::new("request_opponent_move", e.to_string()))?
        }
        .boxed()
    }

    fn release_board(&mut self, board: BoardState) {
        log::debug!("board released after {} placements", board.placements());
    }
}
