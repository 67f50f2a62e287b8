//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use lunar_match::board::BoardState;
use lunar_match::turns::PlacementRequest;
use lunar_match::{
    BoardEngine, Cue, Decision, DecisionFuture, EngineError, HumanAction, InputSource, Layout, LocalBoard, MatchError,
    PatternBatch, Phase, Presenter, Side, SideMap, SlotGraph, SlotId, TurnEvent, WildcardId,
};

/// `LocalBoard` that counts board and pattern-batch releases.
#[derive(Clone, Default)]
pub struct CountingEngine {
    inner: LocalBoard,
    pub releases: Arc<AtomicUsize>,
    pub batch_releases: Arc<AtomicUsize>,
    pub requests: Arc<AtomicUsize>,
}

impl CountingEngine {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: LocalBoard::new(seed),
            ..Self::default()
        }
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn batch_releases(&self) -> usize {
        self.batch_releases.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl BoardEngine for CountingEngine {
    type Board = BoardState;

    fn init_board(&mut self, layout: Layout) -> Result<(BoardState, SlotGraph), EngineError> {
        self.inner.init_board(layout)
    }

    fn place_card(
        &mut self,
        board: &mut BoardState,
        slot: SlotId,
        phase: Phase,
        side: Side,
    ) -> Result<PatternBatch, EngineError> {
        let batch = self.inner.place_card(board, slot, phase, side)?;
        let counter = self.batch_releases.clone();
        Ok(batch.with_release(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }))
    }

    fn destroy_card(&mut self, board: &mut BoardState, slot: SlotId) -> Result<(), EngineError> {
        self.inner.destroy_card(board, slot)
    }

    fn change_slot_owner(&mut self, board: &mut BoardState, slot: SlotId, side: Side) -> Result<(), EngineError> {
        self.inner.change_slot_owner(board, slot, side)
    }

    fn request_opponent_move(&self, board: &BoardState, hand: &[Phase], depth: i32) -> DecisionFuture {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.inner.request_opponent_move(board, hand, depth)
    }

    fn release_board(&mut self, board: BoardState) {
        self.releases.fetch_add(1, Ordering::SeqCst);
        self.inner.release_board(board);
    }
}

/// Presenter that records every cue it runs.
#[derive(Clone, Default)]
pub struct Recorder {
    cues: Arc<Mutex<Vec<Cue>>>,
}

impl Recorder {
    pub fn cues(&self) -> Vec<Cue> {
        self.cues.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.cues()
            .into_iter()
            .filter_map(|cue| match cue {
                Cue::Message(text) => Some(text),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Presenter for Recorder {
    fn prepare(&self, _cue: &Cue) {}

    async fn run(&self, cue: &Cue) {
        self.cues.lock().unwrap().push(cue.clone());
    }
}

/// Input that never answers.
pub struct Pending;

#[async_trait]
impl InputSource for Pending {
    async fn next_action(&mut self, _request: &PlacementRequest) -> Result<HumanAction, MatchError> {
        futures::future::pending().await
    }

    async fn pick_slot(&mut self, _wildcard: WildcardId, _pool: &[SlotId]) -> Result<SlotId, MatchError> {
        futures::future::pending().await
    }
}

/// Input that always plays the first offered card on the first offered slot.
pub struct FirstLegal;

#[async_trait]
impl InputSource for FirstLegal {
    async fn next_action(&mut self, request: &PlacementRequest) -> Result<HumanAction, MatchError> {
        match (request.hand.first(), request.slots.first()) {
            (Some(&(card, _)), Some(&slot)) => Ok(HumanAction::Place { card, slot }),
            _ => Err(MatchError::InputClosed),
        }
    }

    async fn pick_slot(&mut self, _wildcard: WildcardId, pool: &[SlotId]) -> Result<SlotId, MatchError> {
        pool.first().copied().ok_or(MatchError::InputClosed)
    }
}

pub fn phases(values: &[u8]) -> Vec<Phase> {
    values.iter().map(|&v| Phase::new(v)).collect()
}

pub fn hands(user: &[u8], opponent: &[u8]) -> SideMap<Vec<Phase>> {
    SideMap::new(|side| match side {
        Side::User => phases(user),
        Side::Opponent => phases(opponent),
    })
}

pub fn place(card: usize, slot: u16) -> HumanAction {
    HumanAction::Place {
        card,
        slot: SlotId(slot),
    }
}

/// Opponent replies that always take the first remaining card.
pub fn replies(slots: &[u16]) -> Vec<Decision> {
    slots.iter().map(|&slot| Decision { card: 0, slot: SlotId(slot) }).collect()
}

/// Placements in log order as `(side, slot, extra)`.
pub fn placements(log: &[TurnEvent]) -> Vec<(Side, SlotId, bool)> {
    log.iter()
        .filter_map(|event| match *event {
            TurnEvent::Placed { side, slot, extra, .. } => Some((side, slot, extra)),
            _ => None,
        })
        .collect()
}

/// Consecutive placements by one side are only allowed around an extra placement.
pub fn assert_alternates(log: &[TurnEvent]) {
    let mut previous: Option<(Side, bool)> = None;
    for event in log {
        match *event {
            TurnEvent::Placed { side, extra, .. } => {
                if let Some((last, last_extra)) = previous {
                    assert!(
                        last != side || last_extra || extra,
                        "{} placed twice in a row without an extra placement: {:?}",
                        side,
                        log
                    );
                }
                previous = Some((side, extra));
            }
            TurnEvent::Skipped { .. } => previous = None,
            TurnEvent::Wildcard { .. } => {}
        }
    }
}
