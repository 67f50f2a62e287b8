//! Human input.
//!
//! ## InputGate
//!
//! Publishes what the user may do right now as an `InputState` on a
//! `tokio::sync::watch` channel. Each transition is one send, so a UI never
//! observes a half-enabled state.
//!
//! ## InputSource
//!
//! Where human choices come from. The coordinator validates every action
//! against the current request and ignores invalid ones, so sources may
//! forward raw UI events.
//!
//! - `ChannelInput`: UI events over an `mpsc` channel
//! - `ScriptedInput`: a fixed action list, for tests and demos
//! - `SharedInput`: one source shared by consecutive matches

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch, Mutex};

use crate::core::{MatchError, Phase, SlotId};
use crate::wildcards::WildcardId;

/// A human turn action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HumanAction {
    /// Place hand card `card` on `slot`.
    Place { card: usize, slot: SlotId },
    /// Play a wildcard before placing.
    UseWildcard(WildcardId),
}

/// What the user is currently allowed to do.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputState {
    #[default]
    Disabled,
    /// Waiting for a placement (or a wildcard).
    Placement {
        hand: Vec<(usize, Phase)>,
        slots: Vec<SlotId>,
        wildcards: Vec<WildcardId>,
    },
    /// A wildcard waits for a slot pick. When `optional`, the user may
    /// finish the selection instead.
    Selecting {
        wildcard: WildcardId,
        pool: Vec<SlotId>,
        optional: bool,
    },
}

/// Publishes input state to observers.
#[derive(Debug)]
pub struct InputGate {
    tx: watch::Sender<InputState>,
}

impl Default for InputGate {
    fn default() -> Self {
        Self::new()
    }
}

impl InputGate {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(InputState::Disabled);
        Self { tx }
    }

    /// Observe state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<InputState> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn current(&self) -> InputState {
        self.tx.borrow().clone()
    }

    pub fn open(&self, state: InputState) {
        self.tx.send_replace(state);
    }

    pub fn disable(&self) {
        self.tx.send_replace(InputState::Disabled);
    }
}

/// What the coordinator offers the user on a placement wait.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacementRequest {
    pub hand: Vec<(usize, Phase)>,
    pub slots: Vec<SlotId>,
    pub wildcards: Vec<WildcardId>,
}

impl PlacementRequest {
    #[must_use]
    pub fn state(&self) -> InputState {
        InputState::Placement {
            hand: self.hand.clone(),
            slots: self.slots.clone(),
            wildcards: self.wildcards.clone(),
        }
    }
}

/// Source of human decisions.
#[async_trait]
pub trait InputSource: Send {
    /// Wait for the next turn action.
    async fn next_action(&mut self, request: &PlacementRequest) -> Result<HumanAction, MatchError>;

    /// Wait for a slot pick from `pool`.
    async fn pick_slot(&mut self, wildcard: WildcardId, pool: &[SlotId]) -> Result<SlotId, MatchError>;

    /// Wait for a further pick of a multi-slot selection, or `None` once the
    /// user finishes it. Sources without a way to finish keep picking.
    async fn pick_more(&mut self, wildcard: WildcardId, pool: &[SlotId]) -> Result<Option<SlotId>, MatchError> {
        self.pick_slot(wildcard, pool).await.map(Some)
    }
}

/// Raw UI event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiEvent {
    Place { card: usize, slot: SlotId },
    UseWildcard(WildcardId),
    PickSlot(SlotId),
    /// End a multi-slot selection early.
    FinishSelection,
}

/// Input fed by UI events.
#[derive(Debug)]
pub struct ChannelInput {
    rx: mpsc::Receiver<UiEvent>,
}

impl ChannelInput {
    /// Create a source and the sender the UI pushes events into.
    #[must_use]
    pub fn channel(capacity: usize) -> (mpsc::Sender<UiEvent>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self { rx })
    }

    async fn recv(&mut self) -> Result<UiEvent, MatchError> {
        self.rx.recv().await.ok_or(MatchError::InputClosed)
    }

    async fn select(
        &mut self,
        wildcard: WildcardId,
        pool: &[SlotId],
        optional: bool,
    ) -> Result<Option<SlotId>, MatchError> {
        loop {
            match self.recv().await? {
                UiEvent::PickSlot(slot) if pool.contains(&slot) => return Ok(Some(slot)),
                UiEvent::PickSlot(slot) => log::warn!("{} is not selectable for {}", slot, wildcard),
                UiEvent::FinishSelection if optional => return Ok(None),
                other => log::warn!("ignoring {:?} while {} waits for a slot", other, wildcard),
            }
        }
    }
}

#[async_trait]
impl InputSource for ChannelInput {
    async fn next_action(&mut self, _request: &PlacementRequest) -> Result<HumanAction, MatchError> {
        loop {
            match self.recv().await? {
                UiEvent::Place { card, slot } => return Ok(HumanAction::Place { card, slot }),
                UiEvent::UseWildcard(id) => return Ok(HumanAction::UseWildcard(id)),
                UiEvent::PickSlot(slot) => log::warn!("ignoring pick of {} outside a selection", slot),
                UiEvent::FinishSelection => log::warn!("ignoring finish outside a selection"),
            }
        }
    }

    async fn pick_slot(&mut self, wildcard: WildcardId, pool: &[SlotId]) -> Result<SlotId, MatchError> {
        match self.select(wildcard, pool, false).await? {
            Some(slot) => Ok(slot),
            None => Err(MatchError::contract("required pick finished early")),
        }
    }

    async fn pick_more(&mut self, wildcard: WildcardId, pool: &[SlotId]) -> Result<Option<SlotId>, MatchError> {
        self.select(wildcard, pool, true).await
    }
}

/// Input replaying fixed actions and picks. Reports `InputClosed` when a
/// list runs out, except that running out of picks mid-selection finishes
/// the selection.
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    actions: VecDeque<HumanAction>,
    picks: VecDeque<SlotId>,
}

impl ScriptedInput {
    #[must_use]
    pub fn new(actions: impl IntoIterator<Item = HumanAction>) -> Self {
        Self {
            actions: actions.into_iter().collect(),
            picks: VecDeque::new(),
        }
    }

    #[must_use]
    pub fn with_picks(mut self, picks: impl IntoIterator<Item = SlotId>) -> Self {
        self.picks = picks.into_iter().collect();
        self
    }

    /// Actions not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.actions.len()
    }
}

#[async_trait]
impl InputSource for ScriptedInput {
    async fn next_action(&mut self, _request: &PlacementRequest) -> Result<HumanAction, MatchError> {
        self.actions.pop_front().ok_or(MatchError::InputClosed)
    }

    async fn pick_slot(&mut self, _wildcard: WildcardId, _pool: &[SlotId]) -> Result<SlotId, MatchError> {
        self.picks.pop_front().ok_or(MatchError::InputClosed)
    }

    async fn pick_more(&mut self, _wildcard: WildcardId, _pool: &[SlotId]) -> Result<Option<SlotId>, MatchError> {
        Ok(self.picks.pop_front())
    }
}

/// An input source shared across matches, one match at a time.
#[derive(Clone)]
pub struct SharedInput {
    inner: Arc<Mutex<Box<dyn InputSource>>>,
}

impl SharedInput {
    pub fn new(source: impl InputSource + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(source))),
        }
    }
}

#[async_trait]
impl InputSource for SharedInput {
    async fn next_action(&mut self, request: &PlacementRequest) -> Result<HumanAction, MatchError> {
        self.inner.lock().await.next_action(request).await
    }

    async fn pick_slot(&mut self, wildcard: WildcardId, pool: &[SlotId]) -> Result<SlotId, MatchError> {
        self.inner.lock().await.pick_slot(wildcard, pool).await
    }

    async fn pick_more(&mut self, wildcard: WildcardId, pool: &[SlotId]) -> Result<Option<SlotId>, MatchError> {
        self.inner.lock().await.pick_more(wildcard, pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PlacementRequest {
        PlacementRequest {
            hand: vec![(0, Phase::new(1))],
            slots: vec![SlotId(0)],
            wildcards: vec![],
        }
    }

    #[tokio::test]
    async fn test_channel_input_skips_stray_picks() {
        let (tx, mut input) = ChannelInput::channel(8);
        tx.send(UiEvent::PickSlot(SlotId(3))).await.unwrap();
        tx.send(UiEvent::Place { card: 0, slot: SlotId(0) }).await.unwrap();

        let action = input.next_action(&request()).await.unwrap();
        assert_eq!(action, HumanAction::Place { card: 0, slot: SlotId(0) });
    }

    #[tokio::test]
    async fn test_channel_pick_ignores_outside_pool() {
        let (tx, mut input) = ChannelInput::channel(8);
        tx.send(UiEvent::PickSlot(SlotId(9))).await.unwrap();
        tx.send(UiEvent::UseWildcard(WildcardId::Leo)).await.unwrap();
        tx.send(UiEvent::PickSlot(SlotId(2))).await.unwrap();

        let pick = input.pick_slot(WildcardId::Leo, &[SlotId(1), SlotId(2)]).await.unwrap();
        assert_eq!(pick, SlotId(2));
    }

    #[tokio::test]
    async fn test_channel_finish_only_ends_optional_picks() {
        let (tx, mut input) = ChannelInput::channel(8);
        let pool = [SlotId(1), SlotId(2)];
        tx.send(UiEvent::FinishSelection).await.unwrap();
        tx.send(UiEvent::PickSlot(SlotId(1))).await.unwrap();
        tx.send(UiEvent::FinishSelection).await.unwrap();

        // The first pick is required, so the early finish is skipped.
        assert_eq!(input.pick_slot(WildcardId::Gemini, &pool).await, Ok(SlotId(1)));
        assert_eq!(input.pick_more(WildcardId::Gemini, &pool).await, Ok(None));
    }

    #[tokio::test]
    async fn test_channel_closed() {
        let (tx, mut input) = ChannelInput::channel(1);
        drop(tx);
        assert_eq!(input.next_action(&request()).await, Err(MatchError::InputClosed));
    }

    #[tokio::test]
    async fn test_scripted_input_runs_out() {
        let mut input = ScriptedInput::new([HumanAction::UseWildcard(WildcardId::Aries)]);
        assert!(input.next_action(&request()).await.is_ok());
        assert_eq!(input.remaining(), 0);
        assert_eq!(input.next_action(&request()).await, Err(MatchError::InputClosed));
    }

    #[test]
    fn test_gate_transitions() {
        let gate = InputGate::new();
        let rx = gate.subscribe();
        gate.open(request().state());
        assert!(matches!(*rx.borrow(), InputState::Placement { .. }));
        gate.disable();
        assert_eq!(gate.current(), InputState::Disabled);
    }
}
