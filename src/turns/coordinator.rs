//! Turn coordinator.
//!
//! Runs one human turn or one opponent turn against a `Table`.
//!
//! ## Human turn
//!
//! 1. Open the gate with the legal placements and playable wildcards.
//! 2. Wait for an action. The gate is disabled as soon as one arrives.
//! 3. Invalid actions are logged and the wait starts over.
//! 4. A wildcard resolves, then the turn continues. Capricorn inserts an
//!    extra placement restricted to the freed slot.
//! 5. A placement commits to the engine, the opponent's next decision is
//!    requested in the background, and the patterns are presented.
//!
//! ## Opponent turn
//!
//! Uses the prefetched decision if one is pending, otherwise requests one
//! and waits for it. The decision is validated before it is applied.

use crate::board::{BoardEngine, Decision};
use crate::core::{MatchError, Side, SlotId, TurnEvent};
use crate::game::Table;
use crate::present::Cue;
use crate::scoring::play_batch;
use crate::wildcards::{self, WildcardId, WildcardOutcome};

use super::decisions::{DecisionSource, OpponentPipeline};
use super::filter::SlotFilter;
use super::input::{HumanAction, InputGate, InputSource, InputState, PlacementRequest};

/// Drives individual turns. One per match.
pub struct TurnCoordinator<E: BoardEngine> {
    input: Box<dyn InputSource>,
    filter: Box<dyn SlotFilter>,
    decisions: Box<dyn DecisionSource<E>>,
    pipeline: OpponentPipeline,
    gate: InputGate,
    refill: bool,
    user_turns: usize,
}

impl<E: BoardEngine> TurnCoordinator<E> {
    pub fn new(
        input: Box<dyn InputSource>,
        filter: Box<dyn SlotFilter>,
        decisions: Box<dyn DecisionSource<E>>,
        refill: bool,
    ) -> Self {
        Self {
            input,
            filter,
            decisions,
            pipeline: OpponentPipeline::new(),
            gate: InputGate::new(),
            refill,
            user_turns: 0,
        }
    }

    #[must_use]
    pub fn gate(&self) -> &InputGate {
        &self.gate
    }

    #[must_use]
    pub fn pipeline(&self) -> &OpponentPipeline {
        &self.pipeline
    }

    /// Stop any background work.
    pub fn abort(&mut self) {
        self.gate.disable();
        self.pipeline.abort();
    }

    fn request(&self, table: &Table<E>, only: Option<SlotId>, wildcards: bool) -> PlacementRequest {
        let hand = table.state.hands[Side::User].available();
        let open = match only {
            Some(slot) => vec![slot],
            None => table.state.open_slots(),
        };
        let turn = self.user_turns;
        let slots = open
            .into_iter()
            .filter(|&slot| only.is_some() || hand.iter().any(|&(card, _)| self.filter.allows(turn, card, slot)))
            .collect();
        let wildcards = if wildcards {
            table.state.deck.playable()
        } else {
            Vec::new()
        };
        PlacementRequest { hand, slots, wildcards }
    }

    fn allows(&self, table: &Table<E>, request: &PlacementRequest, only: Option<SlotId>, card: usize, slot: SlotId) -> bool {
        request.hand.iter().any(|&(index, _)| index == card)
            && request.slots.contains(&slot)
            && table.state.is_open(slot)
            && (only.is_some() || self.filter.allows(self.user_turns, card, slot))
    }

    async fn await_action(&mut self, table: &Table<E>, request: &PlacementRequest) -> Result<HumanAction, MatchError> {
        self.gate.open(request.state());
        let action = table.token().guard(self.input.next_action(request)).await;
        self.gate.disable();
        action?
    }

    /// Run the user's turn.
    pub async fn human_turn(&mut self, table: &mut Table<E>) -> Result<(), MatchError> {
        loop {
            table.token().check()?;
            let request = self.request(table, None, true);
            if request.hand.is_empty() || request.slots.is_empty() {
                log::error!("user turn started without a legal placement: {:?}", request);
                return Err(MatchError::contract("user turn has no legal placement"));
            }

            match self.await_action(table, &request).await? {
                HumanAction::Place { card, slot } => {
                    if !self.allows(table, &request, None, card, slot) {
                        log::warn!("ignoring invalid placement of card {} on {}", card, slot);
                        continue;
                    }
                    self.place_human(table, card, slot, false).await?;
                    self.user_turns += 1;
                    return Ok(());
                }
                HumanAction::UseWildcard(id) => {
                    if !request.wildcards.contains(&id) {
                        log::warn!("ignoring unavailable wildcard {}", id);
                        continue;
                    }
                    self.use_wildcard(table, id).await?;
                    if !table.state.can_move(Side::User) {
                        log::info!("user cannot place after {}, turn ends", id);
                        return Ok(());
                    }
                }
            }
        }
    }

    async fn use_wildcard(&mut self, table: &mut Table<E>, id: WildcardId) -> Result<(), MatchError> {
        let outcome = wildcards::play(table, self.input.as_mut(), &self.gate, id).await?;
        match outcome {
            WildcardOutcome::NotConsumed => Ok(()),
            WildcardOutcome::Consumed => {
                table.state.deck.mark_played(id);
                table.state.log.push(TurnEvent::Wildcard { id });
                Ok(())
            }
            WildcardOutcome::PlaceAgain(slot) => {
                table.state.deck.mark_played(id);
                table.state.log.push(TurnEvent::Wildcard { id });
                self.extra_placement(table, slot).await
            }
        }
    }

    /// The placement a wildcard grants on a freed slot.
    async fn extra_placement(&mut self, table: &mut Table<E>, slot: SlotId) -> Result<(), MatchError> {
        if !table.state.hands[Side::User].has_cards() {
            log::info!("no card left for the extra placement on {}", slot);
            return Ok(());
        }
        loop {
            table.token().check()?;
            let request = self.request(table, Some(slot), false);
            match self.await_action(table, &request).await? {
                HumanAction::Place { card, slot: chosen } if self.allows(table, &request, Some(slot), card, chosen) => {
                    return self.place_human(table, card, chosen, true).await;
                }
                other => log::warn!("ignoring {:?} during the extra placement on {}", other, slot),
            }
        }
    }

    async fn place_human(&mut self, table: &mut Table<E>, card: usize, slot: SlotId, extra: bool) -> Result<(), MatchError> {
        let phase = table.state.hands[Side::User].take(card)?;
        let batch = table.place(slot, phase, Side::User)?;
        table.state.log.push(TurnEvent::Placed {
            side: Side::User,
            slot,
            phase,
            extra,
        });
        if self.refill {
            table.state.hands[Side::User].refill(card, &mut table.rng);
        }
        log::info!("user placed {} on {}", phase, slot);

        if !extra && table.state.can_move(Side::Opponent) {
            self.prefetch(table)?;
        }

        table
            .stage
            .show(Cue::Place {
                side: Side::User,
                slot,
                phase,
            })
            .await?;
        play_batch(table, batch).await
    }

    fn prefetch(&mut self, table: &Table<E>) -> Result<(), MatchError> {
        let hand: Vec<_> = table.state.hands[Side::Opponent]
            .available()
            .into_iter()
            .map(|(_, phase)| phase)
            .collect();
        let open = table.state.open_slots();
        let decision = self.decisions.request(table.engine(), table.board()?, &hand, &open);
        self.pipeline.issue(decision)
    }

    /// Run the opponent's turn.
    pub async fn opponent_turn(&mut self, table: &mut Table<E>) -> Result<(), MatchError> {
        table.token().check()?;
        if !self.pipeline.is_pending() {
            self.prefetch(table)?;
        }
        let decision = self.pipeline.take(table.token()).await?;
        let (card, slot) = self.validate(table, decision)?;

        let phase = table.state.hands[Side::Opponent].take(card)?;
        let batch = table.place(slot, phase, Side::Opponent)?;
        table.state.log.push(TurnEvent::Placed {
            side: Side::Opponent,
            slot,
            phase,
            extra: false,
        });
        if self.refill {
            table.state.hands[Side::Opponent].refill(card, &mut table.rng);
        }
        log::info!("opponent placed {} on {}", phase, slot);

        table
            .stage
            .show(Cue::Place {
                side: Side::Opponent,
                slot,
                phase,
            })
            .await?;
        play_batch(table, batch).await
    }

    /// Map a decision onto the opponent's hand and check the slot is free.
    fn validate(&self, table: &Table<E>, decision: Decision) -> Result<(usize, SlotId), MatchError> {
        let available = table.state.hands[Side::Opponent].available();
        let Some(&(card, _)) = available.get(decision.card) else {
            log::error!("opponent chose card {} of {}", decision.card, available.len());
            return Err(MatchError::contract(format!(
                "opponent card index {} out of {}",
                decision.card,
                available.len()
            )));
        };
        if !table.state.is_open(decision.slot) {
            log::error!("opponent chose unavailable {}", decision.slot);
            return Err(MatchError::contract(format!("opponent chose unavailable {}", decision.slot)));
        }
        Ok((card, decision.slot))
    }

    /// Current gate state, for diagnostics.
    #[must_use]
    pub fn input_state(&self) -> InputState {
        self.gate.current()
    }
}
