//! Match state owned by the orchestrator.
//!
//! ## MatchState
//!
//! The orchestrator's own view of a match, kept consistent with the board
//! engine after every mutating call:
//! - Slot mirror (phase and owner per slot) and the occupied count
//! - Both hands
//! - Running scores
//! - Active perks and the per-match wildcard deck
//! - Pattern decorations currently drawn on the board
//! - Turn log
//!
//! The occupied count only moves through `record_placement` (+1) and
//! `record_destruction` (-1). `check_occupancy` verifies it against the
//! placement and destruction tallies and against the mirror itself.

use serde::{Deserialize, Serialize};

use super::error::MatchError;
use super::phase::{Phase, SlotId};
use super::rng::GameRng;
use super::side::{Owner, Side, SideMap};
use crate::board::{PatternKind, SlotGraph};
use crate::scoring::PerkSet;
use crate::wildcards::{WildcardDeck, WildcardId};

/// Contents of one board slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotData {
    pub phase: Option<Phase>,
    pub owner: Owner,
}

/// A card in a hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandCard {
    pub phase: Phase,
    pub placed: bool,
}

/// One side's hand. Card indices are stable for the whole match.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    cards: Vec<HandCard>,
}

impl Hand {
    /// Deal `size` random cards.
    pub fn deal(size: usize, rng: &mut GameRng) -> Self {
        Self::from_phases((0..size).map(|_| rng.phase()))
    }

    /// Build a hand from fixed phases.
    pub fn from_phases(phases: impl IntoIterator<Item = Phase>) -> Self {
        Self {
            cards: phases
                .into_iter()
                .map(|phase| HandCard { phase, placed: false })
                .collect(),
        }
    }

    #[must_use]
    pub fn cards(&self) -> &[HandCard] {
        &self.cards
    }

    /// `(index, phase)` of every card still in hand.
    #[must_use]
    pub fn available(&self) -> Vec<(usize, Phase)> {
        self.cards
            .iter()
            .enumerate()
            .filter(|(_, card)| !card.placed)
            .map(|(index, card)| (index, card.phase))
            .collect()
    }

    #[must_use]
    pub fn has_cards(&self) -> bool {
        self.cards.iter().any(|card| !card.placed)
    }

    /// Mark a card placed and return its phase.
    pub fn take(&mut self, index: usize) -> Result<Phase, MatchError> {
        match self.cards.get_mut(index) {
            Some(card) if !card.placed => {
                card.placed = true;
                Ok(card.phase)
            }
            Some(_) => Err(MatchError::contract(format!("hand card {} already placed", index))),
            None => Err(MatchError::contract(format!("hand card {} does not exist", index))),
        }
    }

    /// Replace a placed card with a freshly dealt one.
    pub fn refill(&mut self, index: usize, rng: &mut GameRng) {
        if let Some(card) = self.cards.get_mut(index) {
            if card.placed {
                *card = HandCard {
                    phase: rng.phase(),
                    placed: false,
                };
            }
        }
    }
}

/// A pattern edge drawn on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoration {
    pub from: SlotId,
    pub to: SlotId,
    pub kind: PatternKind,
}

impl Decoration {
    #[must_use]
    pub fn touches(&self, slot: SlotId) -> bool {
        self.from == slot || self.to == slot
    }
}

/// Turn log entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnEvent {
    /// A card went down. `extra` marks a placement granted by a wildcard.
    Placed {
        side: Side,
        slot: SlotId,
        phase: Phase,
        extra: bool,
    },
    /// The side had no card to play.
    Skipped { side: Side },
    /// The user resolved a wildcard.
    Wildcard { id: WildcardId },
}

/// The orchestrator's view of a match.
#[derive(Clone, Debug)]
pub struct MatchState {
    slots: Vec<SlotData>,
    occupied: usize,
    placements: u32,
    destroyed: u32,

    pub hands: SideMap<Hand>,
    pub scores: SideMap<u32>,
    pub perks: PerkSet,
    pub deck: WildcardDeck,
    pub decorations: Vec<Decoration>,
    pub log: Vec<TurnEvent>,
}

impl MatchState {
    /// Fresh state for an empty board.
    #[must_use]
    pub fn new(graph: &SlotGraph, hands: SideMap<Hand>, deck: WildcardDeck) -> Self {
        Self {
            slots: vec![SlotData::default(); graph.len()],
            occupied: 0,
            placements: 0,
            destroyed: 0,
            hands,
            scores: SideMap::default(),
            perks: PerkSet::empty(),
            deck,
            decorations: Vec::new(),
            log: Vec::new(),
        }
    }

    #[must_use]
    pub fn slot(&self, slot: SlotId) -> SlotData {
        self.slots.get(slot.index()).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn owner(&self, slot: SlotId) -> Owner {
        self.slot(slot).owner
    }

    #[must_use]
    pub fn is_open(&self, slot: SlotId) -> bool {
        slot.index() < self.slots.len() && self.slots[slot.index()].phase.is_none()
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn occupied(&self) -> usize {
        self.occupied
    }

    #[must_use]
    pub fn placements(&self) -> u32 {
        self.placements
    }

    #[must_use]
    pub fn destroyed(&self) -> u32 {
        self.destroyed
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.occupied == self.slots.len()
    }

    /// Unoccupied slots in id order.
    #[must_use]
    pub fn open_slots(&self) -> Vec<SlotId> {
        self.matching(|data| data.phase.is_none())
    }

    /// Occupied slots in id order.
    #[must_use]
    pub fn occupied_slots(&self) -> Vec<SlotId> {
        self.matching(|data| data.phase.is_some())
    }

    /// Slots owned by a side, in id order.
    #[must_use]
    pub fn owned_by(&self, side: Side) -> Vec<SlotId> {
        self.matching(|data| data.owner.is(side))
    }

    fn matching(&self, predicate: impl Fn(&SlotData) -> bool) -> Vec<SlotId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, data)| predicate(data))
            .map(|(index, _)| SlotId(index as u16))
            .collect()
    }

    /// Whether a side can place a card right now.
    #[must_use]
    pub fn can_move(&self, side: Side) -> bool {
        !self.is_full() && self.hands[side].has_cards()
    }

    /// Mirror a placement. The slot becomes occupied and unclaimed.
    pub fn record_placement(&mut self, slot: SlotId, phase: Phase) -> Result<(), MatchError> {
        if !self.is_open(slot) {
            return Err(MatchError::contract(format!("placement on unavailable {}", slot)));
        }
        self.slots[slot.index()] = SlotData {
            phase: Some(phase),
            owner: Owner::Transient,
        };
        self.occupied += 1;
        self.placements += 1;
        self.check_occupancy()
    }

    /// Mirror a destruction.
    pub fn record_destruction(&mut self, slot: SlotId) -> Result<(), MatchError> {
        if self.slot(slot).phase.is_none() {
            return Err(MatchError::contract(format!("destroying empty {}", slot)));
        }
        self.slots[slot.index()] = SlotData::default();
        self.occupied -= 1;
        self.destroyed += 1;
        self.check_occupancy()
    }

    /// Mirror an ownership change.
    pub fn record_claim(&mut self, slot: SlotId, side: Side) -> Result<(), MatchError> {
        if self.slot(slot).phase.is_none() {
            return Err(MatchError::contract(format!("claiming empty {}", slot)));
        }
        self.slots[slot.index()].owner = side.into();
        Ok(())
    }

    /// Remove and return every decoration touching a slot.
    pub fn take_decorations(&mut self, slot: SlotId) -> Vec<Decoration> {
        let (touching, kept) = self.decorations.drain(..).partition(|d| d.touches(slot));
        self.decorations = kept;
        touching
    }

    /// Verify occupied = placements - destroyed = occupied slots in the mirror.
    pub fn check_occupancy(&self) -> Result<(), MatchError> {
        let expected = self.placements as usize - self.destroyed as usize;
        let mirrored = self.slots.iter().filter(|data| data.phase.is_some()).count();
        if self.occupied == expected && self.occupied == mirrored {
            Ok(())
        } else {
            log::error!(
                "occupancy drift: count {}, placements {} - destroyed {}, mirror {}",
                self.occupied,
                self.placements,
                self.destroyed,
                mirrored
            );
            Err(MatchError::contract(format!(
                "occupied count {} disagrees with {} placements, {} destroyed, {} mirrored",
                self.occupied, self.placements, self.destroyed, mirrored
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Layout;

    fn state() -> MatchState {
        let hands = SideMap::new(|_| Hand::from_phases([Phase::new(1), Phase::new(2)]));
        MatchState::new(&Layout::Grid3.graph(), hands, WildcardDeck::default())
    }

    #[test]
    fn test_hand_take_and_refill() {
        let mut rng = GameRng::new(1);
        let mut hand = Hand::from_phases([Phase::new(3), Phase::new(6)]);

        assert_eq!(hand.take(1), Ok(Phase::new(6)));
        assert!(hand.take(1).is_err());
        assert!(hand.take(5).is_err());
        assert_eq!(hand.available(), vec![(0, Phase::new(3))]);

        hand.refill(1, &mut rng);
        assert_eq!(hand.available().len(), 2);
    }

    #[test]
    fn test_empty_hand_cannot_move() {
        let mut s = state();
        s.hands[Side::User].take(0).unwrap();
        s.hands[Side::User].take(1).unwrap();
        assert!(!s.can_move(Side::User));
        assert!(s.can_move(Side::Opponent));
    }

    #[test]
    fn test_occupancy_tracks_mutations() {
        let mut s = state();
        s.record_placement(SlotId(0), Phase::new(1)).unwrap();
        s.record_placement(SlotId(3), Phase::new(1)).unwrap();
        assert_eq!(s.owner(SlotId(0)), Owner::Transient);

        s.record_claim(SlotId(0), Side::User).unwrap();
        assert_eq!(s.owned_by(Side::User), vec![SlotId(0)]);

        s.record_destruction(SlotId(0)).unwrap();
        assert_eq!(s.occupied(), 1);
        assert_eq!(s.placements() - s.destroyed(), 1);
        assert!(s.is_open(SlotId(0)));
        assert!(s.check_occupancy().is_ok());
    }

    #[test]
    fn test_placement_on_occupied_slot_fails() {
        let mut s = state();
        s.record_placement(SlotId(4), Phase::new(1)).unwrap();
        assert!(s.record_placement(SlotId(4), Phase::new(2)).is_err());
        assert!(s.record_destruction(SlotId(5)).is_err());
        assert!(s.record_claim(SlotId(5), Side::User).is_err());
        assert_eq!(s.occupied(), 1);
    }

    #[test]
    fn test_take_decorations() {
        let mut s = state();
        s.decorations = vec![
            Decoration { from: SlotId(0), to: SlotId(1), kind: PatternKind::PhasePair },
            Decoration { from: SlotId(1), to: SlotId(2), kind: PatternKind::LunarCycle },
            Decoration { from: SlotId(3), to: SlotId(4), kind: PatternKind::FullMoonPair },
        ];

        let removed = s.take_decorations(SlotId(1));
        assert_eq!(removed.len(), 2);
        assert_eq!(s.decorations.len(), 1);
        assert_eq!(s.decorations[0].from, SlotId(3));
    }
}
