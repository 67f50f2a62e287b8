//! Tutorial matches.
//!
//! A tutorial is an ordinary `Match` with fixed hands, no refills, a slot
//! filter forcing each user move, and scripted opponent replies. Scripted
//! replies index the opponent's remaining cards, so hands are ordered in
//! play order and every reply uses card 0.

use crate::board::{BoardEngine, Decision, Layout};
use crate::core::{MatchConfig, Phase, Side, SideMap, SlotId};
use crate::turns::{InputSource, ScriptedDecisions, ScriptedSlots};

use super::controller::{MatchBuilder, MatchStrategy};

/// A scripted lesson.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tutorial {
    pub layout: Layout,
    pub user_hand: Vec<Phase>,
    pub opponent_hand: Vec<Phase>,
    /// Forced `(card, slot)` for each user turn.
    pub user_moves: Vec<(usize, SlotId)>,
    /// Opponent replies, in order.
    pub opponent_moves: Vec<SlotId>,
}

impl Tutorial {
    /// The introductory lesson on a 3×3 board. Every pattern kind appears
    /// and the user wins 12 to 7.
    #[must_use]
    pub fn first_steps() -> Self {
        Self {
            layout: Layout::Grid3,
            user_hand: vec![Phase::new(1), Phase::new(5), Phase::new(2), Phase::new(3)],
            opponent_hand: vec![Phase::new(1), Phase::new(6), Phase::new(0), Phase::new(7)],
            user_moves: vec![(0, SlotId(4)), (1, SlotId(7)), (2, SlotId(5)), (3, SlotId(2))],
            opponent_moves: vec![SlotId(1), SlotId(8), SlotId(0), SlotId(3)],
        }
    }

    #[must_use]
    pub fn config(&self) -> MatchConfig {
        MatchConfig::default()
            .with_layout(self.layout)
            .with_hand_size(self.user_hand.len())
            .with_refill(false)
            .with_first_mover(Side::User)
    }

    #[must_use]
    pub fn hands(&self) -> SideMap<Vec<Phase>> {
        SideMap::new(|side| match side {
            Side::User => self.user_hand.clone(),
            Side::Opponent => self.opponent_hand.clone(),
        })
    }

    /// Strategy forcing the scripted moves. The user still makes each move
    /// through `input`.
    pub fn strategy<E: BoardEngine>(&self, input: impl InputSource + 'static) -> MatchStrategy<E> {
        let replies = self.opponent_moves.iter().map(|&slot| Decision { card: 0, slot });
        MatchStrategy::standard(input)
            .with_filter(ScriptedSlots::new(self.user_moves.clone()))
            .with_decisions(ScriptedDecisions::new(replies))
    }

    /// Builder with the lesson's board and hands.
    pub fn builder<E: BoardEngine>(&self, engine: E) -> MatchBuilder<E> {
        MatchBuilder::new(engine, self.config()).with_hands(self.hands())
    }
}
