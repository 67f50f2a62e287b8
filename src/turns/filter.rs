//! Slot filters restrict which placements the user may make.
//!
//! Ordinary matches use `AnySlot`. Tutorials force the user's moves with
//! `ScriptedSlots`.

use crate::core::SlotId;

/// Placement predicate for user turns.
pub trait SlotFilter: Send + Sync {
    /// Whether the user's `turn`-th placement (0-based) may put hand card
    /// `card` on `slot`. Only called for open slots and available cards.
    fn allows(&self, turn: usize, card: usize, slot: SlotId) -> bool;
}

/// Every open slot, every card.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnySlot;

impl SlotFilter for AnySlot {
    fn allows(&self, _turn: usize, _card: usize, _slot: SlotId) -> bool {
        true
    }
}

/// Forced `(card, slot)` per user turn. Turns past the script are free.
#[derive(Clone, Debug, Default)]
pub struct ScriptedSlots {
    steps: Vec<(usize, SlotId)>,
}

impl ScriptedSlots {
    #[must_use]
    pub fn new(steps: Vec<(usize, SlotId)>) -> Self {
        Self { steps }
    }
}

impl SlotFilter for ScriptedSlots {
    fn allows(&self, turn: usize, card: usize, slot: SlotId) -> bool {
        match self.steps.get(turn) {
            Some(&(forced_card, forced_slot)) => card == forced_card && slot == forced_slot,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_slots() {
        let filter = ScriptedSlots::new(vec![(1, SlotId(4))]);
        assert!(filter.allows(0, 1, SlotId(4)));
        assert!(!filter.allows(0, 0, SlotId(4)));
        assert!(!filter.allows(0, 1, SlotId(3)));
        assert!(filter.allows(1, 0, SlotId(3)));
        assert!(AnySlot.allows(0, 0, SlotId(0)));
    }
}
