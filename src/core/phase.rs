//! Lunar phases and slot identifiers.
//!
//! ## Phase
//!
//! A card shows one of eight phases, ordered around the lunar cycle:
//!
//! | Value | Phase |
//! |---|---|
//! | 0 | New Moon |
//! | 1 | Waxing Crescent |
//! | 2 | First Quarter |
//! | 3 | Waxing Gibbous |
//! | 4 | Full Moon |
//! | 5 | Waning Gibbous |
//! | 6 | Third Quarter |
//! | 7 | Waning Crescent |
//!
//! Two phases are *opposite* when they sit four steps apart, and *sequential*
//! when one directly follows the other (wrapping from 7 back to 0).
//!
//! ## SlotId
//!
//! Opaque index of a board slot. Slot ids are dense: a board with `n` slots
//! uses ids `0..n`.

use serde::{Deserialize, Serialize};

/// Number of distinct phases. Must be even so every phase has an opposite.
pub const PHASE_COUNT: u8 = 8;

/// One of the eight lunar phases a card can display.
///
/// ```
/// use lunar_match::core::Phase;
///
/// let crescent = Phase::new(1);
/// assert_eq!(crescent.opposite(), Phase::new(5));
/// assert_eq!(crescent.next(), Phase::new(2));
/// assert_eq!(Phase::new(0).prev(), Phase::new(7));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8")]
pub struct Phase(u8);

impl Phase {
    pub const NEW_MOON: Phase = Phase(0);
    pub const FULL_MOON: Phase = Phase(4);

    /// Create a phase, wrapping values outside `0..8`.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value % PHASE_COUNT)
    }

    /// Raw phase value in `0..8`.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// The phase four steps away.
    #[must_use]
    pub const fn opposite(self) -> Self {
        Self((self.0 + PHASE_COUNT / 2) % PHASE_COUNT)
    }

    /// The phase that follows this one in the cycle.
    #[must_use]
    pub const fn next(self) -> Self {
        Self((self.0 + 1) % PHASE_COUNT)
    }

    /// The phase that precedes this one in the cycle.
    #[must_use]
    pub const fn prev(self) -> Self {
        Self((self.0 + PHASE_COUNT - 1) % PHASE_COUNT)
    }

    /// Iterate over all eight phases in cycle order.
    pub fn all() -> impl Iterator<Item = Phase> {
        (0..PHASE_COUNT).map(Phase)
    }

    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self.0 {
            0 => "New Moon",
            1 => "Waxing Crescent",
            2 => "First Quarter",
            3 => "Waxing Gibbous",
            4 => "Full Moon",
            5 => "Waning Gibbous",
            6 => "Third Quarter",
            _ => "Waning Crescent",
        }
    }
}

/// A raw phase value outside `0..8`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidPhase(pub u8);

impl std::fmt::Display for InvalidPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "phase {} is outside 0..{}", self.0, PHASE_COUNT)
    }
}

impl std::error::Error for InvalidPhase {}

impl TryFrom<u8> for Phase {
    type Error = InvalidPhase;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value < PHASE_COUNT {
            Ok(Self(value))
        } else {
            Err(InvalidPhase(value))
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Board slot identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(pub u16);

impl SlotId {
    /// Create a new slot ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Index into dense per-slot storage.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Slot({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_wraps() {
        assert_eq!(Phase::new(9), Phase::new(1));
        assert_eq!(Phase::new(7).next(), Phase::NEW_MOON);
        assert_eq!(Phase::NEW_MOON.prev(), Phase::new(7));
    }

    #[test]
    fn test_opposite_is_involution() {
        for phase in Phase::all() {
            assert_ne!(phase.opposite(), phase);
            assert_eq!(phase.opposite().opposite(), phase);
        }
        assert_eq!(Phase::NEW_MOON.opposite(), Phase::FULL_MOON);
    }

    #[test]
    fn test_all_phases() {
        let phases: Vec<_> = Phase::all().collect();
        assert_eq!(phases.len(), 8);
        assert_eq!(phases[4], Phase::FULL_MOON);
    }

    #[test]
    fn test_phase_deserialize_rejects_out_of_range() {
        let phase: Phase = serde_json::from_str("4").unwrap();
        assert_eq!(phase, Phase::FULL_MOON);
        assert_eq!(serde_json::to_string(&phase).unwrap(), "4");
        assert!(serde_json::from_str::<Phase>("8").is_err());
        assert_eq!(Phase::try_from(9), Err(InvalidPhase(9)));
    }

    #[test]
    fn test_slot_display() {
        assert_eq!(format!("{}", SlotId::new(3)), "Slot(3)");
        assert_eq!(SlotId::new(3).index(), 3);
    }
}
