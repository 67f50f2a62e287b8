//! Pattern results returned by a placement.
//!
//! The board engine reports patterns as loosely typed records
//! (`RawPattern`) carrying an integer kind tag. The orchestrator decodes
//! each record into the closed `Pattern` enum; an unknown tag is a contract
//! violation and surfaces as `MatchError::InvalidPatternKind`.
//!
//! A `PatternBatch` owns the records of one placement. Engines that hold
//! native resources for a result list attach a release hook, which runs
//! exactly once when the batch is dropped, whatever path drops it.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{MatchError, Side, SlotId};

/// Engine tag for a Phase Pair.
pub const TAG_PHASE_PAIR: i32 = 0;
/// Engine tag for a Full Moon Pair.
pub const TAG_FULL_MOON_PAIR: i32 = 1;
/// Engine tag for a Lunar Cycle.
pub const TAG_LUNAR_CYCLE: i32 = 2;

/// Shortest chain that counts as a Lunar Cycle.
pub const MIN_LUNAR_CYCLE_LEN: usize = 3;

/// Slot chain storage. Most cycles are short.
pub type Chain = SmallVec<[SlotId; 8]>;

/// Pattern record as the engine reports it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPattern {
    pub tag: i32,
    /// Second slot of a pair.
    pub other: Option<SlotId>,
    /// Ordered slots of a cycle.
    pub chain: Chain,
}

impl RawPattern {
    pub fn phase_pair(other: SlotId) -> Self {
        Self {
            tag: TAG_PHASE_PAIR,
            other: Some(other),
            chain: Chain::new(),
        }
    }

    pub fn full_moon_pair(other: SlotId) -> Self {
        Self {
            tag: TAG_FULL_MOON_PAIR,
            other: Some(other),
            chain: Chain::new(),
        }
    }

    pub fn lunar_cycle(chain: impl IntoIterator<Item = SlotId>) -> Self {
        Self {
            tag: TAG_LUNAR_CYCLE,
            other: None,
            chain: chain.into_iter().collect(),
        }
    }

    /// Decode into a typed pattern.
    pub fn decode(&self) -> Result<Pattern, MatchError> {
        match self.tag {
            TAG_PHASE_PAIR => self
                .other
                .map(|other| Pattern::PhasePair { other })
                .ok_or_else(|| MatchError::contract("phase pair without a second slot")),
            TAG_FULL_MOON_PAIR => self
                .other
                .map(|other| Pattern::FullMoonPair { other })
                .ok_or_else(|| MatchError::contract("full moon pair without a second slot")),
            TAG_LUNAR_CYCLE if self.chain.len() >= MIN_LUNAR_CYCLE_LEN => Ok(Pattern::LunarCycle {
                chain: self.chain.to_vec(),
            }),
            TAG_LUNAR_CYCLE => Err(MatchError::contract(format!(
                "lunar cycle of length {}",
                self.chain.len()
            ))),
            tag => Err(MatchError::InvalidPatternKind(tag)),
        }
    }
}

/// Pattern kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternKind {
    PhasePair,
    FullMoonPair,
    LunarCycle,
}

/// A decoded pattern, relative to the placed (subject) slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pattern {
    PhasePair { other: SlotId },
    FullMoonPair { other: SlotId },
    LunarCycle { chain: Vec<SlotId> },
}

impl Pattern {
    #[must_use]
    pub fn kind(&self) -> PatternKind {
        match self {
            Pattern::PhasePair { .. } => PatternKind::PhasePair,
            Pattern::FullMoonPair { .. } => PatternKind::FullMoonPair,
            Pattern::LunarCycle { .. } => PatternKind::LunarCycle,
        }
    }

    /// Every slot the pattern touches.
    #[must_use]
    pub fn occupied(&self, subject: SlotId) -> Vec<SlotId> {
        match self {
            Pattern::PhasePair { other } | Pattern::FullMoonPair { other } => vec![subject, *other],
            Pattern::LunarCycle { chain } => chain.clone(),
        }
    }

    /// Slots that earn a point before any perk applies.
    #[must_use]
    pub fn default_starred(&self, subject: SlotId) -> Vec<SlotId> {
        match self {
            Pattern::PhasePair { .. } => vec![subject],
            Pattern::FullMoonPair { other } => vec![subject, *other],
            Pattern::LunarCycle { chain } => chain.clone(),
        }
    }

    /// Edges to decorate on the board: the pair edge, or each link of the chain.
    #[must_use]
    pub fn edges(&self, subject: SlotId) -> Vec<(SlotId, SlotId)> {
        match self {
            Pattern::PhasePair { other } | Pattern::FullMoonPair { other } => vec![(subject, *other)],
            Pattern::LunarCycle { chain } => chain.windows(2).map(|w| (w[0], w[1])).collect(),
        }
    }
}

type ReleaseHook = Box<dyn FnOnce() + Send>;

/// All patterns produced by one placement.
pub struct PatternBatch {
    subject: SlotId,
    side: Side,
    records: Vec<RawPattern>,
    release: Option<ReleaseHook>,
}

impl PatternBatch {
    /// Create a batch with no release hook.
    pub fn new(subject: SlotId, side: Side, records: Vec<RawPattern>) -> Self {
        Self {
            subject,
            side,
            records,
            release: None,
        }
    }

    /// Attach a hook to run when the batch is dropped.
    #[must_use]
    pub fn with_release(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.release = Some(Box::new(hook));
        self
    }

    /// The placed slot.
    #[must_use]
    pub fn subject(&self) -> SlotId {
        self.subject
    }

    /// The placing side.
    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    #[must_use]
    pub fn records(&self) -> &[RawPattern] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl std::fmt::Debug for PatternBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternBatch")
            .field("subject", &self.subject)
            .field("side", &self.side)
            .field("records", &self.records)
            .finish()
    }
}

impl Drop for PatternBatch {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_decode_known_tags() {
        assert_eq!(
            RawPattern::phase_pair(SlotId(3)).decode(),
            Ok(Pattern::PhasePair { other: SlotId(3) })
        );
        assert_eq!(
            RawPattern::lunar_cycle([SlotId(0), SlotId(1), SlotId(2)]).decode().unwrap().kind(),
            PatternKind::LunarCycle
        );
    }

    #[test]
    fn test_decode_unknown_tag() {
        let raw = RawPattern {
            tag: 7,
            other: Some(SlotId(1)),
            chain: Chain::new(),
        };
        assert_eq!(raw.decode(), Err(MatchError::InvalidPatternKind(7)));
    }

    #[test]
    fn test_decode_short_cycle() {
        let raw = RawPattern::lunar_cycle([SlotId(0), SlotId(1)]);
        assert!(matches!(raw.decode(), Err(MatchError::ContractViolation(_))));
    }

    #[test]
    fn test_starred_defaults() {
        let subject = SlotId(0);
        let pair = Pattern::PhasePair { other: SlotId(3) };
        let full = Pattern::FullMoonPair { other: SlotId(1) };
        let cycle = Pattern::LunarCycle {
            chain: vec![SlotId(1), SlotId(0), SlotId(3)],
        };

        assert_eq!(pair.default_starred(subject), vec![subject]);
        assert_eq!(pair.occupied(subject), vec![subject, SlotId(3)]);
        assert_eq!(full.default_starred(subject), vec![subject, SlotId(1)]);
        assert_eq!(cycle.default_starred(subject).len(), 3);
        assert_eq!(cycle.edges(subject), vec![(SlotId(1), SlotId(0)), (SlotId(0), SlotId(3))]);
    }

    #[test]
    fn test_release_runs_once_on_drop() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = released.clone();
        let batch = PatternBatch::new(SlotId(0), Side::User, vec![RawPattern::phase_pair(SlotId(1))])
            .with_release(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        assert_eq!(batch.len(), 1);
        drop(batch);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }
}
