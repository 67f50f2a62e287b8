//! Error taxonomy.
//!
//! - `Cancelled`: the operator left mid-match. Not a failure; it unwinds
//!   every pending wait up to the match boundary and is swallowed there.
//! - `InvalidPatternKind`: the board engine returned an unknown pattern tag.
//!   Fatal.
//! - `EmptySelectionPool`: a wildcard needed a non-empty slot pool. Recovered
//!   inside the wildcard engine; never escapes a match.
//!
//! Everything else an engine can report is a contract violation and stops
//! the match with diagnostics.

use crate::wildcards::WildcardId;

/// Failure reported by a board engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineError {
    pub operation: &'static str,
    pub message: String,
}

impl EngineError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.operation, self.message)
    }
}

impl std::error::Error for EngineError {}

/// Errors that can stop a match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchError {
    /// The match's cancellation token fired.
    Cancelled,
    /// The board engine reported a pattern tag outside the known set.
    InvalidPatternKind(i32),
    /// A wildcard found nothing to select.
    EmptySelectionPool(WildcardId),
    /// The board engine failed.
    Engine(EngineError),
    /// The human input source hung up.
    InputClosed,
    /// A collaborator broke an invariant (occupied slot chosen, bad card index, ...).
    ContractViolation(String),
}

impl MatchError {
    /// Check if this error is the cancellation signal.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, MatchError::Cancelled)
    }

    pub fn contract(message: impl Into<String>) -> Self {
        MatchError::ContractViolation(message.into())
    }
}

impl std::fmt::Display for MatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cancelled => write!(f, "match cancelled"),
            Self::InvalidPatternKind(tag) => write!(f, "invalid pattern kind tag {}", tag),
            Self::EmptySelectionPool(id) => write!(f, "{} has nothing to select", id),
            Self::Engine(e) => write!(f, "board engine failure: {}", e),
            Self::InputClosed => write!(f, "human input source closed"),
            Self::ContractViolation(s) => write!(f, "contract violation: {}", s),
        }
    }
}

impl std::error::Error for MatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Engine(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EngineError> for MatchError {
    fn from(e: EngineError) -> Self {
        MatchError::Engine(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let e = MatchError::from(EngineError::new("place_card", "slot occupied"));
        assert_eq!(e.to_string(), "board engine failure: place_card: slot occupied");
        assert_eq!(MatchError::InvalidPatternKind(9).to_string(), "invalid pattern kind tag 9");
    }

    #[test]
    fn test_is_cancelled() {
        assert!(MatchError::Cancelled.is_cancelled());
        assert!(!MatchError::InputClosed.is_cancelled());
    }
}
