//! Core types: phases, sides, RNG, configuration, errors, cancellation, match state.
//!
//! Everything here is independent of how a match is presented or driven.
//! Higher modules build on these types rather than redefining them.

pub mod cancel;
pub mod config;
pub mod error;
pub mod phase;
pub mod rng;
pub mod side;
pub mod state;

pub use cancel::CancelToken;
pub use config::{Difficulty, MatchConfig, PresentationConfig, SessionConfig};
pub use error::{EngineError, MatchError};
pub use phase::{InvalidPhase, Phase, SlotId, PHASE_COUNT};
pub use rng::GameRng;
pub use side::{Owner, Side, SideMap};
pub use state::{Decoration, Hand, HandCard, MatchState, SlotData, TurnEvent};
