//! Turns: human input, slot filters, opponent decisions, and the coordinator
//! that runs one turn at a time.

pub mod coordinator;
pub mod decisions;
pub mod filter;
pub mod input;

pub use coordinator::TurnCoordinator;
pub use decisions::{DecisionSource, EngineDecisions, OpponentPipeline, ScriptedDecisions};
pub use filter::{AnySlot, ScriptedSlots, SlotFilter};
pub use input::{
    ChannelInput, HumanAction, InputGate, InputSource, InputState, PlacementRequest, ScriptedInput, SharedInput,
    UiEvent,
};
