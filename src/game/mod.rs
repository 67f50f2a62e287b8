//! Matches: the table, the match controller, and tutorials.

pub mod controller;
pub mod table;
pub mod tutorial;

pub use controller::{Match, MatchBuilder, MatchEnd, MatchReport, MatchStrategy, Outcome};
pub use table::Table;
pub use tutorial::Tutorial;
