//! Pattern scoring: perks, the perk table, and the pattern event player.

pub mod perks;
pub mod player;

pub use perks::{award, Award, Perk, PerkSet};
pub use player::{play_batch, play_end_game, AQUARIUS_BONUS};
