//! Chopsticks game rules

pub mod moves;
pub mod rules;
pub mod state;

pub use moves::{Hand, Move, NormalizedContext};
pub use rules::{Overflow, Ruleset};
pub use state::{GameState, Player, PlayerHands};
