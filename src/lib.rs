//! Chopsticks solver
//!
//! This crate provides:
//! - The chopsticks rules with configurable finger limits and overflow
//! - A solver that explores the full position graph, groups its cycles into
//!   loop components and scores every position by minimax
//! - A game session that plays the solved strategy on concrete hands
//! - The `chopsticks` command-line interface

pub mod cli;
pub mod error;
pub mod game;
pub mod session;
pub mod solver;

pub use error::{Error, Result};
pub use game::{GameState, Hand, Move, Overflow, Player, PlayerHands, Ruleset};
pub use session::{GameSession, PlayedMove};
pub use solver::{BestMove, LineOutcome, Solution, Solver, SolverConfig};
