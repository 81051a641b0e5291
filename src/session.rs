//! Playing a concrete game against a solved graph
//!
//! The solved graph only knows normalized positions. A [`GameSession`]
//! keeps the concrete hands the players actually see and translates the
//! engine's normalized moves onto them.

use serde::{Deserialize, Serialize};

use crate::{
    game::{GameState, Move, Player},
    solver::Solution,
};

/// A move as it was played on the concrete hands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayedMove {
    pub player: Player,
    pub mv: Move,
}

/// A game in progress, backed by a solution
#[derive(Debug, Clone)]
pub struct GameSession<'s> {
    solution: &'s Solution,
    initial: GameState,
    state: GameState,
    history: Vec<PlayedMove>,
}

impl<'s> GameSession<'s> {
    /// Start from the position the solution was computed for
    pub fn new(solution: &'s Solution) -> Self {
        Self::from_state(solution, solution.start())
    }

    /// Start from any concrete position; it only needs to be explored by the time the engine is asked
    pub fn from_state(solution: &'s Solution, state: GameState) -> Self {
        Self {
            solution,
            initial: state,
            state,
            history: Vec::new(),
        }
    }

    pub fn initial(&self) -> GameState {
        self.initial
    }

    /// Current concrete position
    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn history(&self) -> &[PlayedMove] {
        &self.history
    }

    pub fn is_over(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn winner(&self) -> Option<Player> {
        self.state.winner()
    }

    /// The engine's choice for the player to move, on the concrete hands.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::GameOver`] once the game has ended, and the
    /// lookup errors of [`Solution::best_move`].
    pub fn engine_move(&self) -> crate::Result<Move> {
        if self.is_over() {
            return Err(crate::Error::GameOver);
        }
        let ctx = self.state.normalized_context();
        let best = self.solution.best_move(&ctx.state)?;
        Ok(ctx.map_normalized_to_original(best.mv))
    }

    /// Play a concrete move for the player to move.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::GameOver`] once the game has ended and
    /// [`crate::Error::IllegalMove`] if either hand involved is empty.
    pub fn play(&mut self, mv: Move) -> crate::Result<GameState> {
        if self.is_over() {
            return Err(crate::Error::GameOver);
        }
        let next = self.state.apply_move(mv, self.solution.ruleset())?;
        self.history.push(PlayedMove {
            player: self.state.to_move,
            mv,
        });
        self.state = next;
        Ok(next)
    }

    /// Let the engine move for the player to move.
    ///
    /// # Errors
    ///
    /// See [`engine_move`](Self::engine_move).
    pub fn play_engine(&mut self) -> crate::Result<Move> {
        let mv = self.engine_move()?;
        self.play(mv)?;
        Ok(mv)
    }
}
