//! Play command - Pit the engine against a random opponent

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use serde::Serialize;

use crate::{
    cli::{
        config::{CommonConfig, RulesConfig},
        output::{create_game_progress, format_number, print_kv, print_section},
    },
    game::{GameState, Player},
    session::GameSession,
    solver::{Solution, Solver},
};

#[derive(Parser, Debug)]
#[command(about = "Play the engine as player one against a random opponent")]
pub struct PlayArgs {
    /// Number of games
    #[arg(long, short = 'g', default_value_t = 100)]
    pub games: usize,

    /// Moves after which an unfinished game counts as a draw
    #[arg(long, default_value_t = 200)]
    pub max_plies: usize,

    #[command(flatten)]
    pub rules: RulesConfig,
}

/// How one game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameResult {
    Win(Player),
    /// Ply limit reached, or the engine ran off the explored graph
    Unfinished,
}

/// Tally of a batch of games, from the engine's side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlayTally {
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
}

impl PlayTally {
    pub fn record(&mut self, result: GameResult, engine: Player) {
        match result {
            GameResult::Win(winner) if winner == engine => self.wins += 1,
            GameResult::Win(_) => self.losses += 1,
            GameResult::Unfinished => self.draws += 1,
        }
    }

    pub fn games(&self) -> usize {
        self.wins + self.losses + self.draws
    }
}

/// Play one game from the solution's start: the engine moves for `engine`,
/// the opponent picks uniformly among its legal moves.
///
/// # Errors
///
/// Propagates structural errors from the solution; running off the explored
/// graph ends the game as unfinished instead.
pub fn play_game<R: Rng + ?Sized>(
    solution: &Solution,
    engine: Player,
    rng: &mut R,
    max_plies: usize,
) -> crate::Result<GameResult> {
    let mut session = GameSession::new(solution);

    while session.history().len() < max_plies {
        if let Some(winner) = session.winner() {
            return Ok(GameResult::Win(winner));
        }
        if session.is_over() {
            break;
        }

        let state = session.state();
        if state.to_move == engine {
            match session.play_engine() {
                Ok(_) => {}
                Err(
                    crate::Error::PositionNotFound { .. } | crate::Error::NoMovesAvailable { .. },
                ) => {
                    debug!("engine has no move in {state}");
                    break;
                }
                Err(err) => return Err(err),
            }
        } else {
            let Some(&mv) = state.legal_moves().choose(rng) else {
                break;
            };
            session.play(mv)?;
        }
    }

    Ok(session
        .winner()
        .map_or(GameResult::Unfinished, GameResult::Win))
}

pub fn execute(args: PlayArgs, common: &CommonConfig) -> Result<()> {
    let config = args.rules.solver_config()?;
    let solution = Solver::new(config)
        .solve(GameState::opening())
        .context("Solve failed")?;

    let mut rng = match common.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let progress = common
        .progress
        .then(|| create_game_progress(args.games as u64));
    let mut tally = PlayTally::default();
    for _ in 0..args.games {
        let result = play_game(&solution, Player::One, &mut rng, args.max_plies)?;
        tally.record(result, Player::One);
        if let Some(pb) = &progress {
            pb.set_message(format!("{} won", tally.wins));
            pb.inc(1);
        }
    }
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    print_section(&format!(
        "Engine vs random ({} rules)",
        solution.ruleset()
    ));
    print_kv("Games", &format_number(tally.games()));
    print_kv("Engine wins", &format_number(tally.wins));
    print_kv("Engine losses", &format_number(tally.losses));
    print_kv("Unfinished", &format_number(tally.draws));
    if let Some(seed) = common.seed {
        print_kv("Seed", &seed.to_string());
    }
    Ok(())
}
