//! Query command - Answer a single JSON-encoded position with the engine's move

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::{
    cli::config::{CommonConfig, RulesConfig},
    game::{GameState, Move, Player, PlayerHands},
    session::GameSession,
    solver::{Score, Solver, SolverConfig},
};

#[derive(Parser, Debug)]
#[command(about = "Answer a JSON position with the engine's move")]
pub struct QueryArgs {
    /// Position as `{"one":[a,b],"two":[c,d],"turn":"one"|"two"}`
    #[arg(long)]
    pub json: String,

    #[command(flatten)]
    pub rules: RulesConfig,

    /// Pretty-print the response
    #[arg(long)]
    pub pretty: bool,
}

/// Position on the wire: both players' hands as given, and whose turn it is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePosition {
    pub one: [u8; 2],
    pub two: [u8; 2],
    pub turn: Player,
}

impl From<GameState> for WirePosition {
    fn from(state: GameState) -> Self {
        Self {
            one: [state.one.first, state.one.second],
            two: [state.two.first, state.two.second],
            turn: state.to_move,
        }
    }
}

impl From<WirePosition> for GameState {
    fn from(position: WirePosition) -> Self {
        let [a, b] = position.one;
        let [c, d] = position.two;
        GameState::new(PlayerHands::new(a, b), PlayerHands::new(c, d), position.turn)
    }
}

/// Answer to a position query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    pub found: bool,
    /// Engine move on the hands as they were sent
    #[serde(rename = "move", skip_serializing_if = "Option::is_none")]
    pub mv: Option<Move>,
    /// Score of the position for the player to move
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<WirePosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl QueryResponse {
    fn not_found(reason: String) -> Self {
        Self {
            found: false,
            mv: None,
            score: None,
            next: None,
            reason: Some(reason),
        }
    }
}

/// Parse a request body.
///
/// # Errors
///
/// Returns [`crate::Error::Serialization`] if the body is not a position.
pub fn parse_request(body: &str) -> crate::Result<WirePosition> {
    Ok(serde_json::from_str(body)?)
}

/// Solve from the requested position and answer with the engine's move.
///
/// Positions the engine has no move for (finished games, unexplored or
/// depth-bounded positions) produce `found: false` rather than an error.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidHandCount`] for positions outside the
/// ruleset and any structural error from the solve.
pub fn respond(request: WirePosition, config: SolverConfig) -> crate::Result<QueryResponse> {
    let state = GameState::from(request);
    let solution = Solver::new(config).solve(state)?;
    let mut session = GameSession::from_state(&solution, state);

    let found = session
        .engine_move()
        .and_then(|mv| Ok((mv, solution.best_move(&state)?.score)));
    let (mv, score) = match found {
        Ok(answer) => answer,
        Err(
            err @ (crate::Error::GameOver
            | crate::Error::PositionNotFound { .. }
            | crate::Error::NoMovesAvailable { .. }),
        ) => return Ok(QueryResponse::not_found(err.to_string())),
        Err(err) => return Err(err),
    };
    let next = session.play(mv)?;

    Ok(QueryResponse {
        found: true,
        mv: Some(mv),
        score: Some(score),
        next: Some(next.into()),
        reason: None,
    })
}

pub fn execute(args: QueryArgs, _common: &CommonConfig) -> Result<()> {
    let request = parse_request(&args.json).context("Invalid --json position")?;
    let response = respond(request, args.rules.solver_config()?)?;
    let body = if args.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{body}");
    Ok(())
}
