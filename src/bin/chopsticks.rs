//! Chopsticks CLI - Game-theoretic solver for the hand-tapping game
//!
//! This CLI provides a unified interface for:
//! - Solving every position reachable from a start position
//! - Answering single JSON-encoded positions with the engine's move
//! - Playing the engine against a random opponent

use anyhow::Result;
use chopsticks::cli::{
    commands::{play, query, solve},
    config::CommonConfig,
};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "chopsticks")]
#[command(version, about = "Game-theoretic solver for chopsticks", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a start position and print the result
    Solve(solve::SolveArgs),

    /// Answer a JSON-encoded position with the engine's move
    Query(query::QueryArgs),

    /// Play the engine against a random opponent
    Play(play::PlayArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.common.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Solve(args) => solve::execute(args, &cli.common),
        Commands::Query(args) => query::execute(args, &cli.common),
        Commands::Play(args) => play::execute(args, &cli.common),
    }
}
