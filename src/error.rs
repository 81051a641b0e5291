//! Error types for the chopsticks crate

use thiserror::Error;

/// Main error type for the chopsticks crate
///
/// Positions are carried as their text labels (see
/// [`GameState::encode`](crate::game::GameState::encode)) so an error
/// stays printable after the graph that produced it has been dropped.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid ruleset: a hand must hold at least one finger (got {fingers})")]
    InvalidRuleset { fingers: u8 },

    #[error("unknown overflow rule '{value}' (expected 'rollover' or 'cutoff')")]
    InvalidOverflow { value: String },

    #[error("hand count {count} exceeds the ruleset limit of {fingers} fingers in '{state}'")]
    InvalidHandCount { count: u8, fingers: u8, state: String },

    #[error("illegal move {mv} in position '{state}': {reason}")]
    IllegalMove {
        mv: String,
        state: String,
        reason: String,
    },

    #[error("game already over")]
    GameOver,

    #[error("invalid label format '{label}' (expected format: '{expected}')")]
    InvalidLabelFormat { label: String, expected: String },

    #[error("invalid player '{player}' in label '{label}' (expected '1' or '2')")]
    InvalidPlayerString { player: String, label: String },

    #[error("node for '{state}' already has children and cannot be explored again")]
    NodeAlreadyExpanded { state: String },

    #[error("exploration path corrupted: expected '{expected}' on top of the path, found {found}")]
    MalformedPath { expected: String, found: String },

    #[error("move {mv} from '{parent}' already leads to '{existing}', refusing to rewire it to '{attempted}'")]
    EdgeConflict {
        parent: String,
        mv: String,
        existing: String,
        attempted: String,
    },

    #[error("edge mismatch between '{parent}' and '{child}': {reason}\n{context}")]
    EdgeMismatch {
        parent: String,
        child: String,
        reason: String,
        context: String,
    },

    #[error("loop ring link '{from}' -> '{to}' has no matching edge in the play graph")]
    BrokenRing { from: String, to: String },

    #[error("exit '{from}' -> '{to}' has no predecessor inside its own loop component")]
    OrphanExit { from: String, to: String },

    #[error("node '{state}' is claimed by loop component {expected} but marked with {found}")]
    MembershipConflict {
        state: String,
        expected: usize,
        found: String,
    },

    #[error("position '{state}' was never explored")]
    PositionNotFound { state: String },

    #[error("position '{state}' has not been scored")]
    Unscored { state: String },

    #[error("position '{state}' has no explored moves")]
    NoMovesAvailable { state: String },

    #[error("{phase} exceeded its iteration ceiling of {limit}")]
    IterationCeiling { phase: &'static str, limit: usize },

    #[error("scoring finished with {remaining} unscored nodes (first: '{example}')")]
    IncompleteScoring { remaining: usize, example: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;
