//! Shared configuration types for CLI commands

use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{
    game::{Overflow, Ruleset},
    solver::{DEFAULT_MAX_DEPTH, SolverConfig},
};

/// Common configuration shared across commands
#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct CommonConfig {
    /// Random seed for reproducibility
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Whether to show progress bars
    #[arg(long = "no-progress", global = true, action = clap::ArgAction::SetFalse)]
    pub progress: bool,

    /// Verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            seed: None,
            progress: true,
            verbose: false,
        }
    }
}

/// Rules and limits of a solve
#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Highest count a hand can hold
    #[arg(long, short = 'f', default_value_t = 4)]
    pub fingers: u8,

    /// What a tap past the limit does (`rollover` or `cutoff`)
    #[arg(long, default_value_t = Overflow::Rollover)]
    pub overflow: Overflow,

    /// Depth at which exploration stops and positions are scored heuristically
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Skip the edge validator
    #[arg(long)]
    pub no_validate: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            fingers: 4,
            overflow: Overflow::Rollover,
            max_depth: DEFAULT_MAX_DEPTH,
            no_validate: false,
        }
    }
}

impl RulesConfig {
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidRuleset`] for a zero finger limit.
    pub fn solver_config(&self) -> crate::Result<SolverConfig> {
        let ruleset = Ruleset::new(self.fingers)?.with_overflow(self.overflow);
        Ok(SolverConfig::new(ruleset)
            .with_max_depth(self.max_depth)
            .with_validation(!self.no_validate))
    }
}
