//! Configuration for a solve run.

use serde::{Deserialize, Serialize};

use super::scoring::ScoringLimits;
use crate::game::Ruleset;

/// Depth bound used when none is given; deep enough to solve the small variants outright
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// Configuration for [`Solver`](super::Solver).
///
/// # Examples
///
/// ```
/// use chopsticks::game::{Overflow, Ruleset};
/// use chopsticks::solver::SolverConfig;
///
/// let config = SolverConfig::new(Ruleset::new(3).unwrap().with_overflow(Overflow::Cutoff))
///     .with_max_depth(40)
///     .with_validation(false);
/// assert_eq!(config.max_depth, 40);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Rules the graph is explored under
    pub ruleset: Ruleset,
    /// Nodes this many moves below the start become leaves
    pub max_depth: usize,
    /// Ceiling on the parent-propagation queue; derived from the graph when unset
    pub propagation_ceiling: Option<usize>,
    /// Ceiling on each ring scoring queue; derived from the component when unset
    pub ring_ceiling: Option<usize>,
    /// Run the edge validator before and after scoring
    pub validate: bool,
}

impl SolverConfig {
    /// Create a configuration for the given rules.
    ///
    /// Uses default values for other parameters:
    /// - Max depth: [`DEFAULT_MAX_DEPTH`]
    /// - Ceilings: derived from graph size
    /// - Validation: on
    pub fn new(ruleset: Ruleset) -> Self {
        Self {
            ruleset,
            max_depth: DEFAULT_MAX_DEPTH,
            propagation_ceiling: None,
            ring_ceiling: None,
            validate: true,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_propagation_ceiling(mut self, ceiling: usize) -> Self {
        self.propagation_ceiling = Some(ceiling);
        self
    }

    pub fn with_ring_ceiling(mut self, ceiling: usize) -> Self {
        self.ring_ceiling = Some(ceiling);
        self
    }

    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Scoring limits for a graph of the given shape, explicit ceilings taking precedence
    pub fn limits(&self, nodes: usize, components: usize, largest_component: usize) -> ScoringLimits {
        let derived = ScoringLimits::for_graph(nodes, components, largest_component);
        ScoringLimits {
            propagation: self.propagation_ceiling.unwrap_or(derived.propagation),
            ring: self.ring_ceiling.unwrap_or(derived.ring),
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::new(Ruleset::traditional())
    }
}
