//! Game-theoretic solver for chopsticks
//!
//! Solving runs in strictly sequential phases over one [`PlayGraph`]:
//! exploration folds repeated positions and records cycles, the loop builder
//! turns cycles into components, scoring propagates values from the leaves
//! and resolves each component once its exits are known, and the validator
//! checks the edges in both directions.

pub mod config;
pub mod explorer;
pub mod graph;
pub mod loops;
pub mod scoring;
pub mod solution;
pub mod validate;

pub use config::{DEFAULT_MAX_DEPTH, SolverConfig};
pub use explorer::{Exploration, RawCycle, explore};
pub use graph::{DRAW, LoopId, NodeId, PlayGraph, PlayNode, SCORE_EPSILON, Score};
pub use loops::{
    ExitEdge, ExitSummary, LoopComponent, RingLinks, build_loop_components, close_reentry,
    has_mutual_exits, merge_mutual_exits, resolve_components,
};
pub use scoring::{ScoringLimits, ScoringReport, best_child, heuristic, propagate};
pub use solution::{BestMove, LineOutcome, PrincipalLine, SolveStats, Solution, Solver};
pub use validate::validate;
