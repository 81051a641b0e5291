//! Solve driver and lookups on the solved graph

use std::collections::{BTreeMap, HashSet};

use log::info;
use serde::Serialize;

use super::{
    config::SolverConfig,
    explorer::explore,
    graph::{NodeId, PlayGraph, PlayNode, Score},
    loops::{LoopComponent, resolve_components},
    scoring::{best_child, propagate},
    validate::validate,
};
use crate::game::{GameState, Move, Player, Ruleset};

/// Runs exploration, loop building, scoring and validation in sequence
#[derive(Debug, Clone, Default)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve every position reachable from `start`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chopsticks::game::{GameState, Ruleset};
    /// use chopsticks::solver::{Solver, SolverConfig};
    ///
    /// let solver = Solver::new(SolverConfig::new(Ruleset::new(3).unwrap()));
    /// let solution = solver.solve(GameState::opening()).unwrap();
    /// assert!(solution.stats().components > 0);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidHandCount`] if `start` does not fit the
    /// ruleset, and any construction, merge, scoring or validation error
    /// raised along the way.
    pub fn solve(&self, start: GameState) -> crate::Result<Solution> {
        let ruleset = self.config.ruleset;
        start.check(&ruleset)?;
        info!("solving {start} under {ruleset} rules");

        let mut graph = PlayGraph::new(ruleset);
        let root = graph.insert(start);
        let exploration = explore(&mut graph, root, self.config.max_depth)?;
        if self.config.validate {
            validate(&graph, root, true)?;
        }

        let components = resolve_components(&mut graph, &exploration.cycles)?;
        let largest = components.iter().map(LoopComponent::len).max().unwrap_or(0);
        let limits = self.config.limits(graph.len(), components.len(), largest);
        let report = propagate(&mut graph, &exploration.leaves, &components, limits)?;

        let depths = if self.config.validate {
            Some(validate(&graph, root, true)?)
        } else {
            None
        };

        let root_score = graph
            .node(root)
            .score()
            .ok_or_else(|| crate::Error::Unscored {
                state: graph.label(root),
            })?;

        let stats = SolveStats {
            ruleset,
            nodes: graph.len(),
            leaves: exploration.leaves.len(),
            raw_cycles: exploration.cycles.len(),
            components: components.len(),
            loop_members: report.loop_members,
            leaf_depths: depths,
            root_score,
        };
        info!(
            "solved {} positions, root {} scores {root_score:+.3}",
            stats.nodes,
            graph.label(root)
        );

        Ok(Solution {
            graph,
            root,
            start,
            components,
            leaves: exploration.leaves,
            stats,
        })
    }
}

/// Summary of a solve run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SolveStats {
    pub ruleset: Ruleset,
    pub nodes: usize,
    pub leaves: usize,
    pub raw_cycles: usize,
    pub components: usize,
    pub loop_members: usize,
    /// Shallowest and deepest leaf, when validation ran
    pub leaf_depths: Option<(usize, usize)>,
    /// Root score from player one's perspective
    pub root_score: Score,
}

/// The engine's choice in one position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestMove {
    /// Move relative to the normalized position
    pub mv: Move,
    /// Score from the perspective of the player making the move
    pub score: Score,
    /// Normalized position after the move
    pub next: GameState,
}

/// How a line of best play ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineOutcome {
    Win(Player),
    /// A position came up a second time
    Repetition,
    /// The ply limit or the explored graph ran out before a winner emerged
    Truncated,
}

/// Best play for both sides from the root
#[derive(Debug, Clone, PartialEq)]
pub struct PrincipalLine {
    pub positions: Vec<GameState>,
    pub moves: Vec<Move>,
    pub outcome: LineOutcome,
}

/// A fully scored play graph
#[derive(Debug, Clone)]
pub struct Solution {
    graph: PlayGraph,
    root: NodeId,
    start: GameState,
    components: Vec<LoopComponent>,
    leaves: BTreeMap<GameState, NodeId>,
    stats: SolveStats,
}

impl Solution {
    pub fn graph(&self) -> &PlayGraph {
        &self.graph
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The position the solve started from, as given
    pub fn start(&self) -> GameState {
        self.start
    }

    pub fn ruleset(&self) -> &Ruleset {
        self.graph.ruleset()
    }

    pub fn components(&self) -> &[LoopComponent] {
        &self.components
    }

    pub fn leaves(&self) -> &BTreeMap<GameState, NodeId> {
        &self.leaves
    }

    pub fn stats(&self) -> &SolveStats {
        &self.stats
    }

    /// Node of the normalized form of `state`, if it was explored
    pub fn node_for(&self, state: &GameState) -> Option<&PlayNode> {
        self.graph.lookup(state).map(|id| self.graph.node(id))
    }

    /// Best move for the player to move in `state`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::PositionNotFound`] if the position was never
    /// explored, [`crate::Error::NoMovesAvailable`] for leaves and
    /// [`crate::Error::Unscored`] if the position has no score.
    pub fn best_move(&self, state: &GameState) -> crate::Result<BestMove> {
        let id = self
            .graph
            .lookup(state)
            .ok_or_else(|| crate::Error::PositionNotFound {
                state: state.normalize().encode(),
            })?;
        let node = self.graph.node(id);
        if node.is_leaf() {
            return Err(crate::Error::NoMovesAvailable {
                state: node.state().encode(),
            });
        }
        let score = node
            .score_for_mover()
            .ok_or_else(|| crate::Error::Unscored {
                state: node.state().encode(),
            })?;
        let (mv, child) = best_child(&self.graph, id).ok_or_else(|| crate::Error::Unscored {
            state: node.state().encode(),
        })?;

        Ok(BestMove {
            mv,
            score,
            next: *self.graph.node(child).state(),
        })
    }

    /// Follow best moves for both sides from the root for at most `max_plies` moves.
    pub fn principal_line(&self, max_plies: usize) -> PrincipalLine {
        let mut current = self.root;
        let mut positions = vec![*self.graph.node(current).state()];
        let mut moves = Vec::new();
        let mut seen = HashSet::from([current]);

        let outcome = loop {
            let state = self.graph.node(current).state();
            if let Some(winner) = state.winner() {
                break LineOutcome::Win(winner);
            }
            if moves.len() >= max_plies {
                break LineOutcome::Truncated;
            }
            let Some((mv, next)) = best_child(&self.graph, current) else {
                break LineOutcome::Truncated;
            };
            moves.push(mv);
            positions.push(*self.graph.node(next).state());
            if !seen.insert(next) {
                break LineOutcome::Repetition;
            }
            current = next;
        };

        PrincipalLine {
            positions,
            moves,
            outcome,
        }
    }

    /// Re-run the edge validator over the whole graph.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::EdgeMismatch`] for the first one-sided edge.
    pub fn validate(&self) -> crate::Result<(usize, usize)> {
        validate(&self.graph, self.root, true)
    }
}
