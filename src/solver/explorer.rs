//! Depth-first exploration of the reachable position graph
//!
//! Exploration folds every repeated normalized position onto a single node
//! and records each edge that returns to a position still on the current
//! path as a raw cycle.

use std::collections::BTreeMap;

use log::{debug, info, trace};

use super::graph::{NodeId, PlayGraph};
use crate::game::{GameState, Move};

/// Ordered run of nodes along the exploration path, from the re-entered
/// node down to the node whose edge closed the cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCycle {
    nodes: Vec<NodeId>,
}

impl RawCycle {
    pub fn new(nodes: Vec<NodeId>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// The re-entered node
    pub fn head(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Everything exploration learned besides the graph itself
#[derive(Debug, Clone)]
pub struct Exploration {
    pub root: NodeId,
    /// Terminal and depth-bounded nodes, keyed by position
    pub leaves: BTreeMap<GameState, NodeId>,
    pub cycles: Vec<RawCycle>,
}

struct Frame {
    id: NodeId,
    state: GameState,
    depth: usize,
    moves: Vec<Move>,
    next: usize,
}

struct Explorer<'g> {
    graph: &'g mut PlayGraph,
    max_depth: usize,
    path: Vec<NodeId>,
    leaves: BTreeMap<GameState, NodeId>,
    cycles: Vec<RawCycle>,
}

/// Explore everything reachable from `root`, attaching children to the graph.
///
/// Positions already present in the graph are linked to but never expanded
/// twice. Nodes that are terminal, sit at `max_depth`, or have no moves
/// become leaves.
///
/// # Errors
///
/// Returns [`crate::Error::NodeAlreadyExpanded`] if `root` already has
/// children, [`crate::Error::MalformedPath`] if the path stack stops
/// mirroring the traversal, and propagates move application errors.
pub fn explore(
    graph: &mut PlayGraph,
    root: NodeId,
    max_depth: usize,
) -> crate::Result<Exploration> {
    let mut explorer = Explorer {
        graph,
        max_depth,
        path: Vec::new(),
        leaves: BTreeMap::new(),
        cycles: Vec::new(),
    };
    explorer.run(root)?;

    info!(
        "explored {} positions ({} leaves, {} raw cycles)",
        explorer.graph.len(),
        explorer.leaves.len(),
        explorer.cycles.len()
    );

    Ok(Exploration {
        root,
        leaves: explorer.leaves,
        cycles: explorer.cycles,
    })
}

impl Explorer<'_> {
    fn run(&mut self, root: NodeId) -> crate::Result<()> {
        let mut frames = Vec::new();
        self.path.push(root);
        self.enter(root, 0, &mut frames)?;

        while let Some(frame) = frames.last_mut() {
            let Some(&mv) = frame.moves.get(frame.next) else {
                let id = frame.id;
                frames.pop();
                self.leave(id)?;
                continue;
            };
            frame.next += 1;
            let (id, state, depth) = (frame.id, frame.state, frame.depth);

            let next = state.apply_move(mv, self.graph.ruleset())?.normalize();
            match self.graph.lookup(&next) {
                Some(existing) => {
                    self.graph.connect(id, mv, existing)?;
                    self.record_cycle(existing);
                }
                None => {
                    let child = self.graph.insert(next);
                    self.graph.connect(id, mv, child)?;
                    self.path.push(child);
                    self.enter(child, depth + 1, &mut frames)?;
                }
            }
        }

        if self.path.is_empty() {
            Ok(())
        } else {
            Err(crate::Error::MalformedPath {
                expected: "an empty path".to_string(),
                found: format!("{} nodes left on it", self.path.len()),
            })
        }
    }

    /// Start on a node that was just pushed on the path: expand it or record it as a leaf.
    fn enter(&mut self, id: NodeId, depth: usize, frames: &mut Vec<Frame>) -> crate::Result<()> {
        let node = self.graph.node(id);
        let state = *node.state();
        if !node.is_leaf() {
            return Err(crate::Error::NodeAlreadyExpanded {
                state: state.encode(),
            });
        }

        let moves = state.legal_moves();
        if state.is_terminal() || depth >= self.max_depth || moves.is_empty() {
            trace!("leaf {state} at depth {depth}");
            self.leaves.insert(state, id);
            return self.leave(id);
        }

        trace!("expanding {state} at depth {depth} ({} moves)", moves.len());
        frames.push(Frame {
            id,
            state,
            depth,
            moves,
            next: 0,
        });
        Ok(())
    }

    fn leave(&mut self, id: NodeId) -> crate::Result<()> {
        match self.path.pop() {
            Some(top) if top == id => Ok(()),
            top => Err(crate::Error::MalformedPath {
                expected: self.graph.label(id),
                found: match top {
                    Some(top) => format!("'{}'", self.graph.label(top)),
                    None => "an empty path".to_string(),
                },
            }),
        }
    }

    fn record_cycle(&mut self, existing: NodeId) {
        let Some(start) = self.path.iter().position(|&id| id == existing) else {
            return;
        };
        let cycle = RawCycle::new(self.path[start..].to_vec());
        debug!(
            "cycle of {} through {}",
            cycle.len(),
            self.graph.label(existing)
        );
        self.cycles.push(cycle);
    }
}
