//! Arena of play nodes addressed by stable indices
//!
//! Edges are stored as index maps in both directions: a node's children are
//! keyed by the move that reaches them, its parents by the parent's position.
//! Rewiring during exploration or loop merging is therefore an index update,
//! never a shared-reference juggling act.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fmt::{self, Write as _},
};

use crate::game::{GameState, Move, Ruleset};

/// Score in `[-1, 1]` from player one's perspective
pub type Score = f64;

/// Value of a position neither side can force
pub const DRAW: Score = 0.0;

/// Scores closer than this are the same outcome
pub const SCORE_EPSILON: Score = 1e-9;

pub(crate) fn same_score(a: Score, b: Score) -> bool {
    (a - b).abs() < SCORE_EPSILON
}

/// Stable handle of a node inside a [`PlayGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a loop component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoopId(pub(crate) usize);

impl LoopId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for LoopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// A vertex of the solved graph wrapping one normalized position
#[derive(Debug, Clone)]
pub struct PlayNode {
    state: GameState,
    children: BTreeMap<Move, NodeId>,
    parents: BTreeMap<GameState, NodeId>,
    score: Score,
    scored: bool,
    rank: usize,
    loops: BTreeSet<LoopId>,
}

impl PlayNode {
    fn new(state: GameState) -> Self {
        Self {
            state,
            children: BTreeMap::new(),
            parents: BTreeMap::new(),
            score: DRAW,
            scored: false,
            rank: usize::MAX,
            loops: BTreeSet::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Outgoing edges keyed by normalized move
    pub fn children(&self) -> &BTreeMap<Move, NodeId> {
        &self.children
    }

    /// Incoming edges keyed by the parent's position
    pub fn parents(&self) -> &BTreeMap<GameState, NodeId> {
        &self.parents
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_scored(&self) -> bool {
        self.scored
    }

    /// Score from player one's perspective, once scored
    pub fn score(&self) -> Option<Score> {
        self.scored.then_some(self.score)
    }

    /// Score from the perspective of the player to move, once scored
    pub fn score_for_mover(&self) -> Option<Score> {
        self.score().map(|score| score * self.state.to_move.sign())
    }

    /// Order in which the node was scored; lower ranks were settled first
    pub fn rank(&self) -> Option<usize> {
        self.scored.then_some(self.rank)
    }

    /// Loop components this node belongs to
    pub fn loops(&self) -> &BTreeSet<LoopId> {
        &self.loops
    }

    pub fn in_loop(&self) -> bool {
        !self.loops.is_empty()
    }
}

/// The explored position graph
#[derive(Debug, Clone)]
pub struct PlayGraph {
    ruleset: Ruleset,
    nodes: Vec<PlayNode>,
    index: HashMap<GameState, NodeId>,
}

impl PlayGraph {
    pub fn new(ruleset: Ruleset) -> Self {
        Self {
            ruleset,
            nodes: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node for the normalized form of `state`, created if it does not exist yet
    pub fn insert(&mut self, state: GameState) -> NodeId {
        let state = state.normalize();
        if let Some(&id) = self.index.get(&state) {
            return id;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(PlayNode::new(state));
        self.index.insert(state, id);
        id
    }

    /// Node for the normalized form of `state`, if explored
    pub fn lookup(&self, state: &GameState) -> Option<NodeId> {
        self.index.get(&state.normalize()).copied()
    }

    /// # Panics
    ///
    /// Panics if `id` was not issued by this graph.
    pub fn node(&self, id: NodeId) -> &PlayNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut PlayNode {
        &mut self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &PlayNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    /// Text label of a node's position
    pub fn label(&self, id: NodeId) -> String {
        self.node(id).state.encode()
    }

    /// Wire `parent --mv--> child` in both directions.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::EdgeConflict`] if `mv` from `parent` already
    /// leads to a different node.
    pub fn connect(&mut self, parent: NodeId, mv: Move, child: NodeId) -> crate::Result<()> {
        if let Some(&existing) = self.node(parent).children.get(&mv) {
            if existing != child {
                return Err(crate::Error::EdgeConflict {
                    parent: self.label(parent),
                    mv: mv.to_string(),
                    existing: self.label(existing),
                    attempted: self.label(child),
                });
            }
        }
        let parent_state = self.node(parent).state;
        self.node_mut(parent).children.insert(mv, child);
        self.node_mut(child).parents.insert(parent_state, parent);
        Ok(())
    }

    pub(crate) fn set_score(&mut self, id: NodeId, score: Score, rank: usize) {
        let node = self.node_mut(id);
        node.score = score;
        node.scored = true;
        node.rank = rank;
    }

    pub(crate) fn mark_loop(&mut self, id: NodeId, loop_id: LoopId) {
        self.node_mut(id).loops.insert(loop_id);
    }

    /// Replace every loop marker of a node with a single one
    pub(crate) fn set_loop(&mut self, id: NodeId, loop_id: LoopId) {
        let loops = &mut self.node_mut(id).loops;
        loops.clear();
        loops.insert(loop_id);
    }

    #[cfg(test)]
    pub(crate) fn detach_parent(&mut self, child: NodeId, parent: NodeId) {
        let parent_state = self.node(parent).state;
        self.node_mut(child).parents.remove(&parent_state);
    }

    #[cfg(test)]
    pub(crate) fn detach_child(&mut self, parent: NodeId, mv: Move) {
        self.node_mut(parent).children.remove(&mv);
    }

    /// Render a node with its immediate neighbourhood, for diagnostics
    pub fn describe(&self, id: NodeId) -> String {
        let node = self.node(id);
        let mut out = format!("{id} {}", node.state);
        match node.score() {
            Some(score) => {
                let _ = write!(out, " score={score:+.3}");
            }
            None => out.push_str(" unscored"),
        }
        for loop_id in &node.loops {
            let _ = write!(out, " {loop_id}");
        }
        for (mv, child) in &node.children {
            let _ = write!(out, "\n  -> {mv}: {child} {}", self.node(*child).state);
        }
        for (state, parent) in &node.parents {
            let _ = write!(out, "\n  <- {parent} {state}");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Hand;

    #[test]
    fn insert_normalizes_and_deduplicates() {
        let mut graph = PlayGraph::new(Ruleset::new(3).unwrap());
        let a = graph.insert("2,1|1,3|1".parse().unwrap());
        let b = graph.insert("1,2|3,1|1".parse().unwrap());
        assert_eq!(a, b);
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.node(a).state().encode(), "1,2|1,3|1");
        assert_eq!(graph.lookup(&"2,1|3,1|1".parse().unwrap()), Some(a));
    }

    #[test]
    fn connect_wires_both_directions() {
        let mut graph = PlayGraph::new(Ruleset::new(3).unwrap());
        let parent = graph.insert(GameState::opening());
        let child = graph.insert("1,1|1,2|2".parse().unwrap());
        let mv = Move::new(Hand::First, Hand::First);
        graph.connect(parent, mv, child).unwrap();

        assert_eq!(graph.node(parent).children().get(&mv), Some(&child));
        assert_eq!(
            graph.node(child).parents().get(&GameState::opening()),
            Some(&parent)
        );
    }

    #[test]
    fn connect_refuses_to_rewire_a_move() {
        let mut graph = PlayGraph::new(Ruleset::new(3).unwrap());
        let parent = graph.insert(GameState::opening());
        let a = graph.insert("1,1|1,2|2".parse().unwrap());
        let b = graph.insert("1,1|1,3|2".parse().unwrap());
        let mv = Move::new(Hand::First, Hand::First);
        graph.connect(parent, mv, a).unwrap();
        graph.connect(parent, mv, a).unwrap();
        assert!(matches!(
            graph.connect(parent, mv, b),
            Err(crate::Error::EdgeConflict { .. })
        ));
    }

    #[test]
    fn unscored_nodes_report_nothing() {
        let mut graph = PlayGraph::new(Ruleset::new(3).unwrap());
        let id = graph.insert("1,1|1,2|2".parse().unwrap());
        assert_eq!(graph.node(id).score(), None);
        graph.set_score(id, 0.5, 0);
        assert_eq!(graph.node(id).score(), Some(0.5));
        assert_eq!(graph.node(id).score_for_mover(), Some(-0.5));
        assert_eq!(graph.node(id).rank(), Some(0));
    }
}
