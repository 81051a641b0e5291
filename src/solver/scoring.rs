//! Score propagation over the explored graph
//!
//! Leaves are scored with a hand-count heuristic and values flow upward
//! through parent edges. Nodes outside loop components are scored by plain
//! minimax once all of their children are. Loop components are resolved as a
//! unit once every exit is scored: members start at the draw value and are
//! re-evaluated until no value changes.
//!
//! Every scored node receives a rank from a single increasing counter. Among
//! equally good children the lowest-ranked one is the best move, which keeps
//! optimal play from winning positions moving toward the win.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use log::{debug, info, trace};

use super::{
    graph::{DRAW, LoopId, NodeId, PlayGraph, Score, same_score},
    loops::LoopComponent,
};
use crate::game::{GameState, Move, PlayerHands};

const ELIMINATED: Score = 1.0;
const ONE_HAND_PENALTY: Score = -0.5;

/// Static evaluation of a leaf from player one's perspective.
///
/// A side with both hands out has lost; otherwise each side is penalised
/// for playing on a single hand.
///
/// ```
/// use chopsticks::game::GameState;
/// use chopsticks::solver::heuristic;
///
/// assert_eq!(heuristic(&"1,1|0,0|1".parse().unwrap()), 1.0);
/// assert_eq!(heuristic(&"0,2|1,1|1".parse().unwrap()), -0.5);
/// assert_eq!(heuristic(&"1,1|1,1|1".parse().unwrap()), 0.0);
/// ```
pub fn heuristic(state: &GameState) -> Score {
    match (state.one.is_eliminated(), state.two.is_eliminated()) {
        (true, true) => DRAW,
        (false, true) => ELIMINATED,
        (true, false) => -ELIMINATED,
        (false, false) => contribution(state.one) - contribution(state.two),
    }
}

fn contribution(hands: PlayerHands) -> Score {
    if hands.live_hands() == 1 {
        ONE_HAND_PENALTY
    } else {
        0.0
    }
}

/// Iteration ceilings for the two propagation queues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringLimits {
    /// Pops allowed on the parent-propagation queue for the whole run
    pub propagation: usize,
    /// Pops allowed on the ring queue of a single component
    pub ring: usize,
}

impl ScoringLimits {
    /// Ceilings generous enough for any well-formed graph of the given shape
    pub fn for_graph(nodes: usize, components: usize, largest_component: usize) -> Self {
        Self {
            propagation: 8 * (nodes + 1) * (components + 2),
            ring: largest_component * largest_component * 16 + 1024,
        }
    }
}

/// Counts from one propagation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoringReport {
    pub leaves: usize,
    pub propagated: usize,
    pub components: usize,
    pub loop_members: usize,
}

/// Score every node of the graph, starting from the given leaves.
///
/// # Errors
///
/// Returns [`crate::Error::IterationCeiling`] when either queue runs past its
/// limit and [`crate::Error::IncompleteScoring`] when nodes remain unscored
/// after neither the acyclic queue nor any component can make progress.
pub fn propagate(
    graph: &mut PlayGraph,
    leaves: &BTreeMap<GameState, NodeId>,
    components: &[LoopComponent],
    limits: ScoringLimits,
) -> crate::Result<ScoringReport> {
    let mut scorer = Scorer::new(graph, components, limits);
    scorer.score_leaves(leaves);
    scorer.run()?;
    scorer.ensure_complete()?;

    let report = scorer.report;
    info!(
        "scored {} leaves, {} acyclic nodes, {} loop members in {} components",
        report.leaves, report.propagated, report.loop_members, report.components
    );
    Ok(report)
}

/// Best move out of a scored node: an equally scored child, lowest rank first.
///
/// `None` for leaves and unscored nodes.
pub fn best_child(graph: &PlayGraph, id: NodeId) -> Option<(Move, NodeId)> {
    let score = graph.node(id).score()?;
    graph
        .node(id)
        .children()
        .iter()
        .filter_map(|(&mv, &child)| {
            let node = graph.node(child);
            let child_score = node.score()?;
            same_score(child_score, score).then(|| (node.rank(), mv, child))
        })
        .min_by_key(|&(rank, mv, _)| (rank, mv))
        .map(|(_, mv, child)| (mv, child))
}

struct Scorer<'g> {
    graph: &'g mut PlayGraph,
    components: BTreeMap<LoopId, &'g LoopComponent>,
    /// Exit targets per component, fixed once loops are built
    exit_targets: BTreeMap<LoopId, Vec<NodeId>>,
    resolved: BTreeSet<LoopId>,
    limits: ScoringLimits,
    queue: VecDeque<NodeId>,
    queued: HashSet<NodeId>,
    next_rank: usize,
    iterations: usize,
    report: ScoringReport,
}

impl<'g> Scorer<'g> {
    fn new(
        graph: &'g mut PlayGraph,
        components: &'g [LoopComponent],
        limits: ScoringLimits,
    ) -> Self {
        let exit_targets = components
            .iter()
            .map(|component| {
                let targets = component
                    .exits(&*graph)
                    .into_iter()
                    .map(|exit| exit.to)
                    .collect();
                (component.id(), targets)
            })
            .collect();
        Self {
            graph,
            components: components
                .iter()
                .map(|component| (component.id(), component))
                .collect(),
            exit_targets,
            resolved: BTreeSet::new(),
            limits,
            queue: VecDeque::new(),
            queued: HashSet::new(),
            next_rank: 0,
            iterations: 0,
            report: ScoringReport::default(),
        }
    }

    fn assign(&mut self, id: NodeId, score: Score) {
        self.graph.set_score(id, score, self.next_rank);
        self.next_rank += 1;
    }

    fn score_leaves(&mut self, leaves: &BTreeMap<GameState, NodeId>) {
        for (state, &id) in leaves {
            let score = heuristic(state);
            trace!("leaf {state} scores {score:+.3}");
            self.assign(id, score);
            self.report.leaves += 1;
        }
        for &id in leaves.values() {
            self.enqueue_parents(id);
        }
    }

    fn enqueue_parents(&mut self, id: NodeId) {
        let parents: Vec<NodeId> = self.graph.node(id).parents().values().copied().collect();
        for parent in parents {
            let node = self.graph.node(parent);
            if node.is_scored() || node.in_loop() {
                continue;
            }
            if self.queued.insert(parent) {
                self.queue.push_back(parent);
            }
        }
    }

    /// Minimax value once every child is scored
    fn minimax(&self, id: NodeId) -> Option<Score> {
        let node = self.graph.node(id);
        let sign = node.state().to_move.sign();
        let mut best: Option<Score> = None;
        for &child in node.children().values() {
            let value = self.graph.node(child).score()? * sign;
            if best.is_none_or(|b| value > b) {
                best = Some(value);
            }
        }
        best.map(|value| value * sign)
    }

    fn tick(&mut self) -> crate::Result<()> {
        self.iterations += 1;
        if self.iterations > self.limits.propagation {
            return Err(crate::Error::IterationCeiling {
                phase: "parent propagation",
                limit: self.limits.propagation,
            });
        }
        Ok(())
    }

    fn run(&mut self) -> crate::Result<()> {
        loop {
            let drained = self.drain()?;
            let resolved = self.resolve_ready()?;
            if resolved == 0 && !drained {
                return Ok(());
            }
        }
    }

    /// Work the acyclic queue until it empties or makes a full pass without progress.
    fn drain(&mut self) -> crate::Result<bool> {
        let mut progressed = false;
        let mut idle = 0;
        while let Some(id) = self.queue.pop_front() {
            self.tick()?;
            let node = self.graph.node(id);
            if node.is_scored() || node.in_loop() {
                self.queued.remove(&id);
                continue;
            }

            match self.minimax(id) {
                Some(score) => {
                    trace!("{} scores {score:+.3}", self.graph.label(id));
                    self.queued.remove(&id);
                    self.assign(id, score);
                    self.report.propagated += 1;
                    self.enqueue_parents(id);
                    progressed = true;
                    idle = 0;
                }
                None => {
                    self.queue.push_back(id);
                    idle += 1;
                    if idle >= self.queue.len() {
                        break;
                    }
                }
            }
        }
        Ok(progressed)
    }

    fn exits_scored(&self, component: &LoopComponent) -> bool {
        self.exit_targets
            .get(&component.id())
            .is_none_or(|targets| targets.iter().all(|&to| self.graph.node(to).is_scored()))
    }

    fn resolve_ready(&mut self) -> crate::Result<usize> {
        let ready: Vec<&'g LoopComponent> = self
            .components
            .values()
            .copied()
            .filter(|component| {
                !self.resolved.contains(&component.id()) && self.exits_scored(component)
            })
            .collect();

        for &component in &ready {
            self.resolve_loop(component)?;
            self.resolved.insert(component.id());
            self.report.components += 1;
            self.report.loop_members += component.len();
            for member in component.members() {
                self.enqueue_parents(member);
            }
        }
        Ok(ready.len())
    }

    fn ring_value(
        &self,
        id: NodeId,
        component: &LoopComponent,
        values: &BTreeMap<NodeId, Score>,
    ) -> crate::Result<Score> {
        let node = self.graph.node(id);
        let sign = node.state().to_move.sign();
        let mut best: Option<Score> = None;
        for &child in node.children().values() {
            let value = if component.contains(child) {
                values.get(&child).copied().unwrap_or(DRAW)
            } else {
                self.graph
                    .node(child)
                    .score()
                    .ok_or_else(|| crate::Error::Unscored {
                        state: self.graph.label(child),
                    })?
            };
            let value = value * sign;
            if best.is_none_or(|b| value > b) {
                best = Some(value);
            }
        }
        Ok(best.map_or(DRAW, |value| value * sign))
    }

    /// Settle a component whose exits are all scored.
    fn resolve_loop(&mut self, component: &LoopComponent) -> crate::Result<()> {
        let mut values: BTreeMap<NodeId, Score> =
            component.members().map(|id| (id, DRAW)).collect();
        let mut queue: VecDeque<NodeId> = component.members().collect();
        let mut queued: BTreeSet<NodeId> = component.members().collect();
        let mut iterations = 0;

        while let Some(id) = queue.pop_front() {
            iterations += 1;
            if iterations > self.limits.ring {
                return Err(crate::Error::IterationCeiling {
                    phase: "ring scoring",
                    limit: self.limits.ring,
                });
            }
            queued.remove(&id);

            let value = self.ring_value(id, component, &values)?;
            if same_score(value, values[&id]) {
                continue;
            }
            values.insert(id, value);
            for &parent in self.graph.node(id).parents().values() {
                if component.contains(parent) && queued.insert(parent) {
                    queue.push_back(parent);
                }
            }
        }

        let summary = component.exit_summary(self.graph);
        debug!(
            "{} resolved: {} members, {} iterations, best exits {:?}/{:?}",
            component.id(),
            component.len(),
            iterations,
            summary.best_for_one,
            summary.best_for_two
        );

        for id in self.rank_outward(component, &values) {
            self.assign(id, values[&id]);
        }
        Ok(())
    }

    /// Order members outward from the exits.
    ///
    /// A member whose mover comes out ahead follows one child carrying its
    /// value; a member whose mover is behind follows all of its children, so
    /// ranks fall along every line where the side ahead plays its best move.
    /// Members whose value is only supported from inside the component come last.
    fn rank_outward(
        &self,
        component: &LoopComponent,
        values: &BTreeMap<NodeId, Score>,
    ) -> Vec<NodeId> {
        let value_of = |id: NodeId| values.get(&id).copied().or(self.graph.node(id).score());
        let mut order = Vec::with_capacity(component.len());
        let mut placed: BTreeSet<NodeId> = BTreeSet::new();
        let mut pending: BTreeSet<NodeId> = component.members().collect();

        loop {
            let wave: Vec<NodeId> = pending
                .iter()
                .copied()
                .filter(|&id| {
                    let node = self.graph.node(id);
                    let value = values[&id];
                    let settled = |child: NodeId| !component.contains(child) || placed.contains(&child);
                    let mut children = node.children().values().copied();
                    if value * node.state().to_move.sign() < DRAW {
                        children.all(settled)
                    } else {
                        children.any(|child| {
                            settled(child) && value_of(child).is_some_and(|v| same_score(v, value))
                        })
                    }
                })
                .collect();
            if wave.is_empty() {
                break;
            }
            for id in wave {
                pending.remove(&id);
                placed.insert(id);
                order.push(id);
            }
        }

        order.extend(pending);
        order
    }

    fn ensure_complete(&self) -> crate::Result<()> {
        let mut unscored = self
            .graph
            .nodes()
            .filter(|(_, node)| !node.is_scored())
            .map(|(id, _)| id);
        match unscored.next() {
            None => Ok(()),
            Some(first) => Err(crate::Error::IncompleteScoring {
                remaining: 1 + unscored.count(),
                example: self.graph.describe(first),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        game::{Hand, Player, Ruleset},
        solver::{
            explorer::{RawCycle, explore},
            loops::{build_loop_components, resolve_components},
        },
    };

    const A: Move = Move::new(Hand::First, Hand::First);
    const B: Move = Move::new(Hand::First, Hand::Second);

    fn limits() -> ScoringLimits {
        ScoringLimits::for_graph(64, 4, 16)
    }

    fn solve(label: &str, fingers: u8) -> (PlayGraph, NodeId) {
        let mut graph = PlayGraph::new(Ruleset::new(fingers).unwrap());
        let root = graph.insert(label.parse().unwrap());
        let exploration = explore(&mut graph, root, 1000).unwrap();
        let components = resolve_components(&mut graph, &exploration.cycles).unwrap();
        let limits = ScoringLimits::for_graph(graph.len(), components.len(), 200);
        propagate(&mut graph, &exploration.leaves, &components, limits).unwrap();
        (graph, root)
    }

    /// Two-node ring `a <-> b` plus optional exits: `(from ring index, leaf label)`
    fn ring(exits: &[(usize, &str)]) -> (PlayGraph, Vec<NodeId>, BTreeMap<GameState, NodeId>) {
        let mut graph = PlayGraph::new(Ruleset::new(4).unwrap());
        let a = graph.insert("1,1|1,2|1".parse().unwrap());
        let b = graph.insert("1,1|1,3|2".parse().unwrap());
        graph.connect(a, A, b).unwrap();
        graph.connect(b, A, a).unwrap();

        let members = [a, b];
        let mut leaves = BTreeMap::new();
        for &(from, label) in exits {
            let state: GameState = label.parse().unwrap();
            let leaf = graph.insert(state);
            graph.connect(members[from], B, leaf).unwrap();
            leaves.insert(state.normalize(), leaf);
        }
        (graph, vec![a, b], leaves)
    }

    fn score_ring(
        graph: &mut PlayGraph,
        ids: &[NodeId],
        leaves: &BTreeMap<GameState, NodeId>,
    ) -> ScoringReport {
        let components =
            build_loop_components(graph, &[RawCycle::new(ids.to_vec())]).unwrap();
        propagate(graph, leaves, &components, limits()).unwrap()
    }

    #[test]
    fn heuristic_scores_eliminations_and_single_hands() {
        assert_eq!(heuristic(&"0,0|1,2|2".parse().unwrap()), -1.0);
        assert_eq!(heuristic(&"0,0|0,0|1".parse().unwrap()), DRAW);
        assert_eq!(heuristic(&"0,2|0,1|1".parse().unwrap()), 0.0);
        assert_eq!(heuristic(&"1,2|0,1|2".parse().unwrap()), 0.5);
    }

    #[test]
    fn immediate_win_scores_for_the_mover() {
        // 1 + 3 rolls over to zero on a 3-finger hand
        let (graph, root) = solve("0,1|0,3|1", 3);
        assert_eq!(graph.node(root).score(), Some(1.0));
        let (mv, child) = best_child(&graph, root).unwrap();
        assert_eq!(mv, Move::new(Hand::Second, Hand::Second));
        assert_eq!(graph.node(child).state().winner(), Some(Player::One));
    }

    #[test]
    fn ring_without_exits_is_a_draw() {
        let (mut graph, ids, leaves) = ring(&[]);
        let report = score_ring(&mut graph, &ids, &leaves);
        assert_eq!(report.components, 1);
        for id in ids {
            assert_eq!(graph.node(id).score(), Some(DRAW));
        }
    }

    #[test]
    fn unfavourable_exit_leaves_the_ring_drawn() {
        // player one to move at `a` may only leave into a loss
        let (mut graph, ids, leaves) = ring(&[(0, "0,0|1,3|2")]);
        score_ring(&mut graph, &ids, &leaves);
        assert_eq!(graph.node(ids[0]).score(), Some(DRAW));
        assert_eq!(graph.node(ids[1]).score(), Some(DRAW));
        assert_eq!(best_child(&graph, ids[0]).map(|(mv, _)| mv), Some(A));
    }

    #[test]
    fn winning_exit_spreads_around_the_ring() {
        // player two to move at `b` can leave into a win for player two
        let (mut graph, ids, leaves) = ring(&[(1, "0,0|1,3|1")]);
        score_ring(&mut graph, &ids, &leaves);
        assert_eq!(graph.node(ids[1]).score(), Some(-1.0));
        assert_eq!(graph.node(ids[0]).score(), Some(-1.0));

        // the winner heads for the exit instead of circling
        let (mv, exit) = best_child(&graph, ids[1]).unwrap();
        assert_eq!(mv, B);
        assert!(graph.node(exit).state().is_terminal());
        assert!(graph.node(ids[0]).rank() > graph.node(ids[1]).rank());
    }

    #[test]
    fn each_side_keeps_its_own_exit() {
        // both sides can leave: player one into a half-won leaf, player two into a half-won leaf
        let (mut graph, ids, leaves) = ring(&[(0, "1,2|0,1|2"), (1, "0,2|1,2|1")]);
        score_ring(&mut graph, &ids, &leaves);
        assert_eq!(graph.node(ids[0]).score(), Some(0.5));
        assert_eq!(graph.node(ids[1]).score(), Some(-0.5));
    }

    #[test]
    fn inner_cycle_the_defender_can_hold_stays_drawn() {
        // a -> {b, win}, b -> {a, c}, c -> d, d -> {c, b}: player two holds c <-> d forever
        let mut graph = PlayGraph::new(Ruleset::new(4).unwrap());
        let a = graph.insert("1,1|1,2|1".parse().unwrap());
        let b = graph.insert("1,1|1,3|2".parse().unwrap());
        let c = graph.insert("1,2|1,2|1".parse().unwrap());
        let d = graph.insert("1,2|1,3|2".parse().unwrap());
        let win: GameState = "1,1|0,0|2".parse().unwrap();
        let leaf = graph.insert(win);
        graph.connect(a, A, b).unwrap();
        graph.connect(a, B, leaf).unwrap();
        graph.connect(b, A, a).unwrap();
        graph.connect(b, B, c).unwrap();
        graph.connect(c, A, d).unwrap();
        graph.connect(d, A, c).unwrap();
        graph.connect(d, B, b).unwrap();

        let cycles = [
            RawCycle::new(vec![a, b]),
            RawCycle::new(vec![b, c, d]),
            RawCycle::new(vec![c, d]),
        ];
        let components = resolve_components(&mut graph, &cycles).unwrap();
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].len(), 4);

        let leaves = BTreeMap::from([(win, leaf)]);
        propagate(&mut graph, &leaves, &components, limits()).unwrap();
        assert_eq!(graph.node(a).score(), Some(1.0));
        assert_eq!(graph.node(b).score(), Some(DRAW));
        assert_eq!(graph.node(c).score(), Some(DRAW));
        assert_eq!(graph.node(d).score(), Some(DRAW));

        assert_eq!(best_child(&graph, a), Some((B, leaf)));
        // player two steers away from `a` and into the inner cycle
        assert_eq!(best_child(&graph, b), Some((B, c)));
    }

    #[test]
    fn parents_of_a_ring_wait_for_it() {
        let (mut graph, ids, mut leaves) = ring(&[(1, "0,0|1,3|1")]);
        let entry = graph.insert("2,2|1,2|2".parse().unwrap());
        graph.connect(entry, A, ids[0]).unwrap();
        let side = graph.insert("1,1|0,0|1".parse().unwrap());
        graph.connect(entry, B, side).unwrap();
        leaves.insert(*graph.node(side).state(), side);

        score_ring(&mut graph, &ids, &leaves);
        // player two prefers entering the ring it wins over the immediate loss
        assert_eq!(graph.node(entry).score(), Some(-1.0));
        assert_eq!(best_child(&graph, entry), Some((A, ids[0])));
    }

    #[test]
    fn unresolvable_nodes_are_reported() {
        let (mut graph, ids, leaves) = ring(&[]);
        let err = propagate(&mut graph, &leaves, &[], limits()).unwrap_err();
        match err {
            crate::Error::IncompleteScoring { remaining, .. } => assert_eq!(remaining, ids.len()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn propagation_ceiling_is_enforced() {
        let mut graph = PlayGraph::new(Ruleset::new(3).unwrap());
        let root = graph.insert(GameState::opening());
        let exploration = explore(&mut graph, root, 1000).unwrap();
        let components = resolve_components(&mut graph, &exploration.cycles).unwrap();
        let tight = ScoringLimits {
            propagation: 3,
            ring: 1024,
        };
        assert!(matches!(
            propagate(&mut graph, &exploration.leaves, &components, tight),
            Err(crate::Error::IterationCeiling {
                phase: "parent propagation",
                ..
            })
        ));
    }

    #[test]
    fn best_moves_from_won_positions_reach_the_win() {
        let (graph, _) = solve("1,1|1,1|1", 3);
        for (id, node) in graph.nodes() {
            let Some(score) = node.score() else { continue };
            if node.is_leaf() || !same_score(score.abs(), 1.0) {
                continue;
            }
            let mut current = id;
            for _ in 0..=graph.len() {
                match best_child(&graph, current) {
                    Some((_, next)) => current = next,
                    None => break,
                }
            }
            assert!(graph.node(current).state().is_terminal(), "{}", graph.describe(id));
        }
    }
}
