//! Loop components: maximal cyclic regions of the play graph
//!
//! Raw cycles recorded during exploration are grouped into components with a
//! union-find over [`LoopId`]s. A cycle touching an existing component is
//! absorbed into it; components whose exits lead into each other are merged;
//! finally each component swallows every node that both depends on it and
//! feeds back into it. What remains are cyclic regions that can be scored one
//! at a time, each after all of its exits.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info};

use super::{
    explorer::RawCycle,
    graph::{LoopId, NodeId, PlayGraph, Score},
};
use crate::game::{Move, Player};

/// Forward and backward ring links of one member
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RingLinks {
    pub next: BTreeSet<NodeId>,
    pub prev: BTreeSet<NodeId>,
}

/// An edge leaving a loop component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExitEdge {
    pub from: NodeId,
    pub mv: Move,
    pub to: NodeId,
}

/// Best scored exit available to each side, from that side's own perspective
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExitSummary {
    pub best_for_one: Option<Score>,
    pub best_for_two: Option<Score>,
}

impl ExitSummary {
    pub fn best_for(&self, player: Player) -> Option<Score> {
        match player {
            Player::One => self.best_for_one,
            Player::Two => self.best_for_two,
        }
    }

    fn offer(&mut self, player: Player, value: Score) {
        let slot = match player {
            Player::One => &mut self.best_for_one,
            Player::Two => &mut self.best_for_two,
        };
        if slot.is_none_or(|best| value > best) {
            *slot = Some(value);
        }
    }
}

/// A ring of nodes whose values depend on each other
#[derive(Debug, Clone)]
pub struct LoopComponent {
    id: LoopId,
    head: NodeId,
    ring: BTreeMap<NodeId, RingLinks>,
}

impl LoopComponent {
    fn new(id: LoopId, head: NodeId) -> Self {
        Self {
            id,
            head,
            ring: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> LoopId {
        self.id
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.ring.contains_key(&id)
    }

    pub fn members(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ring.keys().copied()
    }

    pub fn links(&self, id: NodeId) -> Option<&RingLinks> {
        self.ring.get(&id)
    }

    /// Every graph edge from a member to a node outside the component
    pub fn exits(&self, graph: &PlayGraph) -> Vec<ExitEdge> {
        self.members()
            .flat_map(|from| {
                graph
                    .node(from)
                    .children()
                    .iter()
                    .filter(|(_, to)| !self.contains(**to))
                    .map(move |(&mv, &to)| ExitEdge { from, mv, to })
            })
            .collect()
    }

    /// Best already-scored exit per side, grouped by who moves at the exiting node
    pub fn exit_summary(&self, graph: &PlayGraph) -> ExitSummary {
        let mut summary = ExitSummary::default();
        for exit in self.exits(graph) {
            let mover = graph.node(exit.from).state().to_move;
            if let Some(score) = graph.node(exit.to).score() {
                summary.offer(mover, score * mover.sign());
            }
        }
        summary
    }

    fn touch(&mut self, id: NodeId) {
        self.ring.entry(id).or_default();
    }

    fn link(&mut self, from: NodeId, to: NodeId) {
        self.ring.entry(from).or_default().next.insert(to);
        self.ring.entry(to).or_default().prev.insert(from);
    }

    fn absorb_ring(&mut self, other: LoopComponent) {
        for (id, links) in other.ring {
            let entry = self.ring.entry(id).or_default();
            entry.next.extend(links.next);
            entry.prev.extend(links.prev);
        }
    }

    fn has_prev(&self, id: NodeId) -> bool {
        self.ring.get(&id).is_some_and(|links| !links.prev.is_empty())
    }
}

/// Two components must merge when each has an exit landing inside the other
pub fn has_mutual_exits(graph: &PlayGraph, a: &LoopComponent, b: &LoopComponent) -> bool {
    let lands_in = |from: &LoopComponent, into: &LoopComponent| {
        from.exits(graph).iter().any(|exit| into.contains(exit.to))
    };
    lands_in(a, b) && lands_in(b, a)
}

/// Union-find over loop identifiers with path compression
#[derive(Debug, Clone, Default)]
struct DisjointSets {
    parent: Vec<usize>,
}

impl DisjointSets {
    fn make(&mut self) -> usize {
        let id = self.parent.len();
        self.parent.push(id);
        id
    }

    fn reserve_to(&mut self, len: usize) {
        while self.parent.len() < len {
            self.make();
        }
    }

    fn find(&mut self, id: usize) -> usize {
        let mut root = id;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut current = id;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    fn union_into(&mut self, survivor: usize, absorbed: usize) {
        let survivor = self.find(survivor);
        let absorbed = self.find(absorbed);
        if survivor != absorbed {
            self.parent[absorbed] = survivor;
        }
    }
}

/// Strongly connected regions of the whole graph, found once by Tarjan's algorithm
struct Regions {
    region: Vec<usize>,
    members: Vec<Vec<NodeId>>,
}

impl Regions {
    const UNSEEN: usize = usize::MAX;

    fn of(graph: &PlayGraph) -> Self {
        let n = graph.len();
        let mut index = vec![Self::UNSEEN; n];
        let mut low = vec![0; n];
        let mut on_stack = vec![false; n];
        let mut stack: Vec<NodeId> = Vec::new();
        let mut region = vec![Self::UNSEEN; n];
        let mut members: Vec<Vec<NodeId>> = Vec::new();
        let mut counter = 0;

        for (root, _) in graph.nodes() {
            if index[root.index()] != Self::UNSEEN {
                continue;
            }
            // (node, position of the next child to visit)
            let mut frames = vec![(root, 0)];
            index[root.index()] = counter;
            low[root.index()] = counter;
            counter += 1;
            stack.push(root);
            on_stack[root.index()] = true;

            while let Some(&(id, pos)) = frames.last() {
                let next = graph.node(id).children().values().nth(pos).copied();
                let Some(child) = next else {
                    frames.pop();
                    if let Some(&(parent, _)) = frames.last() {
                        low[parent.index()] = low[parent.index()].min(low[id.index()]);
                    }
                    if low[id.index()] == index[id.index()] {
                        let mut group = Vec::new();
                        while let Some(member) = stack.pop() {
                            on_stack[member.index()] = false;
                            region[member.index()] = members.len();
                            group.push(member);
                            if member == id {
                                break;
                            }
                        }
                        members.push(group);
                    }
                    continue;
                };

                if let Some(top) = frames.last_mut() {
                    top.1 += 1;
                }
                let c = child.index();
                if index[c] == Self::UNSEEN {
                    index[c] = counter;
                    low[c] = counter;
                    counter += 1;
                    stack.push(child);
                    on_stack[c] = true;
                    frames.push((child, 0));
                } else if on_stack[c] {
                    low[id.index()] = low[id.index()].min(index[c]);
                }
            }
        }

        Self { region, members }
    }

    fn region_of(&self, id: NodeId) -> &[NodeId] {
        self.region
            .get(id.index())
            .and_then(|&r| self.members.get(r))
            .map_or(&[], Vec::as_slice)
    }

    /// Nodes outside the component that are both reachable from it and able to reach it
    fn stranded(&self, component: &LoopComponent) -> BTreeSet<NodeId> {
        self.region_of(component.head())
            .iter()
            .copied()
            .filter(|&id| !component.contains(id))
            .collect()
    }
}

struct LoopBuilder<'g> {
    graph: &'g mut PlayGraph,
    sets: DisjointSets,
    components: BTreeMap<LoopId, LoopComponent>,
}

impl<'g> LoopBuilder<'g> {
    fn new(graph: &'g mut PlayGraph) -> Self {
        Self {
            graph,
            sets: DisjointSets::default(),
            components: BTreeMap::new(),
        }
    }

    fn with_components(graph: &'g mut PlayGraph, components: Vec<LoopComponent>) -> Self {
        let mut builder = Self::new(graph);
        let len = components
            .iter()
            .map(|component| component.id.0 + 1)
            .max()
            .unwrap_or(0);
        builder.sets.reserve_to(len);
        builder.components = components
            .into_iter()
            .map(|component| (component.id, component))
            .collect();
        builder
    }

    fn root(&mut self, id: LoopId) -> LoopId {
        LoopId(self.sets.find(id.0))
    }

    fn roots_of(&mut self, node: NodeId) -> BTreeSet<LoopId> {
        let markers: Vec<LoopId> = self.graph.node(node).loops().iter().copied().collect();
        markers.into_iter().map(|marker| self.root(marker)).collect()
    }

    fn check_edge(&self, from: NodeId, to: NodeId) -> crate::Result<()> {
        if self.graph.node(from).children().values().any(|&c| c == to) {
            Ok(())
        } else {
            Err(crate::Error::BrokenRing {
                from: self.graph.label(from),
                to: self.graph.label(to),
            })
        }
    }

    fn add_cycle(&mut self, cycle: &RawCycle) -> crate::Result<()> {
        let nodes = cycle.nodes();
        let Some(head) = cycle.head() else {
            return Ok(());
        };

        let mut touched = BTreeSet::new();
        for &node in nodes {
            touched.extend(self.roots_of(node));
        }

        let fresh = LoopId(self.sets.make());
        let mut component = LoopComponent::new(fresh, head);
        let closing = nodes.iter().zip(nodes.iter().cycle().skip(1));
        for (&from, &to) in closing {
            self.check_edge(from, to)?;
            component.link(from, to);
        }
        for &node in nodes {
            self.graph.mark_loop(node, fresh);
        }
        self.components.insert(fresh, component);

        if touched.is_empty() {
            return Ok(());
        }

        // Absorb the new ring (and anything else it touches) into the biggest existing component.
        let survivor = touched
            .iter()
            .copied()
            .max_by_key(|id| (self.components[id].len(), std::cmp::Reverse(*id)))
            .unwrap_or(fresh);
        for absorbed in touched.into_iter().chain([fresh]) {
            if absorbed != survivor {
                self.merge_into(survivor, absorbed)?;
            }
        }
        Ok(())
    }

    /// Fold `absorbed` into `survivor`, turning edges between them into ring links.
    fn merge_into(&mut self, survivor: LoopId, absorbed: LoopId) -> crate::Result<()> {
        let survivor = self.root(survivor);
        let absorbed = self.root(absorbed);
        if survivor == absorbed {
            return Ok(());
        }

        let Some(absorbed_component) = self.components.remove(&absorbed) else {
            return Ok(());
        };
        for node in absorbed_component.members() {
            if !self.roots_of(node).contains(&absorbed) {
                return Err(crate::Error::MembershipConflict {
                    state: self.graph.label(node),
                    expected: absorbed.0,
                    found: self.marker_list(node),
                });
            }
        }

        let Some(mut survivor_component) = self.components.remove(&survivor) else {
            return Err(crate::Error::MembershipConflict {
                state: self.graph.label(absorbed_component.head),
                expected: survivor.0,
                found: "no surviving component".to_string(),
            });
        };

        let mut bridges = Vec::new();
        for (from, into) in [
            (&survivor_component, &absorbed_component),
            (&absorbed_component, &survivor_component),
        ] {
            for exit in from.exits(&*self.graph) {
                if !into.contains(exit.to) {
                    continue;
                }
                if !from.has_prev(exit.from) {
                    return Err(crate::Error::OrphanExit {
                        from: self.graph.label(exit.from),
                        to: self.graph.label(exit.to),
                    });
                }
                bridges.push((exit.from, exit.to));
            }
        }

        debug!(
            "merging {absorbed} ({} nodes) into {survivor} ({} nodes), {} bridging edges",
            absorbed_component.len(),
            survivor_component.len(),
            bridges.len()
        );

        self.sets.union_into(survivor.0, absorbed.0);
        let members: Vec<NodeId> = absorbed_component.members().collect();
        survivor_component.absorb_ring(absorbed_component);
        for (from, to) in bridges {
            survivor_component.link(from, to);
        }
        for node in members {
            self.graph.mark_loop(node, survivor);
        }
        self.components.insert(survivor, survivor_component);
        Ok(())
    }

    fn marker_list(&self, node: NodeId) -> String {
        let markers: Vec<String> = self
            .graph
            .node(node)
            .loops()
            .iter()
            .map(LoopId::to_string)
            .collect();
        format!("[{}]", markers.join(", "))
    }

    fn larger_first(&self, a: LoopId, b: LoopId) -> (LoopId, LoopId) {
        if self.components[&b].len() > self.components[&a].len() {
            (b, a)
        } else {
            (a, b)
        }
    }

    fn find_mutual_pair(&self) -> Option<(LoopId, LoopId)> {
        let ids: Vec<LoopId> = self.components.keys().copied().collect();
        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                if has_mutual_exits(&*self.graph, &self.components[&a], &self.components[&b]) {
                    return Some((a, b));
                }
            }
        }
        None
    }

    fn merge_mutual_exits(&mut self) -> crate::Result<usize> {
        let mut merges = 0;
        while let Some((a, b)) = self.find_mutual_pair() {
            let (survivor, absorbed) = self.larger_first(a, b);
            self.merge_into(survivor, absorbed)?;
            merges += 1;
        }
        Ok(merges)
    }

    fn close_reentry(&mut self) -> crate::Result<usize> {
        let regions = Regions::of(&*self.graph);
        let mut adopted_total = 0;
        loop {
            let mut changed = false;
            let ids: Vec<LoopId> = self.components.keys().copied().collect();
            for id in ids {
                let Some(component) = self.components.get(&id) else {
                    continue;
                };
                let stranded = regions.stranded(component);
                if stranded.is_empty() {
                    continue;
                }
                changed = true;

                let mut loose = Vec::new();
                for &node in &stranded {
                    let owners = self.roots_of(node);
                    if owners.is_empty() {
                        loose.push(node);
                    }
                    for owner in owners {
                        let current = self.root(id);
                        let (survivor, absorbed) = self.larger_first(current, owner);
                        self.merge_into(survivor, absorbed)?;
                    }
                }

                let root = self.root(id);
                self.adopt(root, &loose);
                adopted_total += loose.len();
            }
            if !changed {
                break;
            }
        }
        Ok(adopted_total)
    }

    /// Make loose nodes members of `root`, linking every edge they share with it.
    fn adopt(&mut self, root: LoopId, loose: &[NodeId]) {
        if loose.is_empty() {
            return;
        }
        let Some(mut component) = self.components.remove(&root) else {
            return;
        };
        for &node in loose {
            component.touch(node);
            self.graph.mark_loop(node, root);
        }
        for &node in loose {
            let graph = &*self.graph;
            let children: Vec<NodeId> = graph.node(node).children().values().copied().collect();
            let parents: Vec<NodeId> = graph.node(node).parents().values().copied().collect();
            for child in children {
                if component.contains(child) {
                    component.link(node, child);
                }
            }
            for parent in parents {
                if component.contains(parent) {
                    component.link(parent, node);
                }
            }
        }
        debug!(
            "{root} adopted {} re-entrant nodes ({} total)",
            loose.len(),
            component.len()
        );
        self.components.insert(root, component);
    }

    /// Hand back the surviving components with every member's markers pointing at its root.
    fn finish(mut self) -> Vec<LoopComponent> {
        let components: Vec<LoopComponent> = std::mem::take(&mut self.components)
            .into_values()
            .collect();
        for component in &components {
            for node in component.members() {
                self.graph.set_loop(node, component.id);
            }
        }
        components
    }
}

/// Group raw cycles into loop components.
///
/// A cycle sharing a node with an existing component is absorbed into it.
///
/// # Errors
///
/// Returns [`crate::Error::BrokenRing`] if consecutive cycle nodes are not
/// linked in the graph, and merge errors from absorbing overlapping cycles.
pub fn build_loop_components(
    graph: &mut PlayGraph,
    cycles: &[RawCycle],
) -> crate::Result<Vec<LoopComponent>> {
    let mut builder = LoopBuilder::new(graph);
    for cycle in cycles {
        builder.add_cycle(cycle)?;
    }
    Ok(builder.finish())
}

/// Merge components until no two have exits landing in each other.
///
/// The larger component of each pair survives; edges between the pair
/// become ring links and all other exits carry over.
///
/// # Errors
///
/// Returns [`crate::Error::OrphanExit`] or
/// [`crate::Error::MembershipConflict`] if component bookkeeping is broken.
pub fn merge_mutual_exits(
    graph: &mut PlayGraph,
    components: Vec<LoopComponent>,
) -> crate::Result<Vec<LoopComponent>> {
    let mut builder = LoopBuilder::with_components(graph, components);
    let merges = builder.merge_mutual_exits()?;
    if merges > 0 {
        debug!("{merges} mutual-exit merges");
    }
    Ok(builder.finish())
}

/// Grow every component over the nodes that lead out of it and back in.
///
/// # Errors
///
/// Propagates merge errors when a re-entrant path runs through another component.
pub fn close_reentry(
    graph: &mut PlayGraph,
    components: Vec<LoopComponent>,
) -> crate::Result<Vec<LoopComponent>> {
    let mut builder = LoopBuilder::with_components(graph, components);
    let adopted = builder.close_reentry()?;
    if adopted > 0 {
        debug!("{adopted} nodes adopted through re-entry");
    }
    Ok(builder.finish())
}

/// Run the full pipeline: build, merge mutual exits, close over re-entry.
///
/// # Errors
///
/// See [`build_loop_components`], [`merge_mutual_exits`] and [`close_reentry`].
pub fn resolve_components(
    graph: &mut PlayGraph,
    cycles: &[RawCycle],
) -> crate::Result<Vec<LoopComponent>> {
    let components = build_loop_components(graph, cycles)?;
    let built = components.len();
    let components = merge_mutual_exits(graph, components)?;
    let components = close_reentry(graph, components)?;
    info!(
        "{} raw cycles grouped into {built} components, {} after merging",
        cycles.len(),
        components.len()
    );
    Ok(components)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameState, Hand, Ruleset};

    const A: Move = Move::new(Hand::First, Hand::First);
    const B: Move = Move::new(Hand::First, Hand::Second);
    const C: Move = Move::new(Hand::Second, Hand::First);

    fn positions(count: usize) -> Vec<GameState> {
        (0..count)
            .map(|i| {
                let player = if i % 2 == 0 { "1" } else { "2" };
                format!("1,{}|1,{}|{player}", 1 + i / 4, 1 + i % 4)
                    .parse()
                    .unwrap()
            })
            .collect()
    }

    fn graph_with(count: usize, edges: &[(usize, Move, usize)]) -> (PlayGraph, Vec<NodeId>) {
        let mut graph = PlayGraph::new(Ruleset::new(4).unwrap());
        let ids: Vec<NodeId> = positions(count)
            .into_iter()
            .map(|state| graph.insert(state))
            .collect();
        for &(from, mv, to) in edges {
            graph.connect(ids[from], mv, ids[to]).unwrap();
        }
        (graph, ids)
    }

    fn cycle(ids: &[NodeId], order: &[usize]) -> RawCycle {
        RawCycle::new(order.iter().map(|&i| ids[i]).collect())
    }

    #[test]
    fn disjoint_cycles_stay_separate() {
        let (mut graph, ids) = graph_with(4, &[(0, A, 1), (1, A, 0), (2, A, 3), (3, A, 2)]);
        let components =
            build_loop_components(&mut graph, &[cycle(&ids, &[0, 1]), cycle(&ids, &[2, 3])])
                .unwrap();
        assert_eq!(components.len(), 2);
        assert!(components.iter().all(|c| c.len() == 2));
    }

    #[test]
    fn overlapping_cycle_is_absorbed() {
        let (mut graph, ids) = graph_with(
            4,
            &[(0, A, 1), (1, A, 2), (2, A, 0), (2, B, 3), (3, A, 2)],
        );
        let components =
            build_loop_components(&mut graph, &[cycle(&ids, &[0, 1, 2]), cycle(&ids, &[2, 3])])
                .unwrap();
        assert_eq!(components.len(), 1);
        let component = &components[0];
        assert_eq!(component.len(), 4);
        assert_eq!(component.links(ids[2]).unwrap().next.len(), 2);
        for &id in &ids {
            assert_eq!(graph.node(id).loops().len(), 1);
            assert!(graph.node(id).loops().contains(&component.id()));
        }
    }

    #[test]
    fn ring_without_graph_edge_is_rejected() {
        let (mut graph, ids) = graph_with(2, &[(0, A, 1)]);
        assert!(matches!(
            build_loop_components(&mut graph, &[cycle(&ids, &[0, 1])]),
            Err(crate::Error::BrokenRing { .. })
        ));
    }

    #[test]
    fn exits_skip_internal_edges() {
        let (mut graph, ids) = graph_with(3, &[(0, A, 1), (1, A, 0), (1, B, 2)]);
        let components = build_loop_components(&mut graph, &[cycle(&ids, &[0, 1])]).unwrap();
        let exits = components[0].exits(&graph);
        assert_eq!(
            exits,
            vec![ExitEdge {
                from: ids[1],
                mv: B,
                to: ids[2]
            }]
        );
    }

    #[test]
    fn mutual_exits_merge_into_larger_component() {
        // ring 0-1-2 and ring 3-4, with 2 -> 3 and 4 -> 0
        let (mut graph, ids) = graph_with(
            5,
            &[
                (0, A, 1),
                (1, A, 2),
                (2, A, 0),
                (3, A, 4),
                (4, A, 3),
                (2, B, 3),
                (4, B, 0),
            ],
        );
        let components =
            build_loop_components(&mut graph, &[cycle(&ids, &[0, 1, 2]), cycle(&ids, &[3, 4])])
                .unwrap();
        assert_eq!(components.len(), 2);
        assert!(has_mutual_exits(&graph, &components[0], &components[1]));
        let survivor = components
            .iter()
            .max_by_key(|component| component.len())
            .unwrap()
            .id();

        let merged = merge_mutual_exits(&mut graph, components).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id(), survivor);
        assert_eq!(merged[0].len(), 5);
        assert!(merged[0].exits(&graph).is_empty());
        assert!(merged[0].links(ids[3]).unwrap().prev.contains(&ids[2]));
        assert!(merged[0].links(ids[0]).unwrap().prev.contains(&ids[4]));
    }

    #[test]
    fn one_way_exits_do_not_merge() {
        let (mut graph, ids) = graph_with(
            4,
            &[(0, A, 1), (1, A, 0), (2, A, 3), (3, A, 2), (1, B, 2)],
        );
        let components =
            build_loop_components(&mut graph, &[cycle(&ids, &[0, 1]), cycle(&ids, &[2, 3])])
                .unwrap();
        let merged = merge_mutual_exits(&mut graph, components).unwrap();
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn reentrant_path_is_adopted() {
        // ring 0-1-2; 1 -> 3 -> 4 -> 2 leaves and re-enters; 4 -> 5 leaves for good
        let (mut graph, ids) = graph_with(
            6,
            &[
                (0, A, 1),
                (1, A, 2),
                (2, A, 0),
                (1, B, 3),
                (3, A, 4),
                (4, A, 2),
                (4, B, 5),
            ],
        );
        let components = build_loop_components(&mut graph, &[cycle(&ids, &[0, 1, 2])]).unwrap();
        let closed = close_reentry(&mut graph, components).unwrap();
        assert_eq!(closed.len(), 1);
        let component = &closed[0];
        assert_eq!(component.len(), 5);
        assert!(component.contains(ids[3]) && component.contains(ids[4]));
        assert!(!component.contains(ids[5]));
        assert!(component.links(ids[3]).unwrap().prev.contains(&ids[1]));
        assert_eq!(
            component.exits(&graph),
            vec![ExitEdge {
                from: ids[4],
                mv: B,
                to: ids[5]
            }]
        );
        assert!(graph.node(ids[3]).loops().contains(&component.id()));
    }

    #[test]
    fn reentry_through_another_component_merges_both() {
        // ring 0-1; ring 2-3; 1 -> 2 and 3 -> 4 -> 0 only close through a loose node
        let (mut graph, ids) = graph_with(
            5,
            &[
                (0, A, 1),
                (1, A, 0),
                (2, A, 3),
                (3, A, 2),
                (1, B, 2),
                (3, B, 4),
                (4, C, 0),
            ],
        );
        let components =
            build_loop_components(&mut graph, &[cycle(&ids, &[0, 1]), cycle(&ids, &[2, 3])])
                .unwrap();
        let merged = merge_mutual_exits(&mut graph, components).unwrap();
        assert_eq!(merged.len(), 2);

        let closed = close_reentry(&mut graph, merged).unwrap();
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].len(), 5);
    }

    #[test]
    fn regions_group_nodes_that_reach_each_other() {
        // 0 <-> 1 -> 2 -> 3 -> 2, 3 -> 4
        let (graph, ids) = graph_with(
            5,
            &[(0, A, 1), (1, A, 0), (1, B, 2), (2, A, 3), (3, A, 2), (3, B, 4)],
        );
        let regions = Regions::of(&graph);
        let sorted = |id: NodeId| {
            let mut region = regions.region_of(id).to_vec();
            region.sort();
            region
        };
        assert_eq!(sorted(ids[0]), vec![ids[0], ids[1]]);
        assert_eq!(sorted(ids[3]), vec![ids[2], ids[3]]);
        assert_eq!(sorted(ids[4]), vec![ids[4]]);
    }

    #[test]
    fn regions_match_two_way_reachability_on_an_explored_graph() {
        use crate::solver::explorer::explore;
        use std::collections::VecDeque;

        let mut graph = PlayGraph::new(Ruleset::new(4).unwrap());
        let root = graph.insert(GameState::opening());
        explore(&mut graph, root, 1000).unwrap();
        let regions = Regions::of(&graph);

        let reach = |from: NodeId, forward: bool| {
            let mut seen = BTreeSet::from([from]);
            let mut queue = VecDeque::from([from]);
            while let Some(id) = queue.pop_front() {
                let node = graph.node(id);
                let next: Vec<NodeId> = if forward {
                    node.children().values().copied().collect()
                } else {
                    node.parents().values().copied().collect()
                };
                for n in next {
                    if seen.insert(n) {
                        queue.push_back(n);
                    }
                }
            }
            seen
        };

        for (id, _) in graph.nodes().step_by(7) {
            let both: BTreeSet<NodeId> =
                reach(id, true).intersection(&reach(id, false)).copied().collect();
            let region: BTreeSet<NodeId> = regions.region_of(id).iter().copied().collect();
            assert_eq!(region, both, "{}", graph.label(id));
        }
    }
}
