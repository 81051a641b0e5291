//! Structural checks on the bidirectional edges of a play graph

use std::collections::{HashSet, VecDeque};

use log::debug;

use super::graph::{NodeId, PlayGraph};

/// Check that every edge around `start` is recorded in both directions.
///
/// With `recursive` set the walk continues breadth-first through children
/// and parents until every connected position has been checked once.
/// Returns the shallowest and deepest leaf depth, measured as the shortest
/// child-edge distance from `start`, or the deepest level reached when no
/// leaf was found.
///
/// # Errors
///
/// Returns [`crate::Error::EdgeMismatch`] for the first one-sided edge, with
/// both endpoints' neighbourhoods rendered into its context.
pub fn validate(graph: &PlayGraph, start: NodeId, recursive: bool) -> crate::Result<(usize, usize)> {
    if !recursive {
        check_node(graph, start)?;
        return Ok((0, 0));
    }

    let mut visited = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(id) = queue.pop_front() {
        check_node(graph, id)?;
        let node = graph.node(id);
        let neighbours = node.children().values().chain(node.parents().values());
        for &next in neighbours {
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    debug!("validated {} positions from {}", visited.len(), graph.label(start));
    Ok(leaf_depths(graph, start))
}

/// Shortest child-edge distance to every leaf below `start`, folded to (min, max)
fn leaf_depths(graph: &PlayGraph, start: NodeId) -> (usize, usize) {
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([(start, 0)]);
    let mut depths: Option<(usize, usize)> = None;
    let mut deepest = 0;

    while let Some((id, depth)) = queue.pop_front() {
        deepest = deepest.max(depth);
        let node = graph.node(id);
        if node.is_leaf() {
            depths = Some(match depths {
                Some((min, max)) => (min.min(depth), max.max(depth)),
                None => (depth, depth),
            });
        }
        for &child in node.children().values() {
            if seen.insert(child) {
                queue.push_back((child, depth + 1));
            }
        }
    }

    depths.unwrap_or((deepest, deepest))
}

fn check_node(graph: &PlayGraph, id: NodeId) -> crate::Result<()> {
    let node = graph.node(id);

    for (mv, &child) in node.children() {
        if graph.node(child).parents().get(node.state()) != Some(&id) {
            return Err(mismatch(
                graph,
                id,
                child,
                format!("child reached by {mv} does not list the parent"),
            ));
        }
    }

    for (state, &parent) in node.parents() {
        if graph.node(parent).state() != state {
            return Err(mismatch(
                graph,
                parent,
                id,
                format!("parent is keyed under '{state}'"),
            ));
        }
        if !graph.node(parent).children().values().any(|&c| c == id) {
            return Err(mismatch(
                graph,
                parent,
                id,
                "parent has no move leading to the child".to_string(),
            ));
        }
    }
    Ok(())
}

fn mismatch(graph: &PlayGraph, parent: NodeId, child: NodeId, reason: String) -> crate::Error {
    crate::Error::EdgeMismatch {
        parent: graph.label(parent),
        child: graph.label(child),
        reason,
        context: format!("{}\n{}", graph.describe(parent), graph.describe(child)),
    }
}
