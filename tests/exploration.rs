mod common;

use chopsticks::{
    game::{GameState, Hand, Move, Ruleset},
    solver::{PlayGraph, explore},
};
use common::three_fingers;

#[test_log::test]
fn three_finger_opening_records_cycles_instead_of_failing() {
    let mut graph = PlayGraph::new(three_fingers());
    let root = graph.insert(GameState::opening());
    let exploration = explore(&mut graph, root, 1000).expect("exploration succeeds");

    assert!(!exploration.cycles.is_empty());
    for cycle in &exploration.cycles {
        assert!(cycle.len() >= 2, "a move always hands the turn over");
        let head = cycle.head().expect("cycles are never empty");
        let last = cycle.nodes()[cycle.len() - 1];
        assert!(
            graph.node(last).children().values().any(|&child| child == head),
            "cycle through {} is not closed",
            graph.label(head)
        );
    }
}

#[test]
fn every_explored_position_is_normalized_and_unique() {
    let mut graph = PlayGraph::new(three_fingers());
    let root = graph.insert(GameState::opening());
    explore(&mut graph, root, 1000).expect("exploration succeeds");

    let mut seen = std::collections::HashSet::new();
    for (id, node) in graph.nodes() {
        assert!(node.state().is_normalized());
        assert!(seen.insert(*node.state()));
        assert_eq!(graph.lookup(node.state()), Some(id));
    }
}

#[test]
fn shared_child_is_one_node_with_both_parents() {
    let mut graph = PlayGraph::new(three_fingers());
    let root = graph.insert(GameState::opening());
    explore(&mut graph, root, 1000).expect("exploration succeeds");

    let shared = graph
        .nodes()
        .find(|(_, node)| node.parents().len() >= 2)
        .map(|(id, _)| id)
        .expect("some position is reached from two different parents");

    let parents: Vec<_> = graph
        .node(shared)
        .parents()
        .iter()
        .map(|(state, &id)| (*state, id))
        .collect();
    assert_ne!(parents[0].0, parents[1].0);
    assert_ne!(parents[0].1, parents[1].1);
    for (state, parent) in parents {
        assert_eq!(*graph.node(parent).state(), state);
        assert!(
            graph
                .node(parent)
                .children()
                .values()
                .any(|&child| child == shared)
        );
    }
}

#[test]
fn two_routes_to_one_position_share_a_node() {
    let rules = Ruleset::new(4).expect("valid ruleset");
    let mut graph = PlayGraph::new(rules);
    let a: GameState = "1,2|1,1|1".parse().expect("label");
    let b: GameState = "1,2|1,2|1".parse().expect("label");

    // 2 onto 1 from `a` and 1 onto 2 from `b` both leave player two on (1,3)
    let via_a = a
        .apply_move(Move::new(Hand::Second, Hand::First), &rules)
        .expect("legal");
    let via_b = b
        .apply_move(Move::new(Hand::First, Hand::Second), &rules)
        .expect("legal");
    assert_ne!(via_a, via_b);

    let from_a = graph.insert(a);
    let from_b = graph.insert(b);
    let child_a = graph.insert(via_a);
    graph
        .connect(from_a, Move::new(Hand::Second, Hand::First), child_a)
        .expect("first edge");
    let child_b = graph.insert(via_b);
    assert_eq!(child_b, child_a);
    graph
        .connect(from_b, Move::new(Hand::First, Hand::Second), child_b)
        .expect("second edge");

    let node = graph.node(child_a);
    assert_eq!(node.parents().get(&a), Some(&from_a));
    assert_eq!(node.parents().get(&b), Some(&from_b));
}

#[test]
fn depth_bound_turns_frontier_into_leaves() {
    let mut graph = PlayGraph::new(Ruleset::traditional());
    let root = graph.insert(GameState::opening());
    let exploration = explore(&mut graph, root, 3).expect("exploration succeeds");

    assert!(exploration.leaves.values().any(|&id| !graph.node(id).state().is_terminal()));
    for &id in exploration.leaves.values() {
        assert!(graph.node(id).is_leaf());
    }
}
