//! Common test utilities for the chopsticks test suite.
//!
//! This module solves the small variants once per call and offers a few
//! graph walks shared by several test files.

#![allow(dead_code)]

use std::collections::{BTreeSet, VecDeque};

use chopsticks::{
    game::{GameState, Overflow, Ruleset},
    solver::{NodeId, PlayGraph, Solution, Solver, SolverConfig},
};

/// The 3-finger rollover variant
pub fn three_fingers() -> Ruleset {
    Ruleset::new(3).expect("three fingers is a valid ruleset")
}

pub fn solve(label: &str, ruleset: Ruleset) -> Solution {
    let start: GameState = label.parse().expect("valid start label");
    Solver::new(SolverConfig::new(ruleset))
        .solve(start)
        .unwrap_or_else(|err| panic!("solving {label} under {ruleset} failed: {err}"))
}

/// Every ruleset small enough to solve in a unit of test time
pub fn small_rulesets() -> Vec<Ruleset> {
    let mut rulesets = Vec::new();
    for fingers in 2..=4 {
        for overflow in [Overflow::Rollover, Overflow::Cutoff] {
            let ruleset = Ruleset::new(fingers)
                .expect("positive finger count")
                .with_overflow(overflow);
            rulesets.push(ruleset);
        }
    }
    rulesets
}

/// Nodes reached from `from` by following `step`, `from` included
pub fn reach(
    graph: &PlayGraph,
    from: impl IntoIterator<Item = NodeId>,
    step: impl Fn(&PlayGraph, NodeId) -> Vec<NodeId>,
) -> BTreeSet<NodeId> {
    let mut seen: BTreeSet<NodeId> = from.into_iter().collect();
    let mut queue: VecDeque<NodeId> = seen.iter().copied().collect();
    while let Some(id) = queue.pop_front() {
        for next in step(graph, id) {
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    seen
}

pub fn children(graph: &PlayGraph, id: NodeId) -> Vec<NodeId> {
    graph.node(id).children().values().copied().collect()
}

pub fn parents(graph: &PlayGraph, id: NodeId) -> Vec<NodeId> {
    graph.node(id).parents().values().copied().collect()
}
