//! Deterministic topological ordering of dependency graphs.
//!
//! Uses Kahn's algorithm with a min-heap of ready nodes keyed on
//! `(weight, name)`, so among extensions that are free to go next the
//! lightest goes first and equal weights fall back to alphabetical order.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};
use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::graph::DependencyGraph;

/// Which way a plan walks the dependency edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Dependencies before dependents.
    Install,
    /// Dependents before dependencies.
    Uninstall,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Install => write!(f, "install"),
            Direction::Uninstall => write!(f, "uninstall"),
        }
    }
}

/// An ordered sequence of extensions to act on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionPlan {
    direction: Direction,
    order: Vec<String>,
    /// Requested names that are not part of the plan.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    skipped: Vec<String>,
}

impl ResolutionPlan {
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.order.iter().any(|n| n == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.order.iter().position(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

/// Computes install and uninstall orders from a [`DependencyGraph`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TopologicalResolver;

impl TopologicalResolver {
    /// Order in which every dependency precedes its dependents.
    ///
    /// # Errors
    ///
    /// Returns `Error::CycleDetected` naming the nodes that lie on a cycle.
    pub fn resolve_install_order(&self, graph: &DependencyGraph) -> Result<ResolutionPlan> {
        self.resolve(graph, Direction::Install)
    }

    /// Order in which every dependent precedes the dependencies it relies on.
    ///
    /// # Errors
    ///
    /// Returns `Error::CycleDetected` naming the nodes that lie on a cycle.
    pub fn resolve_uninstall_order(&self, graph: &DependencyGraph) -> Result<ResolutionPlan> {
        self.resolve(graph, Direction::Uninstall)
    }

    fn resolve(&self, graph: &DependencyGraph, direction: Direction) -> Result<ResolutionPlan> {
        // `blockers[n]`: nodes that must be processed before `n`.
        // `unblocks[n]`: nodes waiting on `n`.
        let mut blockers: BTreeMap<&str, usize> = BTreeMap::new();
        let mut unblocks: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

        for node in graph.nodes() {
            let name = node.name.as_str();
            blockers.entry(name).or_insert(0);
            for dep in graph.dependencies_of(name) {
                let (first, then) = match direction {
                    Direction::Install => (dep, name),
                    Direction::Uninstall => (name, dep),
                };
                *blockers.entry(then).or_insert(0) += 1;
                unblocks.entry(first).or_default().push(then);
            }
        }

        let mut ready: BinaryHeap<Reverse<(i32, &str)>> = blockers
            .iter()
            .filter(|(_, count)| **count == 0)
            .filter_map(|(name, _)| graph.node(name).map(|n| Reverse((n.weight, *name))))
            .collect();

        let mut order = Vec::with_capacity(graph.node_count());
        while let Some(Reverse((_, current))) = ready.pop() {
            order.push(current.to_string());

            for &next in unblocks.get(current).into_iter().flatten() {
                if let Some(count) = blockers.get_mut(next) {
                    *count -= 1;
                    if *count == 0 {
                        let weight = graph.node(next).map_or(0, |n| n.weight);
                        ready.push(Reverse((weight, next)));
                    }
                }
            }
        }

        if order.len() != graph.node_count() {
            let placed: BTreeSet<&str> = order.iter().map(String::as_str).collect();
            let remaining: BTreeSet<&str> = graph
                .nodes()
                .map(|n| n.name.as_str())
                .filter(|n| !placed.contains(n))
                .collect();
            let members = cycle_members(graph, &remaining);
            tracing::debug!(?members, %direction, "dependency cycle");
            return Err(Error::CycleDetected { members });
        }

        tracing::debug!(%direction, ?order, "resolved order");
        Ok(ResolutionPlan {
            direction,
            order,
            skipped: graph.skipped().map(str::to_string).collect(),
        })
    }
}

/// Nodes among `remaining` that can reach themselves.
///
/// Kahn's algorithm leaves behind both the cycle and everything stuck
/// behind it; only the former are reported.
fn cycle_members(graph: &DependencyGraph, remaining: &BTreeSet<&str>) -> Vec<String> {
    remaining
        .iter()
        .filter(|start| reaches(graph, remaining, start, start))
        .map(|n| n.to_string())
        .collect()
}

fn reaches(graph: &DependencyGraph, within: &BTreeSet<&str>, from: &str, target: &str) -> bool {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut stack: Vec<&str> = graph.dependencies_of(from);

    while let Some(current) = stack.pop() {
        if current == target {
            return true;
        }
        if !within.contains(current) || !seen.insert(current) {
            continue;
        }
        stack.extend(graph.dependencies_of(current));
    }
    false
}
