//! Dependency graphs for install and uninstall batches.
//!
//! Edges always point from dependent to dependency: if `color` depends on
//! `config`, the edge is `color -> config`. The resolver decides which way
//! to walk them.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::catalog::{ExtensionCatalog, ExtensionKind};
use crate::error::{Error, Result};

/// A single node in the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub name: String,
    pub kind: ExtensionKind,
    pub weight: i32,
}

/// Directed graph of the extensions a batch must consider.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: BTreeMap<String, GraphNode>,
    /// Adjacency list: key depends on each value.
    edges: BTreeMap<String, BTreeSet<String>>,
    /// Requested names left out of the graph (e.g. not enabled).
    skipped: BTreeSet<String>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. A node with the same name is replaced.
    pub fn add_node(&mut self, node: GraphNode) {
        let name = node.name.clone();
        self.nodes.insert(name.clone(), node);
        self.edges.entry(name).or_default();
    }

    /// Declare that `from` depends on `to`.
    ///
    /// Edges touching names that never become nodes are ignored by the
    /// resolver.
    pub fn add_edge(&mut self, from: &str, to: &str) {
        self.edges
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string());
    }

    pub fn node(&self, name: &str) -> Option<&GraphNode> {
        self.nodes.get(name)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges
            .iter()
            .filter(|(from, _)| self.nodes.contains_key(*from))
            .map(|(_, deps)| deps.iter().filter(|d| self.nodes.contains_key(*d)).count())
            .sum()
    }

    /// Direct dependencies of `name` that are nodes of this graph.
    pub fn dependencies_of(&self, name: &str) -> Vec<&str> {
        self.edges
            .get(name)
            .into_iter()
            .flatten()
            .filter(|d| self.nodes.contains_key(*d))
            .map(String::as_str)
            .collect()
    }

    /// Direct dependents of `name` that are nodes of this graph.
    pub fn dependents_of(&self, name: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|(from, deps)| self.nodes.contains_key(*from) && deps.contains(name))
            .map(|(from, _)| from.as_str())
            .collect()
    }

    /// Requested names that were left out of the graph.
    pub fn skipped(&self) -> impl Iterator<Item = &str> {
        self.skipped.iter().map(String::as_str)
    }

    fn skip(&mut self, name: &str) {
        self.skipped.insert(name.to_string());
    }
}

/// Builds the subgraph a batch needs from the catalog.
pub struct GraphBuilder<'a> {
    catalog: &'a ExtensionCatalog,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(catalog: &'a ExtensionCatalog) -> Self {
        Self { catalog }
    }

    /// Closure of dependencies for an install batch.
    ///
    /// Requested names are visited alphabetically and each extension's
    /// dependencies in declaration order, breadth-first, so the first
    /// unresolved target reported is stable.
    ///
    /// # Errors
    ///
    /// - `Error::NotFound` if a requested name is unknown
    /// - `Error::MissingDependency` if a required target is not in the catalog
    /// - `Error::IncompatibleVersion` if a target fails its version constraint
    pub fn install_graph<S: AsRef<str>>(&self, requested: &[S]) -> Result<DependencyGraph> {
        let seeds = self.seeds(requested)?;
        let mut graph = DependencyGraph::new();
        let mut visited: BTreeSet<String> = seeds.iter().cloned().collect();
        let mut queue: VecDeque<String> = seeds.into_iter().collect();

        while let Some(current) = queue.pop_front() {
            let record = self.catalog.get(&current)?;
            graph.add_node(GraphNode {
                name: record.name.clone(),
                kind: record.kind,
                weight: record.weight,
            });

            for dep in &record.dependencies {
                let target = self.catalog.resolve_target(&dep.name).ok_or_else(|| {
                    Error::MissingDependency {
                        name: current.clone(),
                        missing: dep.name.clone(),
                    }
                })?;

                if !dep.is_compatible(target.version.as_ref()) {
                    return Err(Error::IncompatibleVersion {
                        name: current.clone(),
                        dependency: target.name.clone(),
                        constraint: dep
                            .constraint
                            .as_ref()
                            .map(|c| c.to_string())
                            .unwrap_or_default(),
                        found: target
                            .version
                            .as_ref()
                            .map(|v| v.to_string())
                            .unwrap_or_else(|| "none".to_string()),
                    });
                }

                graph.add_edge(&current, &target.name);
                if visited.insert(target.name.clone()) {
                    queue.push_back(target.name.clone());
                }
            }
        }

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "install graph built"
        );
        Ok(graph)
    }

    /// Closure of enabled dependents for an uninstall batch.
    ///
    /// Requested names that are not enabled are recorded as skipped.
    /// Profiles never join the closure; whether a profile blocks removal is
    /// decided by the uninstall validators.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if a requested name is unknown.
    pub fn uninstall_graph<S, F>(&self, requested: &[S], is_enabled: F) -> Result<DependencyGraph>
    where
        S: AsRef<str>,
        F: Fn(&str) -> bool,
    {
        let mut graph = DependencyGraph::new();
        let mut seeds = Vec::new();
        for name in self.seeds(requested)? {
            if is_enabled(&name) {
                seeds.push(name);
            } else {
                tracing::debug!(extension = %name, "not enabled, skipping");
                graph.skip(&name);
            }
        }

        let mut visited: BTreeSet<String> = seeds.iter().cloned().collect();
        let mut queue: VecDeque<String> = seeds.into_iter().collect();

        while let Some(current) = queue.pop_front() {
            let record = self.catalog.get(&current)?;
            graph.add_node(GraphNode {
                name: record.name.clone(),
                kind: record.kind,
                weight: record.weight,
            });

            for dependent in self.catalog.dependents_of(&current) {
                let dependent_record = self.catalog.get(dependent)?;
                if dependent_record.kind == ExtensionKind::Profile || !is_enabled(dependent) {
                    continue;
                }
                graph.add_edge(dependent, &current);
                if visited.insert(dependent.to_string()) {
                    queue.push_back(dependent.to_string());
                }
            }
        }

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            skipped = graph.skipped.len(),
            "uninstall graph built"
        );
        Ok(graph)
    }

    /// Sorted, deduplicated requested names, each checked against the catalog.
    fn seeds<S: AsRef<str>>(&self, requested: &[S]) -> Result<Vec<String>> {
        let names: BTreeSet<&str> = requested.iter().map(|s| s.as_ref()).collect();
        names
            .into_iter()
            .map(|name| self.catalog.get(name).map(|r| r.name.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ExtensionRecord;

    fn chain() -> ExtensionCatalog {
        let mut catalog = ExtensionCatalog::new();
        catalog.insert(ExtensionRecord::module("help"));
        catalog.insert(ExtensionRecord::module("config").with_dependencies(&["help"]).unwrap());
        catalog.insert(ExtensionRecord::module("color").with_dependencies(&["config"]).unwrap());
        catalog.insert(ExtensionRecord::module("ban"));
        catalog
    }

    #[test]
    fn test_empty_graph() {
        let graph = DependencyGraph::new();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_install_graph_follows_dependencies_only() {
        let catalog = chain();
        let graph = GraphBuilder::new(&catalog).install_graph(&["config"]).unwrap();

        assert!(graph.contains("config"));
        assert!(graph.contains("help"));
        assert!(!graph.contains("color"));
        assert_eq!(graph.dependencies_of("config"), vec!["help"]);
        assert_eq!(graph.dependents_of("help"), vec!["config"]);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_install_graph_unknown_request() {
        let catalog = chain();
        let err = GraphBuilder::new(&catalog).install_graph(&["views"]).unwrap_err();
        assert!(matches!(err, Error::NotFound(ref n) if n == "views"));
    }

    #[test]
    fn test_install_graph_missing_dependency() {
        let mut catalog = chain();
        catalog.insert(ExtensionRecord::module("config").with_dependencies(&["foo"]).unwrap());

        let err = GraphBuilder::new(&catalog).install_graph(&["color"]).unwrap_err();
        assert!(
            matches!(err, Error::MissingDependency { ref name, ref missing } if name == "config" && missing == "foo"),
            "got {err:?}"
        );
    }

    #[test]
    fn test_uninstall_graph_pulls_in_enabled_dependents() {
        let catalog = chain();
        let graph = GraphBuilder::new(&catalog)
            .uninstall_graph(&["help"], |_| true)
            .unwrap();

        let names: Vec<&str> = graph.nodes().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["color", "config", "help"]);
        assert_eq!(graph.dependencies_of("color"), vec!["config"]);
    }

    #[test]
    fn test_uninstall_graph_ignores_disabled() {
        let catalog = chain();
        let graph = GraphBuilder::new(&catalog)
            .uninstall_graph(&["help", "ban"], |name| name != "color" && name != "ban")
            .unwrap();

        assert!(graph.contains("config"));
        assert!(!graph.contains("color"));
        assert_eq!(graph.skipped().collect::<Vec<_>>(), vec!["ban"]);
    }
}
