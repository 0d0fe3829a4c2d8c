//! Dependency ordering for type providers.
//!
//! Edges point from dependent to dependency: if A depends on B, the edge is
//! `A -> B`, and the topological sort yields B before A. Among providers that
//! are ready at the same time, lower priority runs first, then earlier
//! discovery order.
//!
//! # Example
//!
//! ```
//! use meta_core::ProviderGraph;
//!
//! let mut graph = ProviderGraph::new();
//! graph.add_node("field-types", 100);
//! graph.add_node("core-types", 100);
//! graph.add_edge("field-types", "core-types");
//!
//! let order = graph.topological_sort().unwrap();
//! assert_eq!(order, vec!["core-types", "field-types"]);
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::provider::MetaDataTypeProvider;

#[derive(Debug, Clone, PartialEq, Eq)]
struct ProviderNode {
    priority: i32,
    /// Discovery position, used as the final tie-break.
    order: usize,
}

/// Directed acyclic graph of provider dependencies.
#[derive(Debug, Clone, Default)]
pub struct ProviderGraph {
    nodes: HashMap<String, ProviderNode>,
    /// Adjacency list: key depends on each value.
    edges: HashMap<String, HashSet<String>>,
}

impl ProviderGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a provider. Re-adding an id keeps its original discovery position.
    pub fn add_node(&mut self, id: impl Into<String>, priority: i32) {
        let id = id.into();
        let order = self.nodes.get(&id).map_or(self.nodes.len(), |n| n.order);
        self.nodes.insert(id.clone(), ProviderNode { priority, order });
        self.edges.entry(id).or_default();
    }

    /// Declare that `from` depends on `to`.
    pub fn add_edge(&mut self, from: &str, to: &str) {
        self.edges
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string());
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(HashSet::len).sum()
    }

    /// Direct dependencies of a provider, sorted.
    pub fn dependencies_of(&self, id: &str) -> Vec<&str> {
        let mut deps: Vec<&str> = self
            .edges
            .get(id)
            .map(|deps| deps.iter().map(String::as_str).collect())
            .unwrap_or_default();
        deps.sort_unstable();
        deps
    }

    /// Build the graph for a discovered provider set.
    ///
    /// Dependencies satisfied by `already_loaded` are dropped from the graph.
    ///
    /// # Errors
    ///
    /// `Error::DisabledProviderDependency` when a dependency was skipped by
    /// `disabled`, and `Error::MissingProviderDependency` when it is neither
    /// discovered nor already loaded.
    pub fn from_providers(
        providers: &[Arc<dyn MetaDataTypeProvider>],
        already_loaded: impl Fn(&str) -> bool,
        disabled: impl Fn(&str) -> bool,
    ) -> Result<Self> {
        let mut graph = Self::new();
        for provider in providers {
            graph.add_node(provider.provider_id(), provider.priority());
        }
        for provider in providers {
            let id = provider.provider_id();
            for dependency in provider.dependencies() {
                if graph.nodes.contains_key(&dependency) {
                    graph.add_edge(id, &dependency);
                    continue;
                }
                if already_loaded(&dependency) {
                    continue;
                }
                let provider = id.to_string();
                return Err(if disabled(&dependency) {
                    Error::DisabledProviderDependency { provider, dependency }
                } else {
                    Error::MissingProviderDependency { provider, dependency }
                });
            }
        }
        Ok(graph)
    }

    /// Order providers with Kahn's algorithm, dependencies first.
    ///
    /// # Errors
    ///
    /// `Error::ProviderCycle` naming every provider that could not be ordered.
    pub fn topological_sort(&self) -> Result<Vec<String>> {
        let mut in_degree: HashMap<&str, usize> = HashMap::with_capacity(self.nodes.len());
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
        for id in self.nodes.keys() {
            in_degree.insert(id.as_str(), 0);
        }
        for (from, deps) in &self.edges {
            if !self.nodes.contains_key(from) {
                continue;
            }
            for dep in deps.iter().filter(|d| self.nodes.contains_key(*d)) {
                *in_degree.entry(from.as_str()).or_insert(0) += 1;
                dependents.entry(dep.as_str()).or_default().push(from.as_str());
            }
        }

        let rank = |id: &str| {
            self.nodes
                .get(id)
                .map_or((i32::MAX, usize::MAX), |n| (n.priority, n.order))
        };
        let mut ready: BTreeSet<(i32, usize, &str)> = in_degree
            .iter()
            .filter(|&(_, &deg)| deg == 0)
            .map(|(&id, _)| {
                let (priority, order) = rank(id);
                (priority, order, id)
            })
            .collect();

        let mut result = Vec::with_capacity(self.nodes.len());
        while let Some((_, _, current)) = ready.pop_first() {
            result.push(current.to_string());
            for &dependent in dependents.get(current).into_iter().flatten() {
                if let Some(deg) = in_degree.get_mut(dependent) {
                    *deg = deg.saturating_sub(1);
                    if *deg == 0 {
                        let (priority, order) = rank(dependent);
                        ready.insert((priority, order, dependent));
                    }
                }
            }
        }

        if result.len() != self.nodes.len() {
            let sorted: HashSet<&str> = result.iter().map(String::as_str).collect();
            let mut participants: Vec<String> = self
                .nodes
                .keys()
                .filter(|id| !sorted.contains(id.as_str()))
                .cloned()
                .collect();
            participants.sort();
            return Err(Error::ProviderCycle { participants });
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MetaDataRegistry;

    struct Stub {
        id: &'static str,
        deps: Vec<&'static str>,
        priority: i32,
    }

    impl MetaDataTypeProvider for Stub {
        fn provider_id(&self) -> &str {
            self.id
        }

        fn dependencies(&self) -> Vec<String> {
            self.deps.iter().map(|d| d.to_string()).collect()
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn register_types(&self, _registry: &MetaDataRegistry) -> Result<()> {
            Ok(())
        }
    }

    fn stub(id: &'static str, deps: &[&'static str], priority: i32) -> Arc<dyn MetaDataTypeProvider> {
        Arc::new(Stub {
            id,
            deps: deps.to_vec(),
            priority,
        })
    }

    #[test]
    fn test_empty_graph() {
        let graph = ProviderGraph::new();
        assert_eq!(graph.node_count(), 0);
        assert!(graph.topological_sort().unwrap().is_empty());
    }

    #[test]
    fn test_dependency_beats_discovery_order() {
        let providers = vec![stub("p2", &["p1"], 100), stub("p1", &[], 100)];
        let graph = ProviderGraph::from_providers(&providers, |_| false, |_| false).unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.topological_sort().unwrap(), vec!["p1", "p2"]);
    }

    #[test]
    fn test_priority_then_discovery_order() {
        let mut graph = ProviderGraph::new();
        graph.add_node("late", 200);
        graph.add_node("b", 100);
        graph.add_node("a", 100);
        graph.add_node("early", 10);
        assert_eq!(graph.topological_sort().unwrap(), vec!["early", "b", "a", "late"]);
    }

    #[test]
    fn test_diamond() {
        let mut graph = ProviderGraph::new();
        for id in ["top", "left", "right", "root"] {
            graph.add_node(id, 100);
        }
        graph.add_edge("left", "root");
        graph.add_edge("right", "root");
        graph.add_edge("top", "left");
        graph.add_edge("top", "right");

        let order = graph.topological_sort().unwrap();
        assert_eq!(order.first().map(String::as_str), Some("root"));
        assert_eq!(order.last().map(String::as_str), Some("top"));
        assert_eq!(graph.dependencies_of("top"), vec!["left", "right"]);
    }

    #[test]
    fn test_cycle_detected() {
        let mut graph = ProviderGraph::new();
        graph.add_node("a", 100);
        graph.add_node("b", 100);
        graph.add_node("free", 100);
        graph.add_edge("a", "b");
        graph.add_edge("b", "a");

        match graph.topological_sort() {
            Err(Error::ProviderCycle { participants }) => assert_eq!(participants, vec!["a", "b"]),
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_dependency_named() {
        let providers = vec![stub("fields", &["core"], 100)];
        match ProviderGraph::from_providers(&providers, |_| false, |_| false) {
            Err(Error::MissingProviderDependency { provider, dependency }) => {
                assert_eq!(provider, "fields");
                assert_eq!(dependency, "core");
            }
            other => panic!("expected missing dependency, got {other:?}"),
        }
    }

    #[test]
    fn test_disabled_dependency_named() {
        let providers = vec![stub("fields", &["core"], 100)];
        let err = ProviderGraph::from_providers(&providers, |_| false, |id| id == "core").unwrap_err();
        assert!(matches!(
            err,
            Error::DisabledProviderDependency { ref provider, ref dependency }
                if provider == "fields" && dependency == "core"
        ));
        assert!(err.to_string().contains("disabled by configuration"));
    }

    #[test]
    fn test_already_loaded_dependency_satisfies() {
        let providers = vec![stub("fields", &["core"], 100)];
        let graph = ProviderGraph::from_providers(&providers, |id| id == "core", |_| false).unwrap();
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.topological_sort().unwrap(), vec!["fields"]);
    }
}
