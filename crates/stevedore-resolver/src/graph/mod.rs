//! Flattened view of the resolved artifacts as a directed graph.
//!
//! Only included nodes appear; every parent-child edge of the forest is
//! redirected through the resolution index so edges always point at the
//! occurrence that won mediation. Used for DOT export and for cross-checking
//! that the launch list is a valid dependency-first ordering.

use indexmap::IndexMap;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use stevedore_core::error::{StevedoreError, StevedoreResult};
use stevedore_core::types::{Coordinate, Scope};

use crate::tree::{DependencyForest, NodeState};
use crate::visit::ResolutionIndex;

/// Directed graph over the included artifacts, edges dependent to dependency
#[derive(Debug)]
pub struct ResolvedGraph {
    graph: DiGraph<Coordinate, Scope>,
    node_map: IndexMap<String, NodeIndex>,
}

impl ResolvedGraph {
    /// Flatten a materialized forest using its resolution index
    pub fn from_forest(
        forest: &DependencyForest,
        index: &ResolutionIndex,
    ) -> StevedoreResult<Self> {
        let mut resolved = Self {
            graph: DiGraph::new(),
            node_map: IndexMap::new(),
        };

        for (coordinate_string, node_id) in index.entries() {
            let node = forest.node(node_id);
            let coordinate =
                node.artifact
                    .coordinate()
                    .ok_or_else(|| StevedoreError::Inconsistent {
                        detail: format!("indexed node {} has no selected version", node.artifact),
                    })?;
            let graph_index = resolved.graph.add_node(coordinate);
            resolved
                .node_map
                .insert(coordinate_string.to_string(), graph_index);
        }

        for (coordinate_string, node_id) in index.entries() {
            let Some(&from) = resolved.node_map.get(coordinate_string) else {
                continue;
            };
            let node = forest.node(node_id);
            for child_id in &node.children {
                let child = forest.node(*child_id);
                let scope = child.artifact.scope;
                let target = match child.state {
                    NodeState::Included => {
                        child.artifact.coordinate().map(|c| c.to_string())
                    },
                    NodeState::OmittedForDuplicate | NodeState::OmittedForConflict => {
                        child.related.as_ref().and_then(|related| {
                            index
                                .node_for(related)
                                .and_then(|kept| forest.node(kept).artifact.coordinate())
                                .map(|c| c.to_string())
                        })
                    },
                    NodeState::OmittedForCycle => None,
                };
                let Some(target) = target else { continue };
                let Some(&to) = resolved.node_map.get(&target) else {
                    continue;
                };
                if from != to && resolved.graph.find_edge(from, to).is_none() {
                    resolved.graph.add_edge(from, to, scope);
                }
            }
        }

        Ok(resolved)
    }

    /// Number of artifacts in the graph
    pub fn artifact_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of dependency edges in the graph
    pub fn dependency_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All artifacts in the graph
    pub fn artifacts(&self) -> impl Iterator<Item = &Coordinate> {
        self.graph.node_weights()
    }

    /// Topological order, dependents before their dependencies.
    ///
    /// The resolved graph is expected to be acyclic because cycle edges were
    /// omitted during expansion; a cycle here is an internal error.
    pub fn topological_sort(&self) -> StevedoreResult<Vec<Coordinate>> {
        match petgraph::algo::toposort(&self.graph, None) {
            Ok(order) => Ok(order
                .into_iter()
                .filter_map(|ix| self.graph.node_weight(ix).cloned())
                .collect()),
            Err(cycle) => {
                let label = self
                    .graph
                    .node_weight(cycle.node_id())
                    .map(|c| c.to_string())
                    .unwrap_or_default();
                Err(StevedoreError::Inconsistent {
                    detail: format!("resolved graph contains a cycle through {}", label),
                })
            },
        }
    }

    /// Positions of each coordinate string in a launch list, used to verify
    /// dependency-first ordering: for every edge, the dependency must appear
    /// before the dependent.
    pub fn verify_order(&self, order: &[Coordinate]) -> StevedoreResult<()> {
        let position: IndexMap<String, usize> = order
            .iter()
            .enumerate()
            .map(|(i, c)| (c.to_string(), i))
            .collect();

        for edge in self.graph.edge_references() {
            let dependent = &self.graph[edge.source()];
            let dependency = &self.graph[edge.target()];
            let (Some(&dependent_at), Some(&dependency_at)) = (
                position.get(&dependent.to_string()),
                position.get(&dependency.to_string()),
            ) else {
                // Artifacts absent from the output (pom, excluded) carry no
                // ordering obligation.
                continue;
            };
            if dependency_at >= dependent_at {
                return Err(StevedoreError::Inconsistent {
                    detail: format!(
                        "{} must launch before {} but appears at {} >= {}",
                        dependency, dependent, dependency_at, dependent_at
                    ),
                });
            }
        }
        Ok(())
    }

    /// Render the graph in DOT format
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph resolved {\n");
        for ix in self.graph.node_indices() {
            out.push_str(&format!("    \"{}\";\n", self.graph[ix]));
        }
        for edge in self.graph.edge_references() {
            out.push_str(&format!(
                "    \"{}\" -> \"{}\" [label=\"{}\"];\n",
                self.graph[edge.source()],
                self.graph[edge.target()],
                edge.weight()
            ));
        }
        out.push_str("}\n");
        out
    }
}
