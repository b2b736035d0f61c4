//! The materialized dependency forest.
//!
//! Materialization is a direct transform of the builder's working arena into
//! immutable nodes: every working node becomes one [`DependencyNode`], active
//! nodes become `Included` and disabled ones carry their omission state plus
//! the coordinate that was kept instead. One tree per root, each with the set
//! of core artifacts excluded from its launch output.

use std::collections::BTreeSet;

use stevedore_core::types::{ArtifactKey, ArtifactRef, Coordinate, Scope, Version};

use crate::builder::{Omission, WorkGraph};

/// Index of a node in its forest's arena
pub type NodeId = usize;

/// Final state of a materialized node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// The single winner for its identity
    Included,
    /// Lost mediation against an equal version
    OmittedForDuplicate,
    /// Lost mediation against a different version
    OmittedForConflict,
    /// Edge that would have reintroduced an ancestor
    OmittedForCycle,
}

/// Immutable node of the materialized forest
#[derive(Debug)]
pub struct DependencyNode {
    pub artifact: ArtifactRef,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub state: NodeState,
    /// Coordinate kept instead, set on omitted-for-duplicate/conflict nodes
    pub related: Option<Coordinate>,
    /// Version before dependency management overwrote it
    pub premanaged_version: Option<Version>,
    /// Scope before dependency management overwrote it
    pub premanaged_scope: Option<Scope>,
}

/// One root tree with the core artifacts excluded from its output
#[derive(Debug)]
pub struct RootTree {
    pub node: NodeId,
    pub excluded: BTreeSet<ArtifactKey>,
}

/// The materialized forest: one tree per requested root over a shared arena
#[derive(Debug, Default)]
pub struct DependencyForest {
    nodes: Vec<DependencyNode>,
    roots: Vec<RootTree>,
}

/// Convert the builder's working arena into the immutable forest
pub(crate) fn materialize(graph: WorkGraph) -> DependencyForest {
    let nodes = graph
        .nodes
        .into_iter()
        .map(|work| {
            let (state, related) = match work.omission {
                None => (NodeState::Included, None),
                Some(Omission::Duplicate { kept }) => (NodeState::OmittedForDuplicate, Some(kept)),
                Some(Omission::Conflict { kept }) => (NodeState::OmittedForConflict, Some(kept)),
                Some(Omission::Cycle) => (NodeState::OmittedForCycle, None),
            };
            DependencyNode {
                artifact: work.artifact,
                parent: work.parent,
                children: work.children,
                state,
                related,
                premanaged_version: work.premanaged_version,
                premanaged_scope: work.premanaged_scope,
            }
        })
        .collect();
    let roots = graph
        .roots
        .into_iter()
        .map(|root| RootTree {
            node: root.node,
            excluded: root.excluded,
        })
        .collect();
    DependencyForest { nodes, roots }
}

impl DependencyForest {
    /// The root trees in request order
    pub fn roots(&self) -> &[RootTree] {
        &self.roots
    }

    /// Look up a node by id
    pub fn node(&self, id: NodeId) -> &DependencyNode {
        &self.nodes[id]
    }

    /// All nodes with their ids, in creation order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &DependencyNode)> {
        self.nodes.iter().enumerate()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of included nodes
    pub fn included_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.state == NodeState::Included)
            .count()
    }

    /// Number of omitted nodes of any kind
    pub fn omitted_count(&self) -> usize {
        self.nodes.len() - self.included_count()
    }

    /// Artifact labels from the root down to the given node
    pub fn ancestor_labels(&self, id: NodeId) -> Vec<String> {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(i) = cursor {
            chain.push(self.nodes[i].artifact.to_string());
            cursor = self.nodes[i].parent;
        }
        chain.reverse();
        chain
    }

    /// The dual ancestor-path rendering used by conflict errors
    pub fn conflict_paths(&self, kept: NodeId, omitted: NodeId) -> String {
        render_conflict_paths(&self.ancestor_labels(kept), &self.ancestor_labels(omitted))
    }

    /// Render the whole forest as an indented listing
    pub fn render(&self) -> String {
        let mut out = String::new();
        for root in &self.roots {
            self.render_node(root.node, 0, &mut out);
        }
        out
    }

    fn render_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let node = &self.nodes[id];
        out.push_str(&"  ".repeat(depth));
        out.push_str(&node.artifact.to_string());
        match node.state {
            NodeState::Included => {},
            NodeState::OmittedForDuplicate => {
                if let Some(ref kept) = node.related {
                    out.push_str(&format!(" [duplicate of {}]", kept));
                }
            },
            NodeState::OmittedForConflict => {
                if let Some(ref kept) = node.related {
                    out.push_str(&format!(" [omitted for conflict with {}]", kept));
                }
            },
            NodeState::OmittedForCycle => {
                out.push_str(" [omitted, closes a cycle]");
            },
        }
        if let Some(ref premanaged) = node.premanaged_version {
            out.push_str(&format!(" (version managed from {})", premanaged));
        }
        if let Some(premanaged) = node.premanaged_scope {
            out.push_str(&format!(" (scope managed from {})", premanaged));
        }
        out.push('\n');
        for child in &node.children {
            self.render_node(*child, depth + 1, out);
        }
    }
}

/// Render the kept and omitted ancestor chains of a version conflict,
/// indented one step per depth so both derivations read top to bottom.
pub(crate) fn render_conflict_paths(kept: &[String], omitted: &[String]) -> String {
    let mut out = String::new();
    out.push_str("  kept:\n");
    for (depth, label) in kept.iter().enumerate() {
        out.push_str(&"  ".repeat(depth + 2));
        out.push_str(label);
        out.push('\n');
    }
    out.push_str("  omitted:\n");
    for (depth, label) in omitted.iter().enumerate() {
        out.push_str(&"  ".repeat(depth + 2));
        out.push_str(label);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_conflict_paths() {
        let kept = vec!["root-a".to_string(), "util:1.0".to_string()];
        let omitted = vec![
            "root-b".to_string(),
            "mid:2.0".to_string(),
            "util:1.1".to_string(),
        ];

        let rendered = render_conflict_paths(&kept, &omitted);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "  kept:");
        assert_eq!(lines[1], "    root-a");
        assert_eq!(lines[2], "      util:1.0");
        assert_eq!(lines[3], "  omitted:");
        assert_eq!(lines[4], "    root-b");
        assert_eq!(lines[6], "        util:1.1");
    }
}
