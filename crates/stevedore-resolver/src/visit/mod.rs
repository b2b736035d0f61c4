//! The two walks over the materialized forest.
//!
//! The first walk indexes every included node by coordinate so omitted nodes
//! can be redirected to the occurrence that won mediation. The second walk
//! emits the launch list in dependency-first order: a node's children
//! complete before the node itself is appended, and a coordinate reached via
//! several parents is appended exactly once, at its first completion.
//!
//! Both walks run over explicit per-walk state, so independent resolutions
//! never share visited sets.

use std::collections::{BTreeSet, HashSet};

use indexmap::IndexMap;

use stevedore_core::error::{StevedoreError, StevedoreResult};
use stevedore_core::types::coordinate::POM_PACKAGING;
use stevedore_core::types::{
    ArtifactKey, Coordinate, LaunchDescriptor, ScopeFilter, StartDirective,
};
use stevedore_registry::MetadataSource;

use crate::tree::{DependencyForest, NodeId, NodeState};

/// Artifact names ending in this suffix are synthetic grouping artifacts and
/// never launched themselves.
pub const AGGREGATE_SUFFIX: &str = "-assembly";

/// Lookup tables built by the indexing walk: full coordinate to node, and
/// version-less identity to the chosen coordinate.
#[derive(Debug, Default)]
pub struct ResolutionIndex {
    by_coordinate: IndexMap<String, NodeId>,
    by_key: IndexMap<ArtifactKey, String>,
}

impl ResolutionIndex {
    /// Node indexed under an exact coordinate string
    pub fn node(&self, coordinate: &str) -> Option<NodeId> {
        self.by_coordinate.get(coordinate).copied()
    }

    /// Chosen coordinate for a version-less identity
    pub fn chosen(&self, key: &ArtifactKey) -> Option<&str> {
        self.by_key.get(key).map(String::as_str)
    }

    /// Resolve a related coordinate to its indexed node, falling back to the
    /// version-less table when the exact coordinate was never indexed. The
    /// fallback covers omissions whose kept node itself lost a later
    /// mediation round.
    pub fn node_for(&self, related: &Coordinate) -> Option<NodeId> {
        self.node(&related.to_string()).or_else(|| {
            self.chosen(&related.key())
                .and_then(|chosen| self.node(chosen))
        })
    }

    /// Indexed coordinates in post-order discovery order
    pub fn entries(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.by_coordinate.iter().map(|(c, id)| (c.as_str(), *id))
    }

    pub fn len(&self) -> usize {
        self.by_coordinate.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_coordinate.is_empty()
    }
}

/// Build the resolution index with one depth-first walk per root.
///
/// Raises an internal consistency error if two different versions of the
/// same identity are both included, which mediation must never allow.
pub fn build_index(
    forest: &DependencyForest,
    filter: &ScopeFilter,
) -> StevedoreResult<ResolutionIndex> {
    let mut indexer = Indexer {
        forest,
        filter,
        visited: HashSet::new(),
        index: ResolutionIndex::default(),
    };
    for root in forest.roots() {
        indexer.visit(root.node)?;
    }
    Ok(indexer.index)
}

struct Indexer<'f> {
    forest: &'f DependencyForest,
    filter: &'f ScopeFilter,
    visited: HashSet<String>,
    index: ResolutionIndex,
}

impl<'f> Indexer<'f> {
    fn visit(&mut self, id: NodeId) -> StevedoreResult<()> {
        let forest = self.forest;
        let node = forest.node(id);

        // Omitted subtrees are dead ends; their contents were re-expanded
        // under the node that won.
        if node.state != NodeState::Included {
            return Ok(());
        }
        if !self.filter.includes(node.artifact.scope) {
            return Ok(());
        }
        let coordinate = node
            .artifact
            .coordinate()
            .ok_or_else(|| StevedoreError::Inconsistent {
                detail: format!("included node {} has no selected version", node.artifact),
            })?;
        let coordinate_string = coordinate.to_string();
        if !self.visited.insert(coordinate_string.clone()) {
            return Ok(());
        }

        for child in &node.children {
            self.visit(*child)?;
        }

        self.index
            .by_coordinate
            .insert(coordinate_string.clone(), id);
        let key = coordinate.key();
        match self.index.by_key.get(&key).cloned() {
            Some(existing) if existing != coordinate_string => Err(StevedoreError::Inconsistent {
                detail: format!(
                    "identity {} resolved to both {} and {}",
                    key, existing, coordinate_string
                ),
            }),
            Some(_) => Ok(()),
            None => {
                self.index.by_key.insert(key, coordinate_string);
                Ok(())
            },
        }
    }
}

/// Options for the launch-order walk
#[derive(Debug, Default)]
pub struct LaunchOptions<'a> {
    /// Start annotations copied onto matching descriptors
    pub directives: &'a [StartDirective],
    /// Fail on omitted-for-conflict nodes instead of redirecting silently
    pub strict_conflicts: bool,
}

/// Walk the forest a second time and emit the ordered launch list.
///
/// Children complete before their parent is appended, so every artifact
/// appears after everything it depends on. Artifacts of pom packaging,
/// aggregation artifacts and each root's excluded core artifacts produce no
/// output.
pub fn launch_order<S>(
    forest: &DependencyForest,
    index: &ResolutionIndex,
    source: &S,
    filter: &ScopeFilter,
    options: &LaunchOptions,
) -> StevedoreResult<Vec<LaunchDescriptor>>
where
    S: MetadataSource + ?Sized,
{
    let mut walker = LaunchWalker {
        forest,
        index,
        source,
        filter,
        options,
        visited: HashSet::new(),
        appended: HashSet::new(),
        output: Vec::new(),
    };
    for root in forest.roots() {
        walker.visit(root.node, &root.excluded)?;
    }
    Ok(walker.output)
}

struct LaunchWalker<'a, S: ?Sized> {
    forest: &'a DependencyForest,
    index: &'a ResolutionIndex,
    source: &'a S,
    filter: &'a ScopeFilter,
    options: &'a LaunchOptions<'a>,
    visited: HashSet<String>,
    appended: HashSet<String>,
    output: Vec<LaunchDescriptor>,
}

impl<'a, S: MetadataSource + ?Sized> LaunchWalker<'a, S> {
    fn visit(&mut self, id: NodeId, excluded: &BTreeSet<ArtifactKey>) -> StevedoreResult<()> {
        let forest = self.forest;
        let node = forest.node(id);

        match node.state {
            NodeState::OmittedForCycle => return Ok(()),
            NodeState::OmittedForDuplicate | NodeState::OmittedForConflict => {
                let related =
                    node.related
                        .as_ref()
                        .ok_or_else(|| StevedoreError::MissingRelatedArtifact {
                            artifact: node.artifact.to_string(),
                        })?;
                let target = self.index.node_for(related).ok_or_else(|| {
                    StevedoreError::MissingRelatedArtifact {
                        artifact: related.to_string(),
                    }
                })?;
                if node.state == NodeState::OmittedForConflict && self.options.strict_conflicts {
                    return Err(StevedoreError::VersionConflict {
                        artifact: node.artifact.key().to_string(),
                        paths: forest.conflict_paths(target, id),
                    });
                }
                // Redirect into the kept node; the omitted node's own
                // children are stale and never descended.
                return self.visit(target, excluded);
            },
            NodeState::Included => {},
        }

        if !self.filter.includes(node.artifact.scope) {
            return Ok(());
        }
        let coordinate = node
            .artifact
            .coordinate()
            .ok_or_else(|| StevedoreError::Inconsistent {
                detail: format!("included node {} has no selected version", node.artifact),
            })?;
        let coordinate_string = coordinate.to_string();
        if !self.visited.insert(coordinate_string.clone()) {
            return Ok(());
        }

        for child in &node.children {
            self.visit(*child, excluded)?;
        }

        // Leaving the node: everything it depends on is in the list
        if coordinate.packaging == POM_PACKAGING {
            return Ok(());
        }
        if coordinate.name.ends_with(AGGREGATE_SUFFIX) {
            return Ok(());
        }
        if excluded.contains(&coordinate.key()) {
            return Ok(());
        }

        let needs_wrap = !self.source.is_module_manifest(&coordinate)?;
        let mut descriptor = LaunchDescriptor::new(coordinate.clone(), needs_wrap);
        if let Some(directive) = self
            .options
            .directives
            .iter()
            .find(|d| d.applies_to(&coordinate))
        {
            descriptor.start_level = directive.start_level;
            descriptor.no_start = directive.no_start;
        }

        if self.appended.insert(coordinate_string) {
            self.output.push(descriptor);
        }
        Ok(())
    }
}
