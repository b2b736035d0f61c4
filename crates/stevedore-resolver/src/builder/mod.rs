//! Recursive expansion of root artifacts into a mediated dependency forest.
//!
//! The builder owns an arena of working nodes and a table of every identity
//! seen so far. Each new occurrence of an identity is mediated against the
//! active prior occurrence: version ranges are intersected, the nearest
//! declaration wins, and scope promotion may transfer the farther scope onto
//! the winner. Losing nodes stay in the arena, disabled, so the materialized
//! forest can show why they were omitted.

use std::collections::{BTreeSet, HashMap};

use indexmap::IndexMap;
use tracing::debug;

use stevedore_core::error::{StevedoreError, StevedoreResult};
use stevedore_core::types::{
    ArtifactKey, ArtifactRef, Coordinate, ManagedDependency, ManagedVersionMap, Scope, ScopeFilter,
    Version, VersionRange,
};
use stevedore_registry::MetadataSource;

use crate::tree::{self, DependencyForest};

/// Identity of the launcher bootstrap artifact. Its declared version always
/// wins; dependency management never overrides it.
pub const BOOT_GROUP: &str = "org.stevedore";
pub const BOOT_NAME: &str = "stevedore-boot";

/// One root artifact together with its management table and the core
/// artifacts excluded from its launch output.
#[derive(Debug, Clone)]
pub struct RootSpec {
    pub artifact: ArtifactRef,
    pub managed: ManagedVersionMap,
    pub excluded: BTreeSet<ArtifactKey>,
}

impl RootSpec {
    pub fn new(artifact: ArtifactRef) -> Self {
        Self {
            artifact,
            managed: ManagedVersionMap::new(),
            excluded: BTreeSet::new(),
        }
    }

    /// Attach a management table. The root's own identity is stripped so a
    /// project cannot manage itself.
    pub fn with_managed(mut self, mut managed: ManagedVersionMap) -> Self {
        managed.remove(&self.artifact.key());
        self.managed = managed;
        self
    }

    /// Mark an identity as a pre-existing core artifact of this root
    pub fn exclude(mut self, key: ArtifactKey) -> Self {
        self.excluded.insert(key);
        self
    }
}

/// Receives the structural events of one resolution.
///
/// Every decision the builder makes is reported here; the default
/// implementations ignore everything so observers implement only what they
/// care about.
pub trait ResolutionObserver {
    fn include(&mut self, _artifact: &ArtifactRef) {}

    fn omit_for_conflict(&mut self, _omitted: &ArtifactRef, _kept: &ArtifactRef) {}

    fn omit_for_duplicate(&mut self, _omitted: &ArtifactRef, _kept: &ArtifactRef) {}

    fn omit_for_cycle(&mut self, _artifact: &ArtifactRef) {}

    fn manage(&mut self, _artifact: &ArtifactRef, _managed: &ManagedDependency) {}

    fn update_scope(&mut self, _artifact: &ArtifactRef, _scope: Scope) {}

    fn select_version(&mut self, _artifact: &ArtifactRef) {}

    fn restrict_range(&mut self, _artifact: &ArtifactRef, _range: &VersionRange) {}
}

/// Observer logging every event at debug level
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl ResolutionObserver for LoggingObserver {
    fn include(&mut self, artifact: &ArtifactRef) {
        debug!(artifact = %artifact, "include");
    }

    fn omit_for_conflict(&mut self, omitted: &ArtifactRef, kept: &ArtifactRef) {
        debug!(omitted = %omitted, kept = %kept, "omit for conflict");
    }

    fn omit_for_duplicate(&mut self, omitted: &ArtifactRef, kept: &ArtifactRef) {
        debug!(omitted = %omitted, kept = %kept, "omit for duplicate");
    }

    fn omit_for_cycle(&mut self, artifact: &ArtifactRef) {
        debug!(artifact = %artifact, "omit for cycle");
    }

    fn manage(&mut self, artifact: &ArtifactRef, managed: &ManagedDependency) {
        debug!(artifact = %artifact, version = %managed.version, "apply managed version");
    }

    fn update_scope(&mut self, artifact: &ArtifactRef, scope: Scope) {
        debug!(artifact = %artifact, scope = %scope, "promote scope");
    }

    fn select_version(&mut self, artifact: &ArtifactRef) {
        debug!(artifact = %artifact, "select version from range");
    }

    fn restrict_range(&mut self, artifact: &ArtifactRef, range: &VersionRange) {
        debug!(artifact = %artifact, range = %range, "restrict range");
    }
}

/// Why a working node was disabled
#[derive(Debug, Clone)]
pub(crate) enum Omission {
    Duplicate { kept: Coordinate },
    Conflict { kept: Coordinate },
    Cycle,
}

/// Working node of the expansion arena
#[derive(Debug)]
pub(crate) struct WorkNode {
    pub(crate) artifact: ArtifactRef,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
    pub(crate) depth: usize,
    pub(crate) active: bool,
    pub(crate) omission: Option<Omission>,
    pub(crate) premanaged_version: Option<Version>,
    pub(crate) premanaged_scope: Option<Scope>,
}

/// Root entry of the expansion arena
#[derive(Debug)]
pub(crate) struct WorkRoot {
    pub(crate) node: usize,
    pub(crate) excluded: BTreeSet<ArtifactKey>,
}

/// Arena produced by one expansion, consumed by the materializer
#[derive(Debug, Default)]
pub(crate) struct WorkGraph {
    pub(crate) nodes: Vec<WorkNode>,
    pub(crate) roots: Vec<WorkRoot>,
}

impl WorkGraph {
    fn push(&mut self, artifact: ArtifactRef, parent: Option<usize>, depth: usize) -> usize {
        let id = self.nodes.len();
        self.nodes.push(WorkNode {
            artifact,
            parent,
            children: Vec::new(),
            depth,
            active: true,
            omission: None,
            premanaged_version: None,
            premanaged_scope: None,
        });
        if let Some(parent) = parent {
            self.nodes[parent].children.push(id);
        }
        id
    }

    fn ancestor_labels(&self, id: usize) -> Vec<String> {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(i) = cursor {
            chain.push(self.nodes[i].artifact.to_string());
            cursor = self.nodes[i].parent;
        }
        chain.reverse();
        chain
    }
}

/// Per-resolution mutable state. Fresh for every build; never reused across
/// independent resolutions.
struct Walk {
    graph: WorkGraph,
    /// Every occurrence of an identity, in discovery order
    resolved: IndexMap<ArtifactKey, Vec<usize>>,
    /// Availability lists fetched so far
    available: HashMap<ArtifactKey, Vec<Version>>,
}

/// Expands one or more roots into a mediated dependency forest.
pub struct TreeBuilder<'a, S: MetadataSource> {
    source: &'a S,
    filter: ScopeFilter,
    strict_conflicts: bool,
}

impl<'a, S: MetadataSource> TreeBuilder<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            filter: ScopeFilter::default(),
            strict_conflicts: false,
        }
    }

    /// Replace the default scope filter
    pub fn with_filter(mut self, filter: ScopeFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Fail on version conflicts instead of falling back to nearest-wins
    pub fn strict_conflicts(mut self, strict: bool) -> Self {
        self.strict_conflicts = strict;
        self
    }

    /// Resolve the given roots into a forest
    pub fn build(&self, roots: &[RootSpec]) -> StevedoreResult<DependencyForest> {
        let mut observer = LoggingObserver;
        self.build_with_observer(roots, &mut observer)
    }

    /// Resolve with a caller-supplied observer
    pub fn build_with_observer(
        &self,
        roots: &[RootSpec],
        observer: &mut dyn ResolutionObserver,
    ) -> StevedoreResult<DependencyForest> {
        let mut walk = Walk {
            graph: WorkGraph::default(),
            resolved: IndexMap::new(),
            available: HashMap::new(),
        };

        for spec in roots {
            let root_id = walk.graph.push(spec.artifact.clone(), None, 0);
            self.recurse(&mut walk, root_id, &spec.managed, observer)?;
            walk.graph.roots.push(WorkRoot {
                node: root_id,
                excluded: spec.excluded.clone(),
            });
        }

        Ok(tree::materialize(walk.graph))
    }

    fn recurse(
        &self,
        walk: &mut Walk,
        node_id: usize,
        managed: &ManagedVersionMap,
        observer: &mut dyn ResolutionObserver,
    ) -> StevedoreResult<()> {
        self.manage(walk, node_id, managed, observer);
        self.ensure_version(walk, node_id, observer)?;

        // Mediate against earlier occurrences of the same identity
        let key = walk.graph.nodes[node_id].artifact.key();
        let priors = walk.resolved.get(&key).cloned().unwrap_or_default();
        for prior_id in priors {
            if !walk.graph.nodes[prior_id].active {
                continue;
            }
            self.mediate(walk, node_id, prior_id, observer)?;
            if !walk.graph.nodes[node_id].active {
                break;
            }
        }
        walk.resolved.entry(key).or_default().push(node_id);

        let node = &walk.graph.nodes[node_id];
        if !node.active {
            return Ok(());
        }
        observer.include(&node.artifact);

        // System-scoped artifacts are leaves
        if !node.artifact.scope.pulls_transitives() {
            return Ok(());
        }

        let depth = node.depth;
        let coordinate = self.selected_coordinate(walk, node_id)?;

        // Regular declared dependencies
        for child in self.source.declared_dependencies(&coordinate)? {
            if !self.filter.includes(child.scope) {
                continue;
            }
            // Provided dependencies of other projects must not perturb the
            // graph; they are only meaningful to their declarer's own build.
            if child.scope == Scope::Provided {
                continue;
            }
            // Optional dependencies count only when a root asks for them
            if child.optional && depth != 0 {
                continue;
            }
            self.expand_child(walk, node_id, child, managed, observer)?;
        }

        // Runtime profile dependencies of the artifact itself. Provided scope
        // is meaningful here, so only the scope filter applies.
        for child in self.source.runtime_dependencies(&coordinate)? {
            if !self.filter.includes(child.scope) {
                continue;
            }
            self.expand_child(walk, node_id, child, managed, observer)?;
        }

        Ok(())
    }

    fn expand_child(
        &self,
        walk: &mut Walk,
        parent_id: usize,
        child: ArtifactRef,
        managed: &ManagedVersionMap,
        observer: &mut dyn ResolutionObserver,
    ) -> StevedoreResult<()> {
        let depth = walk.graph.nodes[parent_id].depth + 1;

        // An edge that reintroduces an ancestor closes a cycle. Real-world
        // metadata does this routinely, so the edge is omitted rather than
        // treated as fatal.
        let child_key = child.key();
        let mut cursor = Some(parent_id);
        while let Some(i) = cursor {
            if walk.graph.nodes[i].artifact.key() == child_key {
                let child_id = walk.graph.push(child.clone(), Some(parent_id), depth);
                walk.graph.nodes[child_id].active = false;
                walk.graph.nodes[child_id].omission = Some(Omission::Cycle);
                observer.omit_for_cycle(&child);
                return Ok(());
            }
            cursor = walk.graph.nodes[i].parent;
        }

        let child_id = walk.graph.push(child, Some(parent_id), depth);
        self.recurse(walk, child_id, managed, observer)
    }

    /// Apply the managed version table to a node. A root's direct
    /// declarations rule over management, and the launcher bootstrap artifact
    /// is never managed.
    fn manage(
        &self,
        walk: &mut Walk,
        node_id: usize,
        managed: &ManagedVersionMap,
        observer: &mut dyn ResolutionObserver,
    ) {
        if walk.graph.nodes[node_id].depth == 1 {
            return;
        }
        let key = walk.graph.nodes[node_id].artifact.key();
        if key.group == BOOT_GROUP && key.name == BOOT_NAME {
            return;
        }
        let Some(entry) = managed.get(&key) else {
            return;
        };

        let artifact = walk.graph.nodes[node_id].artifact.clone();
        let mut updated = artifact.with_version(entry.version.clone());
        if walk.graph.nodes[node_id].premanaged_version.is_none() {
            walk.graph.nodes[node_id].premanaged_version = artifact.version.clone();
        }
        if let Some(scope) = entry.scope {
            if walk.graph.nodes[node_id].premanaged_scope.is_none() {
                walk.graph.nodes[node_id].premanaged_scope = Some(artifact.scope);
            }
            updated = updated.with_scope(scope);
        }
        observer.manage(&updated, entry);
        walk.graph.nodes[node_id].artifact = updated;
    }

    /// Select a concrete version for nodes declared with a pure range
    fn ensure_version(
        &self,
        walk: &mut Walk,
        node_id: usize,
        observer: &mut dyn ResolutionObserver,
    ) -> StevedoreResult<()> {
        if walk.graph.nodes[node_id].artifact.version.is_some() {
            return Ok(());
        }
        let key = walk.graph.nodes[node_id].artifact.key();
        let range = walk.graph.nodes[node_id].artifact.range.clone();
        let available = self.available_versions(walk, &key)?;
        match range.select_from(&available) {
            Some(version) => {
                let updated = walk.graph.nodes[node_id].artifact.with_version(version);
                observer.select_version(&updated);
                walk.graph.nodes[node_id].artifact = updated;
                Ok(())
            },
            None => Err(StevedoreError::OverConstrainedVersion {
                artifact: key.to_string(),
                range: range.to_string(),
            }),
        }
    }

    /// Mediate the new occurrence of an identity against an active prior one
    fn mediate(
        &self,
        walk: &mut Walk,
        node_id: usize,
        prior_id: usize,
        observer: &mut dyn ResolutionObserver,
    ) -> StevedoreResult<()> {
        // Version range mediation: each side continues under the
        // intersection of both requirements.
        let node_range = walk.graph.nodes[node_id].artifact.range.clone();
        let prior_range = walk.graph.nodes[prior_id].artifact.range.clone();
        self.apply_restricted(walk, prior_id, prior_range.restrict(&node_range), observer)?;
        self.apply_restricted(walk, node_id, node_range.restrict(&prior_range), observer)?;

        // Nearest wins; ties favor the occurrence seen first
        let (nearest, farthest) =
            if walk.graph.nodes[node_id].depth < walk.graph.nodes[prior_id].depth {
                (node_id, prior_id)
            } else {
                (prior_id, node_id)
            };

        let nearest_artifact = walk.graph.nodes[nearest].artifact.clone();
        let farthest_artifact = walk.graph.nodes[farthest].artifact.clone();

        let same_version = nearest_artifact.version == farthest_artifact.version;
        if !same_version && self.strict_conflicts {
            return Err(self.conflict_error(&walk.graph, nearest, farthest));
        }

        // Scope promotion may transfer the farther scope onto the winner,
        // but a root's direct dependency never has its scope overwritten.
        let promote = farthest_artifact.scope.promotes_over(nearest_artifact.scope)
            && walk.graph.nodes[nearest].depth >= 2;

        if promote {
            // Keep the nearest version with the farther scope; the farther
            // node carries both forward and the nearest one is disabled.
            if let Some(version) = nearest_artifact.version.clone() {
                walk.graph.nodes[farthest].artifact = farthest_artifact.with_version(version);
            }
            observer.update_scope(
                &walk.graph.nodes[farthest].artifact,
                walk.graph.nodes[farthest].artifact.scope,
            );
            self.disable(walk, nearest, farthest, observer)
        } else {
            self.disable(walk, farthest, nearest, observer)
        }
    }

    /// Install a restricted range on a node, reselecting the version when the
    /// current one fell outside. A recommended version survives intersection
    /// untouched; the conflict it may cause is decided by nearest-wins.
    fn apply_restricted(
        &self,
        walk: &mut Walk,
        node_id: usize,
        restricted: VersionRange,
        observer: &mut dyn ResolutionObserver,
    ) -> StevedoreResult<()> {
        let artifact = walk.graph.nodes[node_id].artifact.clone();
        let pinned = match (&artifact.version, &artifact.range.recommended) {
            (Some(version), Some(recommended)) => version == recommended,
            _ => false,
        };
        let mut updated = artifact.with_range(restricted.clone());

        let reselect = match updated.version {
            Some(ref version) => !pinned && !restricted.matches(version),
            None => true,
        };
        if reselect {
            let key = updated.key();
            let available = self.available_versions(walk, &key)?;
            match restricted.select_from(&available) {
                Some(version) => {
                    updated = updated.with_version(version);
                    observer.select_version(&updated);
                },
                None => {
                    return Err(StevedoreError::OverConstrainedVersion {
                        artifact: key.to_string(),
                        range: restricted.to_string(),
                    })
                },
            }
        }

        observer.restrict_range(&updated, &restricted);
        walk.graph.nodes[node_id].artifact = updated;
        Ok(())
    }

    /// Disable the losing node, recording what was kept instead
    fn disable(
        &self,
        walk: &mut Walk,
        loser: usize,
        winner: usize,
        observer: &mut dyn ResolutionObserver,
    ) -> StevedoreResult<()> {
        let kept = walk.graph.nodes[winner].artifact.clone();
        let omitted = walk.graph.nodes[loser].artifact.clone();
        let kept_coordinate = kept.coordinate().ok_or_else(|| StevedoreError::Inconsistent {
            detail: format!("kept node {} has no selected version", kept),
        })?;

        let same_version = omitted.version == kept.version;
        walk.graph.nodes[loser].active = false;
        walk.graph.nodes[loser].omission = Some(if same_version {
            observer.omit_for_duplicate(&omitted, &kept);
            Omission::Duplicate {
                kept: kept_coordinate,
            }
        } else {
            observer.omit_for_conflict(&omitted, &kept);
            Omission::Conflict {
                kept: kept_coordinate,
            }
        });
        Ok(())
    }

    fn conflict_error(&self, graph: &WorkGraph, kept: usize, omitted: usize) -> StevedoreError {
        let paths = tree::render_conflict_paths(
            &graph.ancestor_labels(kept),
            &graph.ancestor_labels(omitted),
        );
        StevedoreError::VersionConflict {
            artifact: graph.nodes[kept].artifact.key().to_string(),
            paths,
        }
    }

    fn selected_coordinate(&self, walk: &Walk, node_id: usize) -> StevedoreResult<Coordinate> {
        walk.graph.nodes[node_id]
            .artifact
            .coordinate()
            .ok_or_else(|| StevedoreError::Inconsistent {
                detail: format!(
                    "active node {} has no selected version",
                    walk.graph.nodes[node_id].artifact
                ),
            })
    }

    fn available_versions(
        &self,
        walk: &mut Walk,
        key: &ArtifactKey,
    ) -> StevedoreResult<Vec<Version>> {
        if let Some(hit) = walk.available.get(key) {
            return Ok(hit.clone());
        }
        let mut versions = self.source.available_versions(key)?;
        versions.sort();
        walk.available.insert(key.clone(), versions.clone());
        Ok(versions)
    }
}
