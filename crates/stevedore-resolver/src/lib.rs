//! Dependency graph resolution for stevedore.
//!
//! This crate turns a set of root artifacts into a single ordered launch
//! list. Resolution happens in three passes over shared, explicit state:
//!
//! 1. [`builder::TreeBuilder`] expands the roots into a mediated forest,
//!    deciding one winner per artifact identity (nearest wins) and recording
//!    every omission with the coordinate that was kept instead.
//! 2. [`visit::build_index`] walks the forest once and maps coordinates to
//!    the chosen nodes.
//! 3. [`visit::launch_order`] walks again in dependency-first order,
//!    redirecting omitted nodes through the index, and emits launch
//!    descriptors with duplicates suppressed.
//!
//! [`graph::ResolvedGraph`] offers a flattened petgraph view of the included
//! artifacts for export and for cross-checking the ordering.

pub mod builder;
pub mod graph;
pub mod tree;
pub mod visit;

// Re-export main types
pub use builder::{ResolutionObserver, RootSpec, TreeBuilder};
pub use graph::ResolvedGraph;
pub use tree::{DependencyForest, DependencyNode, NodeId, NodeState, RootTree};
pub use visit::{build_index, launch_order, LaunchOptions, ResolutionIndex};

use stevedore_core::error::StevedoreError;

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, StevedoreError>;
