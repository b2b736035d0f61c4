//! Artifact metadata access for stevedore.
//!
//! This crate is the collaborator boundary of the resolver: everything the
//! core needs from the outside world goes through the [`MetadataSource`]
//! trait. Calls are synchronous and carry no retry policy; callers treat each
//! one as opaque and potentially failing.
//!
//! Two sources are provided: a JSON descriptor repository on disk
//! ([`store::FileSource`]) and an in-process source for tests and benches
//! ([`memory::MemorySource`]).

pub mod api;
pub mod cache;
pub mod memory;
pub mod store;

use stevedore_core::error::StevedoreError;
use stevedore_core::types::{ArtifactKey, ArtifactRef, Coordinate, ManagedVersionMap, Version};

// Re-export main types
pub use api::{ArtifactDescriptor, DependencyEntry, ManagementEntry};
pub use cache::MetadataCache;
pub use memory::MemorySource;
pub use store::FileSource;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, StevedoreError>;

/// Everything the resolver asks of the outside world.
///
/// `declared_dependencies` lists an artifact's regular dependency entries and
/// `runtime_dependencies` the extra entries from its runtime profile.
/// `available_versions` reports every published version of an identity,
/// unordered. `dependency_management` returns the management table attached
/// to a root artifact, and `is_module_manifest` reports whether the packaged
/// manifest carries the module manifest marker.
pub trait MetadataSource {
    fn declared_dependencies(&self, artifact: &Coordinate) -> RegistryResult<Vec<ArtifactRef>>;

    fn available_versions(&self, key: &ArtifactKey) -> RegistryResult<Vec<Version>>;

    fn runtime_dependencies(&self, artifact: &Coordinate) -> RegistryResult<Vec<ArtifactRef>>;

    fn dependency_management(&self, root: &Coordinate) -> RegistryResult<ManagedVersionMap>;

    fn is_module_manifest(&self, artifact: &Coordinate) -> RegistryResult<bool>;
}
