//! Core data types for artifact resolution.
//!
//! Defines artifact identity (coordinates and version-less keys), versions and
//! version ranges, dependency scopes, launch descriptors, and the managed
//! version table consulted during resolution.

pub mod artifact;
pub mod coordinate;
pub mod launch;
pub mod managed;
pub mod scope;
pub mod version;

pub use artifact::ArtifactRef;
pub use coordinate::{ArtifactKey, Coordinate};
pub use launch::{LaunchDescriptor, StartDirective};
pub use managed::{ManagedDependency, ManagedVersionMap};
pub use scope::{Scope, ScopeFilter};
pub use version::{Version, VersionRange};
