//! # stevedore-core
//!
//! Core types and utilities shared across all stevedore crates.
//!
//! This crate provides:
//! - Version and VersionRange types following repository coordinate conventions
//! - Coordinate, ArtifactKey and ArtifactRef types for artifact identity
//! - Scope and ScopeFilter types for dependency scope handling
//! - LaunchDescriptor, the externally observable launch-list entry
//! - StevedoreError for unified error handling
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (Version, Coordinate, ArtifactRef, etc.)
//! - `error`: Error types and result aliases

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{StevedoreError, StevedoreResult};
pub use types::{
    ArtifactKey, ArtifactRef, Coordinate, LaunchDescriptor, ManagedDependency, ManagedVersionMap,
    Scope, ScopeFilter, StartDirective, Version, VersionRange,
};
