//! Provisioning plan configuration for stevedore.
//!
//! A plan file names the root artifacts to resolve, start-level directives,
//! excluded core artifacts and version management overrides. Parsing
//! validates everything up front so resolution only sees well-formed input.

pub mod plan;

pub use plan::{
    ArtifactSection, DirectiveSection, ExcludeSection, ManagementSpec, PlanSection, PlanToml,
};

use stevedore_core::error::StevedoreError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, StevedoreError>;
