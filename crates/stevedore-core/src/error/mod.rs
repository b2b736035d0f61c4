//! Error types and result aliases for stevedore operations.
//!
//! Provides a unified error type covering plan parsing, repository access and
//! resolution failures, with actionable messages for the command surface.

use crate::types::version::VersionError;
use thiserror::Error;

/// Unified error type for all stevedore operations
#[derive(Error, Debug)]
pub enum StevedoreError {
    // Plan errors
    #[error("failed to parse plan file: {message} at line {line}, column {column}")]
    PlanParse {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("plan field '{field}' is invalid: {reason}")]
    PlanValidation { field: String, reason: String },

    // Repository errors
    #[error("artifact '{artifact}' not found in repository")]
    ArtifactNotFound { artifact: String },

    #[error("invalid descriptor for {artifact}: {message}")]
    Descriptor { artifact: String, message: String },

    #[error("metadata retrieval failed for {artifact}: {message}")]
    Metadata { artifact: String, message: String },

    // Resolution errors
    #[error("no version of {artifact} satisfies the restricted range {range}")]
    OverConstrainedVersion { artifact: String, range: String },

    #[error("unresolved version conflict for {artifact}:\n{paths}")]
    VersionConflict { artifact: String, paths: String },

    #[error("no included artifact found for omitted node {artifact}")]
    MissingRelatedArtifact { artifact: String },

    #[error("internal consistency violation: {detail}")]
    Inconsistent { detail: String },

    // Version errors
    #[error(transparent)]
    Version(#[from] VersionError),

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for stevedore operations
pub type StevedoreResult<T> = Result<T, StevedoreError>;

impl StevedoreError {
    /// Create an IO error from std::io::Error
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a metadata retrieval error for an artifact
    pub fn metadata(artifact: impl ToString, message: impl Into<String>) -> Self {
        Self::Metadata {
            artifact: artifact.to_string(),
            message: message.into(),
        }
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            StevedoreError::ArtifactNotFound { .. } => {
                Some("Check the coordinate spelling and that the repository contains a descriptor for it")
            },
            StevedoreError::OverConstrainedVersion { .. } => {
                Some("Relax one of the declared version ranges so at least one published version satisfies them all")
            },
            StevedoreError::VersionConflict { .. } => {
                Some("Align the conflicting declarations, or disable strict conflicts to fall back to nearest-wins")
            },
            StevedoreError::PlanParse { .. } | StevedoreError::PlanValidation { .. } => {
                Some("Run 'stevedore check' for a full validation of the plan file")
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let error = StevedoreError::OverConstrainedVersion {
            artifact: "org.example:util:jar".to_string(),
            range: "[2.0,3.0)".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("org.example:util:jar"));
        assert!(message.contains("[2.0,3.0)"));
    }

    #[test]
    fn test_conflict_message_carries_paths() {
        let error = StevedoreError::VersionConflict {
            artifact: "org.example:util:jar".to_string(),
            paths: "  kept chain\n  omitted chain".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("kept chain"));
        assert!(message.contains("omitted chain"));
    }

    #[test]
    fn test_suggestions() {
        let error = StevedoreError::ArtifactNotFound {
            artifact: "org.example:util:jar".to_string(),
        };
        assert!(error.suggestion().is_some());

        let error = StevedoreError::Inconsistent {
            detail: "whatever".to_string(),
        };
        assert!(error.suggestion().is_none());
    }
}
