//! Artifact references as they participate in resolution.

use super::coordinate::DEFAULT_PACKAGING;
use super::{ArtifactKey, Coordinate, Scope, Version, VersionRange};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A dependency reference: identity, requested range, the version selected so
/// far (if any), and the scope it was declared with.
///
/// Values are never mutated in place once shared between resolution nodes.
/// Mediation derives adjusted copies through the `with_*` constructors so the
/// kept and omitted views of the same logical dependency cannot alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub group: String,
    pub name: String,
    pub packaging: String,
    pub classifier: Option<String>,
    pub version: Option<Version>,
    pub range: VersionRange,
    pub scope: Scope,
    pub optional: bool,
}

impl ArtifactRef {
    /// Reference declared with a range; the version is picked later unless
    /// the range recommends one.
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        range: VersionRange,
        scope: Scope,
    ) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            packaging: DEFAULT_PACKAGING.to_string(),
            classifier: None,
            version: range.recommended.clone(),
            range,
            scope,
            optional: false,
        }
    }

    /// Reference pinned to an exact version
    pub fn pinned(
        group: impl Into<String>,
        name: impl Into<String>,
        version: Version,
        scope: Scope,
    ) -> Self {
        Self::new(group, name, VersionRange::pinned(version), scope)
    }

    /// The version-less identity of this reference
    pub fn key(&self) -> ArtifactKey {
        ArtifactKey {
            group: self.group.clone(),
            name: self.name.clone(),
            packaging: self.packaging.clone(),
            classifier: self.classifier.clone(),
        }
    }

    /// The full coordinate, available once a version has been selected
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.version.as_ref().map(|version| Coordinate {
            group: self.group.clone(),
            name: self.name.clone(),
            version: version.clone(),
            packaging: self.packaging.clone(),
            classifier: self.classifier.clone(),
        })
    }

    /// Copy with a different selected version
    pub fn with_version(&self, version: Version) -> Self {
        Self {
            version: Some(version),
            ..self.clone()
        }
    }

    /// Copy with a different scope
    pub fn with_scope(&self, scope: Scope) -> Self {
        Self {
            scope,
            ..self.clone()
        }
    }

    /// Copy with a restricted range, keeping the selected version
    pub fn with_range(&self, range: VersionRange) -> Self {
        Self {
            range,
            ..self.clone()
        }
    }

    /// Copy with a classifier
    pub fn with_classifier(&self, classifier: impl Into<String>) -> Self {
        Self {
            classifier: Some(classifier.into()),
            ..self.clone()
        }
    }

    /// Copy marked optional
    pub fn as_optional(&self) -> Self {
        Self {
            optional: true,
            ..self.clone()
        }
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.name)?;
        match self.version {
            Some(ref version) => write!(f, ":{}", version)?,
            None => write!(f, ":{}", self.range)?,
        }
        write!(f, " ({})", self.scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinned_reference_selects_immediately() {
        let artifact = ArtifactRef::pinned("org.example", "util", Version::new(1, 0, 0), Scope::Compile);
        assert_eq!(artifact.version, Some(Version::new(1, 0, 0)));
        assert_eq!(
            artifact.coordinate().unwrap().to_string(),
            "org.example:util:jar:1.0.0"
        );
    }

    #[test]
    fn test_ranged_reference_has_no_version() {
        let range = VersionRange::parse("[1.0,2.0)").unwrap();
        let artifact = ArtifactRef::new("org.example", "util", range, Scope::Runtime);
        assert_eq!(artifact.version, None);
        assert!(artifact.coordinate().is_none());
    }

    #[test]
    fn test_with_constructors_leave_original_untouched() {
        let artifact = ArtifactRef::pinned("org.example", "util", Version::new(1, 0, 0), Scope::Test);
        let promoted = artifact.with_scope(Scope::Runtime);
        let reselected = artifact.with_version(Version::new(2, 0, 0));

        assert_eq!(artifact.scope, Scope::Test);
        assert_eq!(artifact.version, Some(Version::new(1, 0, 0)));
        assert_eq!(promoted.scope, Scope::Runtime);
        assert_eq!(reselected.version, Some(Version::new(2, 0, 0)));
    }

    #[test]
    fn test_display_shows_range_until_selected() {
        let range = VersionRange::parse("[1.0,2.0)").unwrap();
        let artifact = ArtifactRef::new("org.example", "util", range, Scope::Compile);
        assert_eq!(artifact.to_string(), "org.example:util:[1.0,2.0) (compile)");

        let selected = artifact.with_version(Version::new(1, 4, 0));
        assert_eq!(selected.to_string(), "org.example:util:1.4.0 (compile)");
    }
}
