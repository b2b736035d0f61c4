//! Artifact coordinates and version-less identity keys.

use super::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::version::VersionError;

/// Default packaging for artifacts that do not declare one
pub const DEFAULT_PACKAGING: &str = "jar";

/// Packaging of aggregation-only artifacts, never launched themselves
pub const POM_PACKAGING: &str = "pom";

/// Full artifact coordinate: group, name, version, packaging and an optional
/// classifier. Two coordinates are the same artifact when every field matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub group: String,
    pub name: String,
    pub version: Version,
    pub packaging: String,
    pub classifier: Option<String>,
}

/// Version-less identity: the key under which conflicting versions of the
/// same logical artifact meet during mediation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactKey {
    pub group: String,
    pub name: String,
    pub packaging: String,
    pub classifier: Option<String>,
}

impl Coordinate {
    /// Create a jar coordinate without classifier
    pub fn new(group: impl Into<String>, name: impl Into<String>, version: Version) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            version,
            packaging: DEFAULT_PACKAGING.to_string(),
            classifier: None,
        }
    }

    /// The version-less identity of this coordinate
    pub fn key(&self) -> ArtifactKey {
        ArtifactKey {
            group: self.group.clone(),
            name: self.name.clone(),
            packaging: self.packaging.clone(),
            classifier: self.classifier.clone(),
        }
    }
}

impl ArtifactKey {
    /// Create a jar identity without classifier
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            packaging: DEFAULT_PACKAGING.to_string(),
            classifier: None,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.name, self.packaging)?;
        if let Some(ref classifier) = self.classifier {
            write!(f, ":{}", classifier)?;
        }
        write!(f, ":{}", self.version)
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.name, self.packaging)?;
        if let Some(ref classifier) = self.classifier {
            write!(f, ":{}", classifier)?;
        }
        Ok(())
    }
}

impl FromStr for Coordinate {
    type Err = VersionError;

    /// Parse the `group:name:version` shorthand used on command lines
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(VersionError::InvalidFormat {
                input: s.to_string(),
            });
        }
        let version = Version::from_str(parts[2])?;
        Ok(Coordinate::new(parts[0], parts[1], version))
    }
}

impl FromStr for ArtifactKey {
    type Err = VersionError;

    /// Parse the `group:name` shorthand used by management tables
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) {
            return Err(VersionError::InvalidFormat {
                input: s.to_string(),
            });
        }
        Ok(ArtifactKey::new(parts[0], parts[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_display() {
        let coordinate = Coordinate::new("org.example", "util", Version::new(1, 2, 0));
        assert_eq!(coordinate.to_string(), "org.example:util:jar:1.2.0");

        let mut with_classifier = coordinate.clone();
        with_classifier.classifier = Some("sources".to_string());
        assert_eq!(
            with_classifier.to_string(),
            "org.example:util:jar:sources:1.2.0"
        );
    }

    #[test]
    fn test_key_ignores_version() {
        let a = Coordinate::new("org.example", "util", Version::new(1, 0, 0));
        let b = Coordinate::new("org.example", "util", Version::new(2, 0, 0));
        assert_eq!(a.key(), b.key());
        assert_eq!(a.key().to_string(), "org.example:util:jar");
    }

    #[test]
    fn test_coordinate_parse() {
        let coordinate: Coordinate = "org.example:util:1.2.0".parse().unwrap();
        assert_eq!(coordinate.group, "org.example");
        assert_eq!(coordinate.name, "util");
        assert_eq!(coordinate.version, Version::new(1, 2, 0));

        assert!("org.example:util".parse::<Coordinate>().is_err());
        assert!("a:b:c:d:1.0".parse::<Coordinate>().is_err());
    }

    #[test]
    fn test_key_parse() {
        let key: ArtifactKey = "org.example:util".parse().unwrap();
        assert_eq!(key, ArtifactKey::new("org.example", "util"));

        assert!("org.example".parse::<ArtifactKey>().is_err());
        assert!(":util".parse::<ArtifactKey>().is_err());
    }
}
