//! Descriptor wire types.
//!
//! Descriptors are the JSON documents a repository serves per artifact
//! version: identity, the module-manifest flag, regular and runtime-profile
//! dependency entries, and an optional dependency-management table. The
//! resolver never sees these types; conversions produce core types and
//! validate versions, ranges and scopes on the way in.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use stevedore_core::error::{StevedoreError, StevedoreResult};
use stevedore_core::types::coordinate::DEFAULT_PACKAGING;
use stevedore_core::types::{
    ArtifactKey, ArtifactRef, Coordinate, ManagedDependency, ManagedVersionMap, Scope, Version,
    VersionRange,
};

fn default_packaging() -> String {
    DEFAULT_PACKAGING.to_string()
}

/// Per-version artifact descriptor as served by a repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    pub group: String,
    pub name: String,
    pub version: String,

    #[serde(default = "default_packaging")]
    pub packaging: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,

    /// Whether the packaged manifest carries the module manifest marker
    #[serde(default, rename = "module-manifest")]
    pub module_manifest: bool,

    /// Regular declared dependencies
    #[serde(default)]
    pub dependencies: Vec<DependencyEntry>,

    /// Dependencies from the artifact's runtime profile, launched alongside
    /// the artifact even though the regular list does not name them
    #[serde(default, rename = "runtime-dependencies")]
    pub runtime_dependencies: Vec<DependencyEntry>,

    /// Dependency-management table, meaningful on root artifacts
    #[serde(default, rename = "dependency-management")]
    pub dependency_management: Vec<ManagementEntry>,
}

/// One dependency entry of a descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyEntry {
    pub group: String,
    pub name: String,

    /// Pinned version or bracketed range expression
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packaging: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,

    #[serde(default)]
    pub optional: bool,
}

/// One entry of a dependency-management table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagementEntry {
    pub group: String,
    pub name: String,
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl ArtifactDescriptor {
    /// Minimal descriptor for an artifact with no dependencies
    pub fn new(group: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            version: version.into(),
            packaging: default_packaging(),
            classifier: None,
            module_manifest: false,
            dependencies: Vec::new(),
            runtime_dependencies: Vec::new(),
            dependency_management: Vec::new(),
        }
    }

    fn id(&self) -> String {
        format!("{}:{}:{}", self.group, self.name, self.version)
    }

    /// The coordinate this descriptor describes
    pub fn coordinate(&self) -> StevedoreResult<Coordinate> {
        let version = Version::from_str(&self.version).map_err(|e| StevedoreError::Descriptor {
            artifact: self.id(),
            message: e.to_string(),
        })?;
        Ok(Coordinate {
            group: self.group.clone(),
            name: self.name.clone(),
            version,
            packaging: self.packaging.clone(),
            classifier: self.classifier.clone(),
        })
    }

    /// Convert the regular dependency entries into resolver references
    pub fn declared(&self) -> StevedoreResult<Vec<ArtifactRef>> {
        self.dependencies
            .iter()
            .map(|entry| entry.to_artifact(&self.id()))
            .collect()
    }

    /// Convert the runtime-profile entries into resolver references
    pub fn runtime_profile(&self) -> StevedoreResult<Vec<ArtifactRef>> {
        self.runtime_dependencies
            .iter()
            .map(|entry| entry.to_artifact(&self.id()))
            .collect()
    }

    /// Convert the management entries into a managed version table
    pub fn management(&self) -> StevedoreResult<ManagedVersionMap> {
        let mut map = ManagedVersionMap::new();
        for entry in &self.dependency_management {
            let (key, managed) = entry.to_managed(&self.id())?;
            map.insert(key, managed);
        }
        Ok(map)
    }
}

impl DependencyEntry {
    /// Entry with a pinned or ranged version and default scope
    pub fn new(group: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            version: version.into(),
            scope: None,
            packaging: None,
            classifier: None,
            optional: false,
        }
    }

    /// Entry with an explicit scope
    pub fn scoped(
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        scope: Scope,
    ) -> Self {
        Self {
            scope: Some(scope.as_str().to_string()),
            ..Self::new(group, name, version)
        }
    }

    fn to_artifact(&self, declarer: &str) -> StevedoreResult<ArtifactRef> {
        let descriptor_error = |message: String| StevedoreError::Descriptor {
            artifact: declarer.to_string(),
            message,
        };

        let range = VersionRange::parse(&self.version)
            .map_err(|e| descriptor_error(format!("dependency {}:{}: {}", self.group, self.name, e)))?;
        let scope = match self.scope {
            Some(ref scope) => Scope::from_str(scope)
                .map_err(|e| descriptor_error(format!("dependency {}:{}: {}", self.group, self.name, e)))?,
            None => Scope::default(),
        };

        let mut artifact = ArtifactRef::new(self.group.clone(), self.name.clone(), range, scope);
        if let Some(ref packaging) = self.packaging {
            artifact.packaging = packaging.clone();
        }
        if let Some(ref classifier) = self.classifier {
            artifact = artifact.with_classifier(classifier.clone());
        }
        if self.optional {
            artifact = artifact.as_optional();
        }
        Ok(artifact)
    }
}

impl ManagementEntry {
    fn to_managed(&self, declarer: &str) -> StevedoreResult<(ArtifactKey, ManagedDependency)> {
        let descriptor_error = |message: String| StevedoreError::Descriptor {
            artifact: declarer.to_string(),
            message,
        };

        let version = Version::from_str(&self.version)
            .map_err(|e| descriptor_error(format!("managed {}:{}: {}", self.group, self.name, e)))?;
        let scope = match self.scope {
            Some(ref scope) => Some(
                Scope::from_str(scope)
                    .map_err(|e| descriptor_error(format!("managed {}:{}: {}", self.group, self.name, e)))?,
            ),
            None => None,
        };

        Ok((
            ArtifactKey::new(self.group.clone(), self.name.clone()),
            ManagedDependency { version, scope },
        ))
    }
}
