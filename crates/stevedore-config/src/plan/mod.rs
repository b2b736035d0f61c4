//! plan.toml parsing, validation and conversion into resolver inputs.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::str::FromStr;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use stevedore_core::error::{StevedoreError, StevedoreResult};
use stevedore_core::types::launch::DEFAULT_SCHEME;
use stevedore_core::types::{
    ArtifactKey, ArtifactRef, ManagedDependency, ManagedVersionMap, Scope, StartDirective, Version,
    VersionRange,
};

/// Complete plan.toml configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanToml {
    /// Plan-wide settings
    #[serde(default)]
    pub plan: PlanSection,

    /// Root artifacts to resolve
    #[serde(default, rename = "artifact")]
    pub artifacts: Vec<ArtifactSection>,

    /// Start annotations applied to matching launch entries
    #[serde(default, rename = "directive")]
    pub directives: Vec<DirectiveSection>,

    /// Core artifacts already present in the runtime, never launched again
    #[serde(default, rename = "exclude")]
    pub excludes: Vec<ExcludeSection>,

    /// Version management overrides, keyed by `group:name`
    #[serde(default)]
    pub management: HashMap<String, ManagementSpec>,
}

/// Plan-wide settings section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSection {
    /// Scheme used when rendering launch descriptors
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Fail on version conflicts instead of nearest-wins mediation
    #[serde(default, rename = "strict-conflicts")]
    pub strict_conflicts: bool,

    /// Repository root; the command line may override it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
}

/// One root artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSection {
    pub group: String,
    pub name: String,
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packaging: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
}

/// One start directive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectiveSection {
    pub group: String,
    pub name: String,

    #[serde(default, rename = "start-level", skip_serializing_if = "Option::is_none")]
    pub start_level: Option<u32>,

    #[serde(default, rename = "no-start")]
    pub no_start: bool,
}

/// One excluded core artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludeSection {
    pub group: String,
    pub name: String,
}

/// Management entry: a bare version string or a detailed table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManagementSpec {
    /// Bare version string
    Version(String),

    /// Detailed specification
    Detailed {
        version: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scope: Option<String>,
    },
}

fn default_scheme() -> String {
    DEFAULT_SCHEME.to_string()
}

impl Default for PlanSection {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            strict_conflicts: false,
            repository: None,
        }
    }
}

impl PlanToml {
    /// Load and parse a plan file
    pub fn load(path: &Utf8Path) -> StevedoreResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| StevedoreError::io(format!("failed to read plan {}", path), e))?;
        Self::parse(&text)
    }

    /// Parse plan text
    pub fn parse(text: &str) -> StevedoreResult<Self> {
        toml::from_str(text).map_err(|error| {
            let (line, column) = error
                .span()
                .map(|span| position_of(text, span.start))
                .unwrap_or((0, 0));
            StevedoreError::PlanParse {
                message: error.message().to_string(),
                line,
                column,
            }
        })
    }

    /// Validate field contents beyond what parsing enforces
    pub fn validate(&self) -> StevedoreResult<()> {
        if self.artifacts.is_empty() {
            return Err(StevedoreError::PlanValidation {
                field: "artifact".to_string(),
                reason: "at least one root artifact is required".to_string(),
            });
        }
        for artifact in &self.artifacts {
            if artifact.group.is_empty() || artifact.name.is_empty() {
                return Err(StevedoreError::PlanValidation {
                    field: "artifact".to_string(),
                    reason: "group and name must not be empty".to_string(),
                });
            }
            Version::from_str(&artifact.version).map_err(|e| StevedoreError::PlanValidation {
                field: format!("artifact {}:{}", artifact.group, artifact.name),
                reason: e.to_string(),
            })?;
        }
        for directive in &self.directives {
            if directive.start_level == Some(0) {
                return Err(StevedoreError::PlanValidation {
                    field: format!("directive {}:{}", directive.group, directive.name),
                    reason: "start level must be positive".to_string(),
                });
            }
        }
        for (key, spec) in &self.management {
            let field = format!("management {}", key);
            ArtifactKey::from_str(key).map_err(|e| StevedoreError::PlanValidation {
                field: field.clone(),
                reason: e.to_string(),
            })?;
            Version::from_str(spec.version()).map_err(|e| StevedoreError::PlanValidation {
                field: field.clone(),
                reason: e.to_string(),
            })?;
            if let Some(scope) = spec.scope() {
                Scope::from_str(scope).map_err(|e| StevedoreError::PlanValidation {
                    field,
                    reason: e.to_string(),
                })?;
            }
        }
        Ok(())
    }

    /// The root artifacts as resolver references
    pub fn root_artifacts(&self) -> StevedoreResult<Vec<ArtifactRef>> {
        self.artifacts
            .iter()
            .map(|section| {
                let version =
                    Version::from_str(&section.version).map_err(StevedoreError::from)?;
                let mut artifact = ArtifactRef::new(
                    section.group.clone(),
                    section.name.clone(),
                    VersionRange::pinned(version),
                    Scope::Compile,
                );
                if let Some(ref packaging) = section.packaging {
                    artifact.packaging = packaging.clone();
                }
                if let Some(ref classifier) = section.classifier {
                    artifact = artifact.with_classifier(classifier.clone());
                }
                Ok(artifact)
            })
            .collect()
    }

    /// The start directives
    pub fn start_directives(&self) -> Vec<StartDirective> {
        self.directives
            .iter()
            .map(|section| StartDirective {
                group: section.group.clone(),
                name: section.name.clone(),
                start_level: section.start_level,
                no_start: section.no_start,
            })
            .collect()
    }

    /// The excluded core artifact identities
    pub fn excluded_keys(&self) -> BTreeSet<ArtifactKey> {
        self.excludes
            .iter()
            .map(|section| ArtifactKey::new(section.group.clone(), section.name.clone()))
            .collect()
    }

    /// The management overrides as a managed version table
    pub fn managed(&self) -> StevedoreResult<ManagedVersionMap> {
        let mut map = ManagedVersionMap::new();
        // Sort for a deterministic table independent of HashMap order
        let mut entries: Vec<_> = self.management.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (key, spec) in entries {
            let key = ArtifactKey::from_str(key)?;
            let version = Version::from_str(spec.version())?;
            let scope = match spec.scope() {
                Some(scope) => {
                    Some(
                        Scope::from_str(scope).map_err(|e| StevedoreError::PlanValidation {
                            field: format!("management {}", key),
                            reason: e.to_string(),
                        })?,
                    )
                },
                None => None,
            };
            map.insert(key, ManagedDependency { version, scope });
        }
        Ok(map)
    }
}

impl ManagementSpec {
    fn version(&self) -> &str {
        match self {
            ManagementSpec::Version(version) => version,
            ManagementSpec::Detailed { version, .. } => version,
        }
    }

    fn scope(&self) -> Option<&str> {
        match self {
            ManagementSpec::Version(_) => None,
            ManagementSpec::Detailed { scope, .. } => scope.as_deref(),
        }
    }
}

/// 1-based line and column of a byte offset
fn position_of(text: &str, offset: usize) -> (usize, usize) {
    let clamped = offset.min(text.len());
    let before = &text[..clamped];
    let line = before.matches('\n').count() + 1;
    let column = before.rfind('\n').map(|i| clamped - i).unwrap_or(clamped + 1);
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"
[plan]
scheme = "mvn"
strict-conflicts = true
repository = "/var/lib/stevedore/repository"

[[artifact]]
group = "org.example"
name = "app"
version = "1.2.0"

[[artifact]]
group = "org.example"
name = "extras"
version = "0.9"

[[directive]]
group = "org.example"
name = "app"
start-level = 2

[[directive]]
group = "org.example"
name = "extras"
no-start = true

[[exclude]]
group = "org.platform"
name = "boot-api"

[management]
"org.example:log" = "1.4"
"org.example:util" = { version = "2.0", scope = "runtime" }
"#;

    #[test]
    fn test_parse_full_plan() {
        let plan = PlanToml::parse(EXAMPLE).unwrap();
        plan.validate().unwrap();

        assert_eq!(plan.plan.scheme, "mvn");
        assert!(plan.plan.strict_conflicts);
        assert_eq!(plan.artifacts.len(), 2);
        assert_eq!(plan.directives.len(), 2);
        assert_eq!(plan.excludes.len(), 1);
        assert_eq!(plan.management.len(), 2);
    }

    #[test]
    fn test_defaults() {
        let plan = PlanToml::parse(
            r#"
[[artifact]]
group = "org.example"
name = "app"
version = "1.0"
"#,
        )
        .unwrap();

        assert_eq!(plan.plan.scheme, "mvn");
        assert!(!plan.plan.strict_conflicts);
        assert!(plan.plan.repository.is_none());
        assert!(plan.directives.is_empty());
    }

    #[test]
    fn test_parse_error_carries_location() {
        let error = PlanToml::parse("[[artifact]\ngroup = \"x\"\n").unwrap_err();
        match error {
            StevedoreError::PlanParse { line, .. } => assert_eq!(line, 1),
            other => panic!("expected a parse error, got {}", other),
        }
    }

    #[test]
    fn test_validation_requires_roots() {
        let plan = PlanToml::parse("").unwrap();
        let error = plan.validate().unwrap_err();
        assert!(matches!(error, StevedoreError::PlanValidation { .. }));
    }

    #[test]
    fn test_validation_rejects_bad_versions_and_levels() {
        let plan = PlanToml::parse(
            r#"
[[artifact]]
group = "org.example"
name = "app"
version = "not!"
"#,
        )
        .unwrap();
        assert!(plan.validate().is_err());

        let plan = PlanToml::parse(
            r#"
[[artifact]]
group = "org.example"
name = "app"
version = "1.0"

[[directive]]
group = "org.example"
name = "app"
start-level = 0
"#,
        )
        .unwrap();
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_conversions() {
        let plan = PlanToml::parse(EXAMPLE).unwrap();

        let roots = plan.root_artifacts().unwrap();
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].name, "app");
        assert_eq!(roots[0].version, Some(Version::from_str("1.2.0").unwrap()));

        let directives = plan.start_directives();
        assert_eq!(directives[0].start_level, Some(2));
        assert!(directives[1].no_start);

        let excluded = plan.excluded_keys();
        assert!(excluded.contains(&ArtifactKey::new("org.platform", "boot-api")));

        let managed = plan.managed().unwrap();
        let util = managed.get(&ArtifactKey::new("org.example", "util")).unwrap();
        assert_eq!(util.version, Version::from_str("2.0").unwrap());
        assert_eq!(util.scope, Some(Scope::Runtime));
        let log = managed.get(&ArtifactKey::new("org.example", "log")).unwrap();
        assert_eq!(log.scope, None);
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.toml");
        fs::write(&path, EXAMPLE).unwrap();

        let utf8 = Utf8Path::from_path(&path).unwrap();
        let plan = PlanToml::load(utf8).unwrap();
        assert_eq!(plan.artifacts.len(), 2);

        assert!(PlanToml::load(Utf8Path::new("/missing/plan.toml")).is_err());
    }
}
