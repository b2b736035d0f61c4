//! In-process metadata source for tests and benches.

use std::collections::HashMap;

use stevedore_core::error::{StevedoreError, StevedoreResult};
use stevedore_core::types::{ArtifactKey, ArtifactRef, Coordinate, ManagedVersionMap, Version};

use crate::api::ArtifactDescriptor;
use crate::{MetadataSource, RegistryResult};

/// Metadata source backed by descriptors registered in memory.
///
/// Available versions are derived from the registered descriptors plus any
/// versions advertised without one.
#[derive(Debug, Default)]
pub struct MemorySource {
    descriptors: HashMap<Coordinate, ArtifactDescriptor>,
    advertised: HashMap<ArtifactKey, Vec<Version>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor; its identity fields must parse
    pub fn insert(&mut self, descriptor: ArtifactDescriptor) -> StevedoreResult<()> {
        let coordinate = descriptor.coordinate()?;
        self.descriptors.insert(coordinate, descriptor);
        Ok(())
    }

    /// Advertise a version without registering a descriptor for it
    pub fn advertise(&mut self, key: ArtifactKey, version: Version) {
        self.advertised.entry(key).or_default().push(version);
    }

    fn descriptor(&self, artifact: &Coordinate) -> RegistryResult<&ArtifactDescriptor> {
        self.descriptors
            .get(artifact)
            .ok_or_else(|| StevedoreError::ArtifactNotFound {
                artifact: artifact.to_string(),
            })
    }
}

impl MetadataSource for MemorySource {
    fn declared_dependencies(&self, artifact: &Coordinate) -> RegistryResult<Vec<ArtifactRef>> {
        self.descriptor(artifact)?.declared()
    }

    fn available_versions(&self, key: &ArtifactKey) -> RegistryResult<Vec<Version>> {
        let mut versions: Vec<Version> = self
            .descriptors
            .keys()
            .filter(|coordinate| &coordinate.key() == key)
            .map(|coordinate| coordinate.version.clone())
            .collect();
        if let Some(advertised) = self.advertised.get(key) {
            versions.extend(advertised.iter().cloned());
        }
        versions.sort();
        versions.dedup();
        Ok(versions)
    }

    fn runtime_dependencies(&self, artifact: &Coordinate) -> RegistryResult<Vec<ArtifactRef>> {
        self.descriptor(artifact)?.runtime_profile()
    }

    fn dependency_management(&self, root: &Coordinate) -> RegistryResult<ManagedVersionMap> {
        self.descriptor(root)?.management()
    }

    fn is_module_manifest(&self, artifact: &Coordinate) -> RegistryResult<bool> {
        Ok(self.descriptor(artifact)?.module_manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DependencyEntry;

    #[test]
    fn test_missing_artifact() {
        let source = MemorySource::new();
        let coordinate = Coordinate::new("org.example", "ghost", Version::new(1, 0, 0));

        let error = source.declared_dependencies(&coordinate).unwrap_err();
        assert!(matches!(error, StevedoreError::ArtifactNotFound { .. }));
    }

    #[test]
    fn test_available_versions_sorted_and_deduped() {
        let mut source = MemorySource::new();
        source
            .insert(ArtifactDescriptor::new("org.example", "util", "2.0"))
            .unwrap();
        source
            .insert(ArtifactDescriptor::new("org.example", "util", "1.0"))
            .unwrap();
        source.advertise(ArtifactKey::new("org.example", "util"), Version::new(1, 5, 0));
        source.advertise(ArtifactKey::new("org.example", "util"), Version::new(2, 0, 0));

        let versions = source
            .available_versions(&ArtifactKey::new("org.example", "util"))
            .unwrap();
        assert_eq!(
            versions,
            vec![
                Version::new(1, 0, 0),
                Version::new(1, 5, 0),
                Version::new(2, 0, 0)
            ]
        );
    }

    #[test]
    fn test_descriptor_lookup() {
        let mut source = MemorySource::new();
        let mut descriptor = ArtifactDescriptor::new("org.example", "app", "1.0");
        descriptor.module_manifest = true;
        descriptor
            .dependencies
            .push(DependencyEntry::new("org.example", "util", "1.0"));
        source.insert(descriptor).unwrap();

        let coordinate = Coordinate::new("org.example", "app", Version::new(1, 0, 0));
        assert!(source.is_module_manifest(&coordinate).unwrap());
        assert_eq!(source.declared_dependencies(&coordinate).unwrap().len(), 1);
        assert!(source.runtime_dependencies(&coordinate).unwrap().is_empty());
    }
}
