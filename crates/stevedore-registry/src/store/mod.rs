//! On-disk descriptor repository.
//!
//! Repository layout mirrors coordinate structure: group segments become
//! directories, followed by the artifact name, with one JSON descriptor per
//! published version:
//!
//! ```text
//! <root>/org/example/util/1.0.json
//! <root>/org/example/util/1.1.json
//! ```

use std::fs;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use stevedore_core::error::{StevedoreError, StevedoreResult};
use stevedore_core::types::{ArtifactKey, ArtifactRef, Coordinate, ManagedVersionMap, Version};

use crate::api::ArtifactDescriptor;
use crate::cache::MetadataCache;
use crate::{MetadataSource, RegistryResult};

/// Metadata source reading descriptors from a local repository directory.
///
/// Parsed descriptors are held in a TTL cache so repeated lookups during one
/// resolution do not re-read the file.
#[derive(Debug)]
pub struct FileSource {
    root: Utf8PathBuf,
    cache: MetadataCache,
}

impl FileSource {
    /// Open a repository rooted at the given directory
    pub fn open(root: impl Into<Utf8PathBuf>) -> StevedoreResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StevedoreError::Io {
                message: format!("repository root {} is not a directory", root),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, root.to_string()),
            });
        }
        Ok(Self {
            root,
            cache: MetadataCache::new(),
        })
    }

    /// The repository root directory
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn artifact_dir(&self, key: &ArtifactKey) -> Utf8PathBuf {
        let mut dir = self.root.clone();
        for segment in key.group.split('.') {
            dir.push(segment);
        }
        dir.push(&key.name);
        dir
    }

    fn descriptor_path(&self, artifact: &Coordinate) -> Utf8PathBuf {
        let mut path = self.artifact_dir(&artifact.key());
        path.push(format!("{}.json", artifact.version));
        path
    }

    fn load_descriptor(&self, artifact: &Coordinate) -> RegistryResult<ArtifactDescriptor> {
        let id = artifact.to_string();
        if let Some(hit) = self.cache.get(&id) {
            return Ok(hit);
        }

        let path = self.descriptor_path(artifact);
        if !path.is_file() {
            return Err(StevedoreError::ArtifactNotFound { artifact: id });
        }

        let text = fs::read_to_string(&path)
            .map_err(|e| StevedoreError::io(format!("failed to read {}", path), e))?;
        let descriptor: ArtifactDescriptor =
            serde_json::from_str(&text).map_err(|e| StevedoreError::Descriptor {
                artifact: id.clone(),
                message: e.to_string(),
            })?;

        // The descriptor must describe the coordinate it was filed under
        if descriptor.group != artifact.group
            || descriptor.name != artifact.name
            || Version::from_str(&descriptor.version).ok().as_ref() != Some(&artifact.version)
        {
            return Err(StevedoreError::Descriptor {
                artifact: id,
                message: format!(
                    "descriptor at {} declares {}:{}:{}",
                    path, descriptor.group, descriptor.name, descriptor.version
                ),
            });
        }

        debug!(artifact = %id, path = %path, "loaded descriptor");
        self.cache.insert(id, descriptor.clone());
        Ok(descriptor)
    }

    /// Every descriptor file in the repository, for validation sweeps
    pub fn walk(&self) -> StevedoreResult<Vec<Utf8PathBuf>> {
        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|e| StevedoreError::Io {
                message: format!("failed to walk repository {}", self.root),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.path().extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let path = Utf8PathBuf::from_path_buf(entry.path().to_path_buf()).map_err(|p| {
                StevedoreError::Io {
                    message: format!("non UTF-8 path in repository: {}", p.display()),
                    source: std::io::Error::new(std::io::ErrorKind::InvalidData, "non UTF-8 path"),
                }
            })?;
            paths.push(path);
        }
        Ok(paths)
    }

    /// Parse one descriptor file, used by validation sweeps
    pub fn parse_file(path: &Utf8Path) -> StevedoreResult<ArtifactDescriptor> {
        let text = fs::read_to_string(path)
            .map_err(|e| StevedoreError::io(format!("failed to read {}", path), e))?;
        serde_json::from_str(&text).map_err(|e| StevedoreError::Descriptor {
            artifact: path.to_string(),
            message: e.to_string(),
        })
    }
}

impl MetadataSource for FileSource {
    fn declared_dependencies(&self, artifact: &Coordinate) -> RegistryResult<Vec<ArtifactRef>> {
        self.load_descriptor(artifact)?.declared()
    }

    fn available_versions(&self, key: &ArtifactKey) -> RegistryResult<Vec<Version>> {
        let dir = self.artifact_dir(key);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir)
            .map_err(|e| StevedoreError::io(format!("failed to list {}", dir), e))?;

        let mut versions = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| StevedoreError::io(format!("failed to list {}", dir), e))?;
            let file_name = entry.file_name();
            let Some(stem) = file_name.to_str().and_then(|n| n.strip_suffix(".json")) else {
                continue;
            };
            // Files that do not parse as versions are not published versions
            if let Ok(version) = Version::from_str(stem) {
                versions.push(version);
            }
        }
        versions.sort();
        versions.dedup();
        Ok(versions)
    }

    fn runtime_dependencies(&self, artifact: &Coordinate) -> RegistryResult<Vec<ArtifactRef>> {
        self.load_descriptor(artifact)?.runtime_profile()
    }

    fn dependency_management(&self, root: &Coordinate) -> RegistryResult<ManagedVersionMap> {
        self.load_descriptor(root)?.management()
    }

    fn is_module_manifest(&self, artifact: &Coordinate) -> RegistryResult<bool> {
        Ok(self.load_descriptor(artifact)?.module_manifest)
    }
}

#[cfg(test)]
mod tests;
