//! The managed version table consulted during resolution.

use super::{ArtifactKey, Scope, Version};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Entry of a dependency-management table: the version an unversioned
/// identity resolves to, and optionally a scope override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedDependency {
    pub version: Version,
    pub scope: Option<Scope>,
}

/// Insertion-ordered map from version-less identity to managed entries.
///
/// A root's own coordinate must be removed before resolution starts so a
/// project cannot manage itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedVersionMap {
    entries: IndexMap<ArtifactKey, ManagedDependency>,
}

impl ManagedVersionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for an identity
    pub fn insert(&mut self, key: ArtifactKey, managed: ManagedDependency) {
        self.entries.insert(key, managed);
    }

    /// Look up the managed entry for an identity
    pub fn get(&self, key: &ArtifactKey) -> Option<&ManagedDependency> {
        self.entries.get(key)
    }

    /// Remove an identity, used to strip a root's own coordinate
    pub fn remove(&mut self, key: &ArtifactKey) -> Option<ManagedDependency> {
        self.entries.shift_remove(key)
    }

    /// Overlay another table; entries of `other` win on collision
    pub fn merge(&mut self, other: ManagedVersionMap) {
        for (key, managed) in other.entries {
            self.entries.insert(key, managed);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArtifactKey, &ManagedDependency)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn managed(major: u64) -> ManagedDependency {
        ManagedDependency {
            version: Version::new(major, 0, 0),
            scope: None,
        }
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut map = ManagedVersionMap::new();
        map.insert(ArtifactKey::new("org.example", "util"), managed(2));

        let entry = map.get(&ArtifactKey::new("org.example", "util")).unwrap();
        assert_eq!(entry.version, Version::new(2, 0, 0));
        assert!(map.get(&ArtifactKey::new("org.example", "other")).is_none());
    }

    #[test]
    fn test_remove_own_coordinate() {
        let mut map = ManagedVersionMap::new();
        map.insert(ArtifactKey::new("org.example", "app"), managed(1));
        map.insert(ArtifactKey::new("org.example", "util"), managed(2));

        map.remove(&ArtifactKey::new("org.example", "app"));
        assert_eq!(map.len(), 1);
        assert!(map.get(&ArtifactKey::new("org.example", "app")).is_none());
    }

    #[test]
    fn test_merge_prefers_overlay() {
        let mut base = ManagedVersionMap::new();
        base.insert(ArtifactKey::new("org.example", "util"), managed(1));
        base.insert(ArtifactKey::new("org.example", "log"), managed(1));

        let mut overlay = ManagedVersionMap::new();
        overlay.insert(ArtifactKey::new("org.example", "util"), managed(3));

        base.merge(overlay);
        assert_eq!(
            base.get(&ArtifactKey::new("org.example", "util"))
                .unwrap()
                .version,
            Version::new(3, 0, 0)
        );
        assert_eq!(base.len(), 2);
    }
}
