//! Descriptor caching with TTL support

use crate::api::ArtifactDescriptor;
use dashmap::DashMap;
use std::time::{Duration, SystemTime};

/// Cache entry with TTL
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Cached descriptor
    pub descriptor: ArtifactDescriptor,
    /// When the entry was stored
    pub stored_at: SystemTime,
    /// Time-to-live duration
    pub ttl: Duration,
}

impl CacheEntry {
    /// Create new cache entry with default TTL (1 hour)
    pub fn new(descriptor: ArtifactDescriptor) -> Self {
        Self::with_ttl(descriptor, Duration::from_secs(3600))
    }

    /// Create cache entry with custom TTL
    pub fn with_ttl(descriptor: ArtifactDescriptor, ttl: Duration) -> Self {
        Self {
            descriptor,
            stored_at: SystemTime::now(),
            ttl,
        }
    }

    /// Check if cache entry is still fresh
    pub fn is_fresh(&self) -> bool {
        match self.stored_at.elapsed() {
            Ok(elapsed) => elapsed < self.ttl,
            Err(_) => false, // Clock went backwards, consider stale
        }
    }
}

/// In-memory descriptor cache with TTL, keyed by coordinate string
#[derive(Debug, Default)]
pub struct MetadataCache {
    cache: DashMap<String, CacheEntry>,
}

impl MetadataCache {
    /// Create new metadata cache
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
        }
    }

    /// Get cached descriptor if fresh
    pub fn get(&self, coordinate: &str) -> Option<ArtifactDescriptor> {
        let entry = self.cache.get(coordinate)?;
        if entry.is_fresh() {
            Some(entry.descriptor.clone())
        } else {
            drop(entry);
            // Remove stale entry
            self.cache.remove(coordinate);
            None
        }
    }

    /// Store descriptor with default TTL
    pub fn insert(&self, coordinate: String, descriptor: ArtifactDescriptor) {
        self.cache.insert(coordinate, CacheEntry::new(descriptor));
    }

    /// Store descriptor with custom TTL
    pub fn insert_with_ttl(&self, coordinate: String, descriptor: ArtifactDescriptor, ttl: Duration) {
        self.cache
            .insert(coordinate, CacheEntry::with_ttl(descriptor, ttl));
    }

    /// Check if a coordinate is cached and fresh
    pub fn contains_fresh(&self, coordinate: &str) -> bool {
        self.cache
            .get(coordinate)
            .map(|entry| entry.is_fresh())
            .unwrap_or(false)
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let mut fresh_entries = 0;
        let mut stale_entries = 0;

        for entry in self.cache.iter() {
            if entry.is_fresh() {
                fresh_entries += 1;
            } else {
                stale_entries += 1;
            }
        }

        CacheStats {
            total_entries: self.cache.len(),
            fresh_entries,
            stale_entries,
        }
    }

    /// Clear all cached entries
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Remove stale entries, returning how many were dropped
    pub fn cleanup(&self) -> usize {
        let mut removed = 0;
        self.cache.retain(|_, entry| {
            if entry.is_fresh() {
                true
            } else {
                removed += 1;
                false
            }
        });
        removed
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub total_entries: usize,
    pub fresh_entries: usize,
    pub stale_entries: usize,
}

#[cfg(test)]
mod tests;
