use super::*;

fn descriptor(version: &str) -> ArtifactDescriptor {
    ArtifactDescriptor::new("org.example", "util", version)
}

#[test]
fn test_insert_and_get() {
    let cache = MetadataCache::new();
    cache.insert("org.example:util:jar:1.0".to_string(), descriptor("1.0"));

    let hit = cache.get("org.example:util:jar:1.0").unwrap();
    assert_eq!(hit.version, "1.0");
    assert!(cache.get("org.example:util:jar:2.0").is_none());
}

#[test]
fn test_stale_entries_expire() {
    let cache = MetadataCache::new();
    cache.insert_with_ttl(
        "org.example:util:jar:1.0".to_string(),
        descriptor("1.0"),
        Duration::from_secs(0),
    );

    assert!(!cache.contains_fresh("org.example:util:jar:1.0"));
    assert!(cache.get("org.example:util:jar:1.0").is_none());
    // Stale entry was dropped by the failed get
    assert_eq!(cache.stats().total_entries, 0);
}

#[test]
fn test_cleanup_removes_only_stale() {
    let cache = MetadataCache::new();
    cache.insert("fresh".to_string(), descriptor("1.0"));
    cache.insert_with_ttl("stale".to_string(), descriptor("2.0"), Duration::from_secs(0));

    let removed = cache.cleanup();
    assert_eq!(removed, 1);

    let stats = cache.stats();
    assert_eq!(stats.total_entries, 1);
    assert_eq!(stats.fresh_entries, 1);
    assert_eq!(stats.stale_entries, 0);
}

#[test]
fn test_clear() {
    let cache = MetadataCache::new();
    cache.insert("a".to_string(), descriptor("1.0"));
    cache.insert("b".to_string(), descriptor("2.0"));

    cache.clear();
    assert_eq!(cache.stats().total_entries, 0);
}
