use super::*;
use crate::api::DependencyEntry;
use stevedore_core::types::Scope;

fn write_descriptor(root: &std::path::Path, descriptor: &ArtifactDescriptor) {
    let mut dir = root.to_path_buf();
    for segment in descriptor.group.split('.') {
        dir.push(segment);
    }
    dir.push(&descriptor.name);
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("{}.json", descriptor.version));
    fs::write(path, serde_json::to_string_pretty(descriptor).unwrap()).unwrap();
}

fn repository() -> (tempfile::TempDir, FileSource) {
    let dir = tempfile::tempdir().unwrap();

    let mut app = ArtifactDescriptor::new("org.example", "app", "1.0");
    app.module_manifest = true;
    app.dependencies
        .push(DependencyEntry::scoped("org.example", "util", "[1.0,2.0)", Scope::Runtime));
    write_descriptor(dir.path(), &app);

    write_descriptor(dir.path(), &ArtifactDescriptor::new("org.example", "util", "1.0"));
    write_descriptor(dir.path(), &ArtifactDescriptor::new("org.example", "util", "1.4"));
    write_descriptor(dir.path(), &ArtifactDescriptor::new("org.example", "util", "2.0"));

    let source = FileSource::open(Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap())
        .unwrap();
    (dir, source)
}

#[test]
fn test_open_rejects_missing_root() {
    assert!(FileSource::open("/definitely/not/a/repository").is_err());
}

#[test]
fn test_load_descriptor() {
    let (_dir, source) = repository();
    let coordinate = Coordinate::new("org.example", "app", Version::from_str("1.0").unwrap());

    assert!(source.is_module_manifest(&coordinate).unwrap());
    let declared = source.declared_dependencies(&coordinate).unwrap();
    assert_eq!(declared.len(), 1);
    assert_eq!(declared[0].name, "util");
    assert_eq!(declared[0].scope, Scope::Runtime);

    // Second load is served from the cache
    assert!(source.is_module_manifest(&coordinate).unwrap());
}

#[test]
fn test_missing_descriptor() {
    let (_dir, source) = repository();
    let coordinate = Coordinate::new("org.example", "ghost", Version::new(1, 0, 0));

    let error = source.declared_dependencies(&coordinate).unwrap_err();
    assert!(matches!(error, StevedoreError::ArtifactNotFound { .. }));
}

#[test]
fn test_available_versions() {
    let (_dir, source) = repository();

    let versions = source
        .available_versions(&ArtifactKey::new("org.example", "util"))
        .unwrap();
    assert_eq!(
        versions,
        vec![
            Version::from_str("1.0").unwrap(),
            Version::from_str("1.4").unwrap(),
            Version::from_str("2.0").unwrap(),
        ]
    );

    let none = source
        .available_versions(&ArtifactKey::new("org.example", "ghost"))
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn test_mismatched_descriptor_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let liar = ArtifactDescriptor::new("org.example", "liar", "9.9");
    // Filed under 1.0 but claims to be 9.9
    let mut path = dir.path().to_path_buf();
    for segment in ["org", "example", "liar"] {
        path.push(segment);
    }
    fs::create_dir_all(&path).unwrap();
    fs::write(
        path.join("1.0.json"),
        serde_json::to_string(&liar).unwrap(),
    )
    .unwrap();

    let source = FileSource::open(Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap())
        .unwrap();
    let coordinate = Coordinate::new("org.example", "liar", Version::from_str("1.0").unwrap());
    let error = source.declared_dependencies(&coordinate).unwrap_err();
    assert!(matches!(error, StevedoreError::Descriptor { .. }));
}

#[test]
fn test_walk_lists_every_descriptor() {
    let (_dir, source) = repository();
    let paths = source.walk().unwrap();
    assert_eq!(paths.len(), 4);
    for path in paths {
        assert!(FileSource::parse_file(&path).is_ok());
    }
}
