use std::fs;

use camino::Utf8PathBuf;
use tempfile::TempDir;

use stevedore_core::types::ScopeFilter;
use stevedore_registry::{ArtifactDescriptor, DependencyEntry};
use stevedore_resolver::{build_index, launch_order, LaunchOptions};

use super::*;

fn write_descriptor(root: &std::path::Path, descriptor: &ArtifactDescriptor) {
    let mut dir = root.to_path_buf();
    for segment in descriptor.group.split('.') {
        dir.push(segment);
    }
    dir.push(&descriptor.name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join(format!("{}.json", descriptor.version)),
        serde_json::to_string_pretty(descriptor).unwrap(),
    )
    .unwrap();
}

/// Repository with app -> util and a management override candidate
fn fixture() -> (TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();

    let mut app = ArtifactDescriptor::new("org.example", "app", "1.0");
    app.module_manifest = true;
    app.dependencies
        .push(DependencyEntry::new("org.example", "mid", "1.0"));
    write_descriptor(dir.path(), &app);

    let mut mid = ArtifactDescriptor::new("org.example", "mid", "1.0");
    mid.module_manifest = true;
    mid.dependencies
        .push(DependencyEntry::new("org.example", "util", "1.0"));
    write_descriptor(dir.path(), &mid);

    let mut util_one = ArtifactDescriptor::new("org.example", "util", "1.0");
    util_one.module_manifest = true;
    write_descriptor(dir.path(), &util_one);
    let mut util_two = ArtifactDescriptor::new("org.example", "util", "2.0");
    util_two.module_manifest = true;
    write_descriptor(dir.path(), &util_two);

    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    (dir, root)
}

fn write_plan(dir: &std::path::Path, text: &str) -> Utf8PathBuf {
    let path = dir.join("plan.toml");
    fs::write(&path, text).unwrap();
    Utf8PathBuf::from_path_buf(path).unwrap()
}

const PLAN: &str = r#"
[[artifact]]
group = "org.example"
name = "app"
version = "1.0"

[[directive]]
group = "org.example"
name = "mid"
start-level = 4

[management]
"org.example:util" = "2.0"
"#;

#[test]
fn test_load_plan_validates() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plan(dir.path(), PLAN);
    let plan = load_plan(&path).unwrap();
    assert_eq!(plan.artifacts.len(), 1);

    let empty = write_plan(dir.path(), "");
    assert!(load_plan(&empty).is_err());
}

#[test]
fn test_open_repository_prefers_flag() {
    let (_repo_dir, repo) = fixture();
    let plan_dir = tempfile::tempdir().unwrap();
    let plan = load_plan(&write_plan(plan_dir.path(), PLAN)).unwrap();

    let source = open_repository(&plan, Some(repo.clone())).unwrap();
    assert_eq!(source.root(), repo.as_path());

    assert!(open_repository(&plan, Some(Utf8PathBuf::from("/missing"))).is_err());
}

#[test]
fn test_resolution_pipeline_applies_plan_management() {
    let (_repo_dir, repo) = fixture();
    let plan_dir = tempfile::tempdir().unwrap();
    let plan = load_plan(&write_plan(plan_dir.path(), PLAN)).unwrap();
    let source = open_repository(&plan, Some(repo)).unwrap();

    let forest = build_forest(&plan, &source, false).unwrap();
    let filter = ScopeFilter::default();
    let index = build_index(&forest, &filter).unwrap();
    let directives = plan.start_directives();
    let options = LaunchOptions {
        directives: &directives,
        strict_conflicts: false,
    };
    let output = launch_order(&forest, &index, &source, &filter, &options).unwrap();

    let lines: Vec<String> = output
        .iter()
        .map(|d| d.render(&plan.plan.scheme))
        .collect();
    // The transitive util is managed up to 2.0, mid carries its directive
    assert_eq!(
        lines,
        vec![
            "mvn:org.example/util/2.0",
            "mvn:org.example/mid/1.0@4",
            "mvn:org.example/app/1.0",
        ]
    );
}

#[test]
fn test_repository_walk_roundtrip() {
    let (_repo_dir, repo) = fixture();
    let source = FileSource::open(repo).unwrap();
    let paths = source.walk().unwrap();
    assert_eq!(paths.len(), 4);
    for path in paths {
        assert!(FileSource::parse_file(&path).is_ok());
    }
}
