//! Resolution throughput over layered synthetic graphs.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::str::FromStr;

use stevedore_core::types::{ArtifactRef, Scope, ScopeFilter, Version};
use stevedore_registry::{ArtifactDescriptor, DependencyEntry, MemorySource};
use stevedore_resolver::{build_index, launch_order, LaunchOptions, RootSpec, TreeBuilder};

const GROUP: &str = "org.bench";

/// Layered graph: every artifact of one layer depends on every artifact of
/// the next, so identities are rediscovered through many paths.
fn layered_source(width: usize, depth: usize) -> MemorySource {
    let mut source = MemorySource::new();

    let mut root = ArtifactDescriptor::new(GROUP, "root", "1.0");
    root.module_manifest = true;
    for i in 0..width {
        root.dependencies
            .push(DependencyEntry::new(GROUP, format!("l0-n{}", i), "1.0"));
    }
    source.insert(root).unwrap();

    for layer in 0..depth {
        for i in 0..width {
            let mut descriptor =
                ArtifactDescriptor::new(GROUP, format!("l{}-n{}", layer, i), "1.0");
            descriptor.module_manifest = true;
            if layer + 1 < depth {
                for j in 0..width {
                    descriptor.dependencies.push(DependencyEntry::new(
                        GROUP,
                        format!("l{}-n{}", layer + 1, j),
                        "1.0",
                    ));
                }
            }
            source.insert(descriptor).unwrap();
        }
    }
    source
}

fn bench_resolution(c: &mut Criterion) {
    let source = layered_source(6, 5);
    let roots = vec![RootSpec::new(ArtifactRef::pinned(
        GROUP,
        "root",
        Version::from_str("1.0").unwrap(),
        Scope::Compile,
    ))];

    c.bench_function("resolve_layered_6x5", |b| {
        b.iter(|| {
            let filter = ScopeFilter::default();
            let forest = TreeBuilder::new(&source).build(black_box(&roots)).unwrap();
            let index = build_index(&forest, &filter).unwrap();
            launch_order(&forest, &index, &source, &filter, &LaunchOptions::default()).unwrap()
        })
    });
}

criterion_group!(benches, bench_resolution);
criterion_main!(benches);
