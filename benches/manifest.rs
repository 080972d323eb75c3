//! Benchmarks for repotag resolution and requirements manifest selection.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pkgforge::config::TagRule;
use pkgforge::requirements::{entry_env, select_entries};

fn manifest_with_deps(count: usize) -> serde_json::Value {
    let deps: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            serde_json::json!({
                "package": format!("dep-{}", i),
                "version": format!("1.0.{}", i),
                "builder": "pip",
                "repo": format!("https://example.com/dep-{}.git", i),
            })
        })
        .collect();
    serde_json::json!({ "build_deps": deps })
}

fn bench_tag_resolution(c: &mut Criterion) {
    let default_rule = TagRule::default();
    let capture_rule = TagRule::new(r"^(\d+)\.(\d+)\.\d+$", "release-$1.$2");

    c.bench_function("tag_resolve_default", |b| {
        b.iter(|| default_rule.resolve(black_box("1.2.3")).unwrap())
    });
    c.bench_function("tag_resolve_captures", |b| {
        b.iter(|| capture_rule.resolve(black_box("1.2.3")).unwrap())
    });
}

fn bench_manifest_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("manifest_selection");
    for count in [10, 100, 1000] {
        let doc = manifest_with_deps(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &doc, |b, doc| {
            b.iter(|| select_entries(black_box(doc), "build_deps").unwrap().len())
        });
    }
    group.finish();
}

fn bench_entry_extraction(c: &mut Criterion) {
    let doc = manifest_with_deps(1);
    let entry = &doc["build_deps"][0];
    let fields: Vec<String> = ["package", "version", "builder", "repo"]
        .iter()
        .map(|f| f.to_string())
        .collect();

    c.bench_function("entry_env", |b| {
        b.iter(|| entry_env(black_box(entry), &fields, "PKGFORGE_"))
    });
}

criterion_group!(
    benches,
    bench_tag_resolution,
    bench_manifest_selection,
    bench_entry_extraction
);
criterion_main!(benches);
