//! Conversion benchmarks.
//!
//! Run with: cargo bench --bench convert_benchmark

use bom_tools::codec::{deserialize, serialize};
use bom_tools::diff::component_version_diff;
use bom_tools::downgrade::downgrade;
use bom_tools::formats::{BomFormat, ConvertFormat};
use bom_tools::model::{
    Bom, Component, ComponentType, Dependency, Hash, HashAlgorithm, License, LicenseChoice, Scope,
    SpecVersion,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

/// A flat BOM with `count` libraries, each depended on by the subject.
fn generate_bom(count: usize) -> Bom {
    let mut bom = Bom::new();
    bom.serial_number = Some(bom_tools::model::new_serial_number());
    bom.metadata_mut().component =
        Some(Component::new(ComponentType::Application, "app").with_bom_ref("app"));

    let mut root = Dependency::new("app");
    for i in 0..count {
        let version = format!("1.{}.{}", i % 10, i % 100);
        let purl = format!("pkg:npm/pkg-{i}@{version}");
        let mut c = Component::new(ComponentType::Library, format!("pkg-{i}"))
            .with_version(version)
            .with_bom_ref(purl.clone());
        c.purl = Some(purl.clone());
        c.scope = Some(Scope::Required);
        c.hashes = vec![
            Hash::new(HashAlgorithm::Sha256, "0".repeat(64)),
            Hash::new(HashAlgorithm::Sha512, "0".repeat(128)),
        ];
        c.licenses = vec![LicenseChoice::License(License::spdx("MIT"))];
        bom.components.push(c);
        root.dependencies.push(Dependency::new(purl));
    }
    bom.dependencies.push(root);
    bom
}

fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");
    for size in [100, 1000, 5000] {
        let bom = generate_bom(size);
        for format in [ConvertFormat::Json, ConvertFormat::Xml, ConvertFormat::Protobuf] {
            group.bench_with_input(BenchmarkId::new(format.as_str(), size), &bom, |b, bom| {
                b.iter(|| serialize(black_box(bom), format, None));
            });
        }
    }
    group.finish();
}

fn bench_deserialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("deserialize");
    let bom = generate_bom(1000);
    for (write, read) in [
        (ConvertFormat::Json, BomFormat::Json),
        (ConvertFormat::Xml, BomFormat::Xml),
        (ConvertFormat::Protobuf, BomFormat::Protobuf),
    ] {
        let Ok(out) = serialize(&bom, write, None) else {
            continue;
        };
        group.bench_function(read.as_str(), |b| {
            b.iter(|| deserialize(black_box(&out.bytes), read));
        });
    }
    group.finish();
}

fn bench_downgrade(c: &mut Criterion) {
    let bom = generate_bom(1000);
    c.bench_function("downgrade_1.5_to_1.0", |b| {
        b.iter(|| downgrade(black_box(bom.clone()), SpecVersion::V1_0));
    });
}

fn bench_diff(c: &mut Criterion) {
    let from = generate_bom(2000);
    let mut to = from.clone();
    for component in to.components.iter_mut().step_by(10) {
        component.version = Some("2.0.0".to_string());
    }
    c.bench_function("component_version_diff_2000", |b| {
        b.iter(|| component_version_diff(black_box(&from), black_box(&to)));
    });
}

criterion_group!(
    benches,
    bench_serialize,
    bench_deserialize,
    bench_downgrade,
    bench_diff
);
criterion_main!(benches);
