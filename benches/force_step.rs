//! Benchmarks for the force field's pairwise step.
//!
//! Run with: `cargo bench --bench force_step`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use genefield::prelude::*;

fn entities(count: usize) -> Vec<Entity> {
    (0..count)
        .map(|i| Entity::new(format!("G{i}"), ((i * 7919) % 101) as f64 / 10.0))
        .collect()
}

/// Every tenth gene shares a pathway with its neighbors.
fn pathways(count: usize) -> PathwayTable {
    let mut table = PathwayTable::new();
    for start in (0..count).step_by(10) {
        table.add(
            format!("P{start}"),
            (start..(start + 10).min(count)).map(|i| format!("G{i}")),
        );
    }
    table
}

fn field(count: usize) -> ForceField<PathwayTable, PaletteColorMapper> {
    let config = ForceConfig {
        seed: Some(42),
        ..ForceConfig::default()
    };
    let mut field = ForceField::new(
        Bounds::new(1600.0, 1200.0, 40.0),
        config,
        pathways(count),
        PaletteColorMapper::default(),
    );
    field.update(&normalize(&entities(count)));
    field
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("force_step");

    for count in [50, 200, 500] {
        group.bench_with_input(BenchmarkId::new("particles", count), &count, |b, &count| {
            let mut field = field(count);
            b.iter(|| {
                field.step();
                black_box(field.connectors().len())
            })
        });
    }

    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("force_update");

    group.bench_function("refresh_200", |b| {
        let mut field = field(200);
        let refreshed = normalize(&entities(200));
        b.iter(|| field.update(black_box(&refreshed)))
    });

    group.bench_function("snapshot_200", |b| {
        let field = field(200);
        b.iter(|| black_box(field.snapshot()))
    });

    group.finish();
}

criterion_group!(benches, bench_step, bench_update);
criterion_main!(benches);
