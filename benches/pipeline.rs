//! Benchmarks for the movement-reconstruction pipeline.
//!
//! Run with: `cargo bench --bench pipeline`

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use visitflow::synthetic::SyntheticScenario;
use visitflow::{great_circle, reconstruct_movements, FlowConfig, GeoPoint};

fn bench_sample_arc(c: &mut Criterion) {
    let new_york = GeoPoint::new(40.78, -73.98);
    let helsinki = GeoPoint::new(60.17083, 24.93750);

    let mut group = c.benchmark_group("sample_arc");
    for step_km in [25.0, 100.0, 250.0] {
        group.bench_with_input(
            BenchmarkId::new("ny_helsinki", format!("{step_km}km")),
            &step_km,
            |b, &step| {
                b.iter(|| great_circle::sample_arc(&new_york, &helsinki, step));
            },
        );
    }
    group.finish();
}

fn bench_reconstruct_movements(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconstruct_movements");
    for user_count in [10, 50, 200] {
        let dataset = SyntheticScenario {
            user_count,
            ..SyntheticScenario::default()
        }
        .generate();
        let config = FlowConfig::default();

        group.bench_with_input(
            BenchmarkId::new("users", user_count),
            &dataset,
            |b, data| {
                b.iter(|| {
                    reconstruct_movements(&data.posts, &data.regions, &data.target_site, &config)
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_sample_arc, bench_reconstruct_movements);
criterion_main!(benches);
