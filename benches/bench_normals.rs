use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use pointclouds_core::PointCloud;
use pointclouds_normals::estimate_normals;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Points on a vertical cylinder of radius 5, the typical input of the
/// cylinder extraction.
fn cylinder_surface(n: usize, seed: u64) -> PointCloud {
    let mut rng = StdRng::seed_from_u64(seed);
    let pts: Vec<[f32; 3]> = (0..n)
        .map(|_| {
            let t: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
            [5.0 * t.cos(), 5.0 * t.sin(), rng.gen_range(0.0f32..50.0)]
        })
        .collect();
    PointCloud::from_points(&pts)
}

fn bench_estimate_normals(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimate_normals");
    for size in [10_000, 100_000] {
        let cloud = cylinder_surface(size, 42);
        for k in [10, 20] {
            group.bench_with_input(
                BenchmarkId::new(format!("k{}", k), size),
                &cloud,
                |b, cloud| b.iter(|| estimate_normals(cloud, k)),
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_estimate_normals);
criterion_main!(benches);
