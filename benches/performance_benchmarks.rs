use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use routepace::models::{RiderEnvironmentParams, TrackPoint};
use routepace::{build_route, optimize, physics};

/// Performance benchmarks for the planning pipeline
///
/// These benchmarks test segmentation and allocation with varying track
/// lengths to ensure long routes stay interactive.

/// Rolling track heading north-east with a few kilometers of climbing
fn create_track(points: usize) -> Vec<TrackPoint> {
    (0..points)
        .map(|i| {
            let t = i as f64;
            TrackPoint::new(
                45.0 + t * 0.0001,
                7.0 + t * 0.00005,
                500.0 + 80.0 * (t / 150.0).sin() + t * 0.02,
            )
        })
        .collect()
}

fn create_benchmark_rider() -> RiderEnvironmentParams {
    RiderEnvironmentParams {
        wind_speed: 4.0,
        wind_direction: 225.0,
        target_intensity: 85.0,
        ..RiderEnvironmentParams::default()
    }
}

fn bench_build_route(c: &mut Criterion) {
    let mut group = c.benchmark_group("Route Segmentation");

    for &size in &[1_000, 10_000, 100_000] {
        let track = create_track(size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("build_route", size), &track, |b, track| {
            b.iter(|| build_route(black_box(track), 100.0));
        });
    }

    group.finish();
}

fn bench_optimize(c: &mut Criterion) {
    let mut group = c.benchmark_group("Power Allocation");
    let rider = create_benchmark_rider();

    for &size in &[1_000, 10_000, 100_000] {
        let route = build_route(&create_track(size), 100.0).expect("benchmark track should segment");

        group.throughput(Throughput::Elements(route.len() as u64));
        group.bench_with_input(BenchmarkId::new("optimize", route.len()), &route, |b, route| {
            b.iter(|| optimize(black_box(route), black_box(&rider)));
        });
    }

    group.finish();
}

fn bench_speed_solver(c: &mut Criterion) {
    let rider = create_benchmark_rider();

    c.bench_function("speed_at_power", |b| {
        b.iter(|| {
            for gradient in [-0.08, -0.02, 0.0, 0.03, 0.10] {
                black_box(physics::speed_at_power(
                    black_box(250.0),
                    gradient,
                    black_box(-2.5),
                    &rider,
                ));
            }
        });
    });
}

criterion_group!(benches, bench_build_route, bench_optimize, bench_speed_solver);
criterion_main!(benches);
