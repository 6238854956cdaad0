//! Benchmark the serial reference against the parallel pixel kernel

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use subgrid_dft::{
    Accelerator, AngleConvention, HostAccelerator, Origin, ReferenceAccumulator, SampleGenerator,
    SubgridGeometry,
};

fn bench_reference_vs_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("Direct sum: reference vs parallel");
    group.sample_size(10);

    let geometry = SubgridGeometry::new(32).expect("valid geometry");
    let origin = Origin::default();
    let accel = HostAccelerator::new(0).expect("thread pool");
    let launch = accel.launch_config(&geometry, 512).expect("valid launch");

    for n_samples in [1_000, 10_000, 50_000] {
        let samples = SampleGenerator::default().generate(n_samples);

        group.bench_with_input(BenchmarkId::new("reference", n_samples), &samples, |b, samples| {
            let reference = ReferenceAccumulator::new(geometry);
            b.iter(|| reference.compute(black_box(samples), &origin))
        });

        let mut buffers = accel.upload(&samples, geometry).expect("upload");
        group.bench_function(BenchmarkId::new("parallel", n_samples), |b| {
            b.iter(|| accel.launch(black_box(&mut buffers), &origin, &launch).expect("launch"))
        });
    }

    group.finish();
}

fn bench_angle_conventions(c: &mut Criterion) {
    let mut group = c.benchmark_group("Rotation");
    let turns: Vec<f32> = (0..4096).map(|i| (i as f32 - 2048.0) * 0.047).collect();

    for convention in [AngleConvention::Radians, AngleConvention::HalfTurns] {
        group.bench_function(format!("{:?}", convention), |b| {
            b.iter(|| {
                turns
                    .iter()
                    .map(|&t| convention.rotation(black_box(t)))
                    .fold(0.0f32, |acc, r| acc + r.re)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_reference_vs_parallel, bench_angle_conventions);
criterion_main!(benches);
