//! Tests to verify the parallel pixel kernel reproduces the serial reference

use num_complex::Complex32;
use subgrid_dft::{
    Accelerator, AngleConvention, HostAccelerator, OracleConfig, Origin, PixelKernel,
    ReferenceAccumulator, SampleGenerator, SubgridGeometry, Tolerance, compare, run_oracle,
};

#[test]
fn test_host_kernel_matches_reference() {
    let geometry = SubgridGeometry::new(32).unwrap();
    let samples = SampleGenerator::new(99).generate(20_000);
    let origin = Origin::default();

    // Radian convention on the reference, half-turn convention in the kernel
    let reference = ReferenceAccumulator::new(geometry).compute(&samples, &origin);

    let accel = HostAccelerator::new(0).unwrap();
    let launch = accel.launch_config(&geometry, 512).unwrap();
    assert_eq!(launch.group_count, 2);
    let mut buffers = accel.upload(&samples, geometry).unwrap();
    accel.launch(&mut buffers, &origin, &launch).unwrap();
    let parallel = accel.download(&buffers).unwrap();

    let report = compare(
        &reference,
        &parallel,
        samples.len(),
        samples.max_amplitude(),
        &Tolerance::default(),
    )
    .unwrap();
    assert!(
        report.passed(),
        "max error {} at pixel {} exceeds {}",
        report.max_abs_error,
        report.worst_pixel,
        report.threshold
    );
}

#[test]
fn test_same_convention_is_bit_identical() {
    let geometry = SubgridGeometry::new(16).unwrap();
    let samples = SampleGenerator::new(4).generate(1_000);
    let origin = Origin::default();

    for convention in [AngleConvention::Radians, AngleConvention::HalfTurns] {
        let reference = ReferenceAccumulator::new(geometry)
            .with_convention(convention)
            .compute(&samples, &origin);

        let kernel = PixelKernel::new(geometry).with_convention(convention);
        let launch = HostAccelerator::new(2)
            .unwrap()
            .launch_config(&geometry, 64)
            .unwrap();
        let mut out = vec![Complex32::default(); geometry.n_pixels()];
        kernel.launch(&launch, &samples, &origin, &mut out).unwrap();

        assert_eq!(reference.pixels(), out.as_slice(), "{:?}", convention);
    }
}

#[test]
fn test_oracle_run_with_reference_launch_shape() {
    // Reference group size with a smaller dataset so the test stays quick
    let config = OracleConfig {
        n_samples: 2_000,
        repeats: 2,
        ..Default::default()
    };
    let accel = HostAccelerator::new(0).unwrap();
    let report = run_oracle(&config, &accel, |_, _| {}).unwrap();

    assert_eq!(report.launch.group_size, 512);
    assert_eq!(report.launch.group_count, 18);
    assert_eq!(report.preview.len(), 10);
    assert!(report.accuracy.passed(), "{:?}", report.accuracy);
}

/// Full reference configuration: 204800 samples on a 96x96 subgrid
#[test]
#[ignore = "takes minutes in debug builds; run with --release -- --ignored"]
fn test_full_size_equivalence() {
    let accel = HostAccelerator::new(0).unwrap();
    let report = run_oracle(&OracleConfig::default(), &accel, |_, _| {}).unwrap();
    report.accuracy.check().unwrap();
}
