//! Wall-clock timing of repeated kernel launches

use crate::error::{DftError, Result};
use crate::kernel::{Accelerator, LaunchConfig};
use crate::samples::Origin;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::debug;

/// Launches averaged for the reported time per call
pub const DEFAULT_REPEATS: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct Timing {
    pub repeats: usize,
    /// Sum of the individual launch durations
    pub total: Duration,
    /// Mean wall-clock time per launch in milliseconds
    pub per_launch_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

/// Launch the kernel `repeats` times, each to completion before the next
///
/// `on_launch` is called after every launch with its index and duration.
pub fn time_launches<A, F>(
    accelerator: &A,
    buffers: &mut A::Buffers,
    origin: &Origin,
    launch: &LaunchConfig,
    repeats: usize,
    mut on_launch: F,
) -> Result<Timing>
where
    A: Accelerator,
    F: FnMut(usize, Duration),
{
    if repeats == 0 {
        return Err(DftError::config("repeat count must be at least 1"));
    }

    // Only launch-to-completion is timed; logging and the observer are not
    let mut total = Duration::ZERO;
    let mut min = Duration::MAX;
    let mut max = Duration::ZERO;
    for i in 0..repeats {
        let start = Instant::now();
        accelerator.launch(buffers, origin, launch)?;
        let elapsed = start.elapsed();

        total += elapsed;
        min = min.min(elapsed);
        max = max.max(elapsed);
        debug!(launch = i, elapsed_ms = elapsed.as_secs_f64() * 1e3, "Launch complete");
        on_launch(i, elapsed);
    }

    Ok(Timing {
        repeats,
        total,
        per_launch_ms: total.as_secs_f64() * 1e3 / repeats as f64,
        min_ms: min.as_secs_f64() * 1e3,
        max_ms: max.as_secs_f64() * 1e3,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SubgridGeometry;
    use crate::kernel::HostAccelerator;
    use crate::samples::VisibilitySet;
    use crate::synth::SampleGenerator;

    #[test]
    fn test_counts_every_launch() {
        let accel = HostAccelerator::new(1).unwrap();
        let geometry = SubgridGeometry::new(4).unwrap();
        let launch = accel.launch_config(&geometry, 8).unwrap();
        let mut buffers = accel
            .upload(&SampleGenerator::default().generate(16), geometry)
            .unwrap();

        let mut seen = Vec::new();
        let timing = time_launches(&accel, &mut buffers, &Origin::default(), &launch, 3, |i, _| {
            seen.push(i)
        })
        .unwrap();

        assert_eq!(seen, vec![0, 1, 2]);
        assert_eq!(timing.repeats, 3);
        assert!(timing.min_ms <= timing.max_ms);
        assert!(timing.per_launch_ms >= 0.0);
    }

    #[test]
    fn test_observer_time_is_not_counted() {
        let accel = HostAccelerator::new(1).unwrap();
        let geometry = SubgridGeometry::new(4).unwrap();
        let launch = accel.launch_config(&geometry, 8).unwrap();
        let mut buffers = accel.upload(&VisibilitySet::empty(), geometry).unwrap();

        let mut reported = Duration::ZERO;
        let timing = time_launches(&accel, &mut buffers, &Origin::default(), &launch, 3, |_, elapsed| {
            reported += elapsed;
            std::thread::sleep(Duration::from_millis(30));
        })
        .unwrap();

        assert_eq!(timing.total, reported);
        assert!(timing.per_launch_ms < 30.0, "{:?}", timing);
    }

    #[test]
    fn test_zero_repeats_rejected() {
        let accel = HostAccelerator::new(1).unwrap();
        let geometry = SubgridGeometry::new(4).unwrap();
        let launch = accel.launch_config(&geometry, 8).unwrap();
        let mut buffers = accel.upload(&VisibilitySet::empty(), geometry).unwrap();
        let result = time_launches(&accel, &mut buffers, &Origin::default(), &launch, 0, |_, _| {});
        assert!(matches!(result, Err(DftError::ConfigurationError(_))));
    }
}
