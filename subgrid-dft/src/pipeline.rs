//! End-to-end oracle run
//!
//! Generates a dataset, computes the reference subgrid, moves the samples to an
//! accelerator, times repeated kernel launches, copies the result back and
//! compares it with the reference.

use crate::bench::{DEFAULT_REPEATS, Timing, time_launches};
use crate::error::{DftError, Result};
use crate::geometry::{DEFAULT_SUBGRID_SIZE, SubgridGeometry};
use crate::kernel::{Accelerator, DEFAULT_GROUP_SIZE, LaunchConfig};
use crate::reference::ReferenceAccumulator;
use crate::samples::{DEFAULT_N_SAMPLES, Origin, Subgrid};
use crate::synth::{DEFAULT_SEED, SampleGenerator};
use crate::verify::{AccuracyReport, DEFAULT_PREVIEW_PIXELS, PixelPair, Tolerance, compare, preview};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Oracle run configuration
///
/// # Example
///
/// ```rust
/// use subgrid_dft::OracleConfigBuilder;
///
/// let config = OracleConfigBuilder::default()
///     .n_samples(1000usize)
///     .subgrid_size(16usize)
///     .group_size(64usize)
///     .build()
///     .unwrap();
/// assert_eq!(config.repeats, 10);
/// ```
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[builder(setter(into), default)]
pub struct OracleConfig {
    /// Number of visibility samples
    pub n_samples: usize,

    /// Side length of the subgrid
    pub subgrid_size: usize,

    /// Execution units per group
    pub group_size: usize,

    /// Timed kernel launches
    pub repeats: usize,

    /// Leading pixels included in the side-by-side preview
    pub preview_pixels: usize,

    /// Seed for the synthetic dataset
    pub seed: u64,

    pub origin: Origin,

    pub tolerance: Tolerance,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            n_samples: DEFAULT_N_SAMPLES,
            subgrid_size: DEFAULT_SUBGRID_SIZE,
            group_size: DEFAULT_GROUP_SIZE,
            repeats: DEFAULT_REPEATS,
            preview_pixels: DEFAULT_PREVIEW_PIXELS,
            seed: DEFAULT_SEED,
            origin: Origin::default(),
            tolerance: Tolerance::default(),
        }
    }
}

impl OracleConfig {
    /// Check the configuration against `accelerator` before any work is done
    pub fn validate<A: Accelerator>(&self, accelerator: &A) -> Result<(SubgridGeometry, LaunchConfig)> {
        let geometry = SubgridGeometry::new(self.subgrid_size)?;
        let launch = accelerator.launch_config(&geometry, self.group_size)?;
        if self.repeats == 0 {
            return Err(DftError::config("repeat count must be at least 1"));
        }
        Ok((geometry, launch))
    }
}

/// Everything measured by one oracle run
#[derive(Debug, Clone, Serialize)]
pub struct OracleReport {
    pub accelerator: String,
    pub config: OracleConfig,
    pub launch: LaunchConfig,
    pub reference_time: Duration,
    pub timing: Timing,
    pub accuracy: AccuracyReport,
    pub preview: Vec<PixelPair>,
    #[serde(skip)]
    pub reference: Subgrid,
    #[serde(skip)]
    pub candidate: Subgrid,
}

impl OracleReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Run the full generate / reference / launch / compare sequence
///
/// Accuracy failures are recorded in the report rather than returned as an
/// error; call [`AccuracyReport::check`] to turn them into one. Configuration
/// and accelerator errors abort the run, and any device buffers are released
/// on the way out.
pub fn run_oracle<A, F>(config: &OracleConfig, accelerator: &A, on_launch: F) -> Result<OracleReport>
where
    A: Accelerator,
    F: FnMut(usize, Duration),
{
    let (geometry, launch) = config.validate(accelerator)?;
    info!(
        n_samples = config.n_samples,
        subgrid = geometry.size(),
        accelerator = accelerator.name(),
        "Starting oracle run"
    );

    let samples = SampleGenerator::new(config.seed).generate(config.n_samples);
    debug!(seed = config.seed, "Generated {} samples", samples.len());

    let start = Instant::now();
    let reference = ReferenceAccumulator::new(geometry).compute(&samples, &config.origin);
    let reference_time = start.elapsed();
    info!(
        elapsed_ms = reference_time.as_secs_f64() * 1e3,
        "Reference accumulator finished"
    );

    let mut buffers = accelerator.upload(&samples, geometry)?;
    debug!(
        groups = launch.group_count,
        group_size = launch.group_size,
        idle_units = launch.total_units() - geometry.n_pixels(),
        "Launch geometry"
    );

    let timing = time_launches(
        accelerator,
        &mut buffers,
        &config.origin,
        &launch,
        config.repeats,
        on_launch,
    )?;
    info!(
        per_launch_ms = timing.per_launch_ms,
        repeats = timing.repeats,
        "Kernel timing complete"
    );

    let candidate = accelerator.download(&buffers)?;
    drop(buffers);

    let accuracy = compare(
        &reference,
        &candidate,
        samples.len(),
        samples.max_amplitude(),
        &config.tolerance,
    )?;
    if accuracy.passed() {
        info!(
            max_abs_error = accuracy.max_abs_error,
            threshold = accuracy.threshold,
            "Kernel matches reference"
        );
    } else {
        warn!(
            max_abs_error = accuracy.max_abs_error,
            threshold = accuracy.threshold,
            worst_pixel = accuracy.worst_pixel,
            "Kernel diverges from reference"
        );
    }

    Ok(OracleReport {
        accelerator: accelerator.name().to_string(),
        config: config.clone(),
        launch,
        reference_time,
        timing,
        preview: preview(&reference, &candidate, config.preview_pixels),
        accuracy,
        reference,
        candidate,
    })
}
