//! Data-parallel pixel kernel
//!
//! The kernel assigns one execution unit to each output pixel. Units are
//! batched into fixed-size groups, `ceil(S^2 / group_size)` groups per launch.
//! Every unit:
//!
//! 1. computes its pixel index from `(group, local)`,
//! 2. exits immediately if the index is outside the subgrid (the last group is
//!    usually only partly filled),
//! 3. accumulates all samples, in ascending order, into a private accumulator,
//! 4. writes the accumulator to its own pixel once.
//!
//! Units never share mutable state, so the only synchronisation is the
//! completion barrier at the end of a launch.
//!
//! The [`Accelerator`] trait wraps the kernel with the allocation, transfer and
//! launch steps of a concrete device. [`HostAccelerator`] runs the groups on a
//! rayon thread pool. With the `cubecl` feature, `gpu::CubeclAccelerator` runs
//! the same kernel on a GPU.

mod host;

pub use host::{HostAccelerator, HostBuffers};

use crate::error::{DftError, Result};
use crate::geometry::SubgridGeometry;
use crate::phase::{AngleConvention, phase_turns};
use crate::samples::{Origin, Subgrid, VisibilitySet};
use num_complex::Complex32;
use rayon::prelude::*;
use serde::Serialize;

/// Units per group in the reference launch configuration
pub const DEFAULT_GROUP_SIZE: usize = 512;

/// Constraints a device places on group size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceLimits {
    /// Largest number of units in one group
    pub max_group_size: usize,
    /// Group size must be a multiple of this (the SIMD/warp width)
    pub group_granularity: usize,
}

/// Grid of execution units for one launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LaunchConfig {
    pub group_size: usize,
    pub group_count: usize,
}

impl LaunchConfig {
    /// Smallest launch covering `n_pixels` with groups of `group_size` units
    pub fn for_pixels(n_pixels: usize, group_size: usize, limits: &DeviceLimits) -> Result<Self> {
        if group_size == 0 {
            return Err(DftError::config("group size must be positive"));
        }
        if group_size > limits.max_group_size {
            return Err(DftError::config(format!(
                "group size {} exceeds the device maximum of {}",
                group_size, limits.max_group_size
            )));
        }
        if group_size % limits.group_granularity != 0 {
            return Err(DftError::config(format!(
                "group size {} is not a multiple of the device granularity {}",
                group_size, limits.group_granularity
            )));
        }

        Ok(Self {
            group_size,
            group_count: n_pixels.div_ceil(group_size),
        })
    }

    pub fn total_units(&self) -> usize {
        self.group_size * self.group_count
    }

    /// Global index of unit `local` in group `group`
    #[inline]
    pub fn unit_index(&self, group: usize, local: usize) -> usize {
        group * self.group_size + local
    }

    /// Fail unless every pixel is assigned to a unit
    pub fn ensure_covers(&self, geometry: &SubgridGeometry) -> Result<()> {
        if self.total_units() < geometry.n_pixels() {
            return Err(DftError::config(format!(
                "launch of {} groups x {} units leaves pixels {}..{} uncovered",
                self.group_count,
                self.group_size,
                self.total_units(),
                geometry.n_pixels()
            )));
        }
        Ok(())
    }
}

/// Per-pixel accumulation, executed by one unit each
#[derive(Debug, Clone, Copy)]
pub struct PixelKernel {
    geometry: SubgridGeometry,
    convention: AngleConvention,
}

impl PixelKernel {
    /// Kernel using the half-turn (`sincospi`) convention
    pub fn new(geometry: SubgridGeometry) -> Self {
        Self {
            geometry,
            convention: AngleConvention::HalfTurns,
        }
    }

    pub fn with_convention(mut self, convention: AngleConvention) -> Self {
        self.convention = convention;
        self
    }

    pub fn geometry(&self) -> SubgridGeometry {
        self.geometry
    }

    /// Work of the unit with global index `unit`
    ///
    /// Returns `None` for units past the last pixel.
    #[inline]
    pub fn evaluate_unit(&self, unit: usize, samples: &VisibilitySet) -> Option<Complex32> {
        if !self.geometry.contains(unit) {
            return None;
        }

        let (l, m) = self.geometry.lm(unit);
        let mut cell = Complex32::new(0.0, 0.0);
        for ((&u, &v), &datum) in samples.u().iter().zip(samples.v()).zip(samples.data()) {
            cell += datum * self.convention.rotation(phase_turns(u, v, l, m));
        }
        Some(cell)
    }

    /// Run every group of `launch` in parallel, writing one pixel per unit
    ///
    /// Runs on the current rayon pool and returns once all units are done.
    pub fn launch(
        &self,
        launch: &LaunchConfig,
        samples: &VisibilitySet,
        _origin: &Origin,
        out: &mut [Complex32],
    ) -> Result<()> {
        if out.len() != self.geometry.n_pixels() {
            return Err(DftError::config(format!(
                "output buffer holds {} pixels, kernel expects {}",
                out.len(),
                self.geometry.n_pixels()
            )));
        }
        launch.ensure_covers(&self.geometry)?;

        out.par_chunks_mut(launch.group_size)
            .enumerate()
            .for_each(|(group, group_out)| {
                for local in 0..launch.group_size {
                    let unit = launch.unit_index(group, local);
                    if let Some(cell) = self.evaluate_unit(unit, samples) {
                        group_out[local] = cell;
                    }
                }
            });

        Ok(())
    }
}

/// A device that can hold the samples and run the pixel kernel
///
/// `Buffers` owns every device-side allocation for one dataset. Dropping it
/// releases them, so an early return at any stage cannot leak device memory.
pub trait Accelerator {
    type Buffers;

    fn name(&self) -> &str;

    fn limits(&self) -> DeviceLimits;

    /// Allocate device buffers and copy the samples host-to-device
    fn upload(&self, samples: &VisibilitySet, geometry: SubgridGeometry) -> Result<Self::Buffers>;

    /// Run one launch and block until it has completed
    fn launch(&self, buffers: &mut Self::Buffers, origin: &Origin, launch: &LaunchConfig) -> Result<()>;

    /// Copy the subgrid device-to-host
    fn download(&self, buffers: &Self::Buffers) -> Result<Subgrid>;

    /// Launch configuration for `geometry` on this device
    fn launch_config(&self, geometry: &SubgridGeometry, group_size: usize) -> Result<LaunchConfig> {
        LaunchConfig::for_pixels(geometry.n_pixels(), group_size, &self.limits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceAccumulator;
    use crate::synth::SampleGenerator;

    const HOST_LIKE: DeviceLimits = DeviceLimits {
        max_group_size: 1024,
        group_granularity: 1,
    };

    #[test]
    fn test_group_count_rounds_up() {
        let launch = LaunchConfig::for_pixels(9216, 512, &HOST_LIKE).unwrap();
        assert_eq!(launch.group_count, 18);

        let launch = LaunchConfig::for_pixels(9216, 500, &HOST_LIKE).unwrap();
        assert_eq!(launch.group_count, 19);
        assert_eq!(launch.total_units(), 9500);
        assert_eq!(launch.unit_index(18, 215), 9215);
    }

    #[test]
    fn test_rejects_bad_group_sizes() {
        let limits = DeviceLimits {
            max_group_size: 256,
            group_granularity: 32,
        };
        assert!(LaunchConfig::for_pixels(100, 0, &limits).is_err());
        assert!(LaunchConfig::for_pixels(100, 512, &limits).is_err());
        assert!(LaunchConfig::for_pixels(100, 48, &limits).is_err());
        assert!(LaunchConfig::for_pixels(100, 64, &limits).is_ok());
    }

    #[test]
    fn test_out_of_range_units_do_nothing() {
        let geometry = SubgridGeometry::new(4).unwrap();
        let kernel = PixelKernel::new(geometry);
        let samples = SampleGenerator::new(1).generate(8);
        assert!(kernel.evaluate_unit(15, &samples).is_some());
        assert!(kernel.evaluate_unit(16, &samples).is_none());
        assert!(kernel.evaluate_unit(usize::MAX, &samples).is_none());
    }

    #[test]
    fn test_partial_last_group() {
        // 36 pixels in groups of 5: the last group has one live unit
        let geometry = SubgridGeometry::new(6).unwrap();
        let samples = SampleGenerator::new(3).generate(50);
        let launch = LaunchConfig::for_pixels(geometry.n_pixels(), 5, &HOST_LIKE).unwrap();
        assert_eq!(launch.group_count, 8);

        let kernel = PixelKernel::new(geometry);
        let mut out = vec![Complex32::new(f32::NAN, f32::NAN); geometry.n_pixels()];
        kernel.launch(&launch, &samples, &Origin::default(), &mut out).unwrap();

        let expected = ReferenceAccumulator::new(geometry)
            .with_convention(AngleConvention::HalfTurns)
            .compute(&samples, &Origin::default());
        assert_eq!(out, expected.pixels());
    }

    #[test]
    fn test_uncovered_launch_is_rejected() {
        let geometry = SubgridGeometry::new(4).unwrap();
        let kernel = PixelKernel::new(geometry);
        let short = LaunchConfig {
            group_size: 4,
            group_count: 3,
        };
        let mut out = vec![Complex32::default(); 16];
        let result = kernel.launch(&short, &VisibilitySet::empty(), &Origin::default(), &mut out);
        assert!(matches!(result, Err(DftError::ConfigurationError(_))));
    }
}
